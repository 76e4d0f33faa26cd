//! Tree-walking interpreter: values, environments, evaluator, prelude.

pub mod builtins;
pub mod env;
pub mod error;
pub mod eval;
pub mod object;
pub mod value;

pub use env::{EnvRef, Environment};
pub use error::{EvalResult, RuntimeError};
pub use eval::eval;
pub use value::Value;
