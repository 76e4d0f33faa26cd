//! coral, a small dynamically-typed scripting language.
//!
//! A source string is parsed against a fixed PEG grammar into a tagged
//! tree, which a tree-walking evaluator reduces to a runtime value in a
//! chained lexical environment.

pub mod ast;
pub mod interp;
pub mod parser;
pub mod repl;

pub use interp::{EnvRef, Environment, RuntimeError, Value};
pub use parser::SyntaxError;

use thiserror::Error;

/// Failure of a whole run: either the grammar did not match or the
/// evaluation raised a runtime error.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Parse and evaluate `source` in `env`, returning the program's final
/// value.
///
/// `path` is only used in parse diagnostics, which display as
/// `path:line:col: message`. The caller is expected to have installed
/// the prelude (see [`interp::builtins::install`]) into the root
/// environment. With `print_ast`, the tree is dumped as JSON to
/// standard output before evaluation.
pub fn run(path: &str, env: &EnvRef, source: &str, print_ast: bool) -> Result<Value, Error> {
    let ast = parser::parse(path, source)?;
    if print_ast {
        if let Ok(json) = serde_json::to_string_pretty(&ast) {
            println!("{json}");
        }
    }
    Ok(interp::eval(&ast, env)?)
}
