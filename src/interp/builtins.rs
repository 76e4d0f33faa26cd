//! Built-in prelude installed into the root environment.

use super::env::EnvRef;
use super::error::RuntimeError;
use super::object::{native, Parameter};
use super::value::Value;

/// Install the global prelude: `puts` and `assert`, both immutable.
pub fn install(env: &EnvRef) {
    let mut frame = env.borrow_mut();

    frame.initialize(
        "puts",
        native(vec![Parameter::new("arg", true)], |env: EnvRef| {
            let arg = env.borrow().get("arg")?;
            println!("{arg}");
            Ok(Value::Undefined)
        }),
        false,
    );

    frame.initialize(
        "assert",
        native(vec![Parameter::new("arg", true)], |env: EnvRef| {
            let frame = env.borrow();
            if !frame.get("arg")?.to_bool()? {
                // The caller seeds the call frame with the call site.
                let line = frame.get("__LINE__")?.to_long()?;
                let column = frame.get("__COLUMN__")?.to_long()?;
                return Err(RuntimeError::AssertionFailed { line, column });
            }
            Ok(Value::Undefined)
        }),
        false,
    );
}
