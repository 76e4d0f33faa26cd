//! Runtime errors raised during evaluation.

use thiserror::Error;

/// Result of evaluating a node.
pub type EvalResult<T> = std::result::Result<T, RuntimeError>;

/// Runtime error during evaluation.
///
/// Every variant aborts the current evaluation and unwinds to the
/// driver; there is no user-level recovery point. `Internal` marks an
/// evaluator bug rather than a user mistake.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// An operand had the wrong kind for a coercion or operation.
    #[error("type error.")]
    Type,

    /// Identifier lookup missed the whole environment chain.
    #[error("undefined variable '{0}'...")]
    UndefinedVariable(String),

    /// Dot access named a property the value does not have.
    #[error("undefined property '{0}'...")]
    UndefinedProperty(String),

    /// Assignment to a binding introduced without `mut`.
    #[error("immutable variable '{0}'...")]
    ImmutableVariable(String),

    /// A call supplied fewer arguments than the function has parameters.
    #[error("arguments error...")]
    Arguments,

    #[error("division by zero.")]
    DivisionByZero,

    /// Raised by the `assert` builtin with the call-site position.
    #[error("assert failed at {line}:{column}.")]
    AssertionFailed { line: i64, column: i64 },

    /// Evaluator invariant violation.
    #[error("invalid internal condition.")]
    Internal,
}

impl RuntimeError {
    pub fn undefined_variable(name: &str) -> Self {
        RuntimeError::UndefinedVariable(name.to_string())
    }

    pub fn undefined_property(name: &str) -> Self {
        RuntimeError::UndefinedProperty(name.to_string())
    }

    pub fn immutable_variable(name: &str) -> Self {
        RuntimeError::ImmutableVariable(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(RuntimeError::Type.to_string(), "type error.");
        assert_eq!(
            RuntimeError::undefined_variable("x").to_string(),
            "undefined variable 'x'..."
        );
        assert_eq!(
            RuntimeError::immutable_variable("x").to_string(),
            "immutable variable 'x'..."
        );
        assert_eq!(RuntimeError::Arguments.to_string(), "arguments error...");
        assert_eq!(
            RuntimeError::AssertionFailed { line: 1, column: 1 }.to_string(),
            "assert failed at 1:1."
        );
    }
}
