//! Runtime values.

use super::error::{EvalResult, RuntimeError};
use super::object::{ArrayRef, FunctionRef, ObjectRef};
use std::cmp::Ordering;
use std::fmt;

/// A tagged runtime value.
///
/// Scalars (`Undefined`, `Bool`, `Long`, `Str`) copy on clone; objects,
/// arrays and functions are shared handles, so two cloned values observe
/// the same mutable payload.
#[derive(Debug, Clone)]
pub enum Value {
    Undefined,
    Bool(bool),
    /// Signed 64-bit integer, the only numeric kind.
    Long(i64),
    Str(String),
    Object(ObjectRef),
    Array(ArrayRef),
    Function(FunctionRef),
}

impl Value {
    /// Coerce to a boolean: `Bool` as itself, `Long` as `!= 0`.
    pub fn to_bool(&self) -> EvalResult<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::Long(n) => Ok(*n != 0),
            _ => Err(RuntimeError::Type),
        }
    }

    /// Coerce to an integer: `Long` as itself, `Bool` as 0 or 1.
    pub fn to_long(&self) -> EvalResult<i64> {
        match self {
            Value::Long(n) => Ok(*n),
            Value::Bool(b) => Ok(i64::from(*b)),
            _ => Err(RuntimeError::Type),
        }
    }

    /// Exact-kind string unwrap; there is no implicit stringification.
    pub fn as_str(&self) -> EvalResult<&str> {
        match self {
            Value::Str(s) => Ok(s),
            _ => Err(RuntimeError::Type),
        }
    }

    pub fn as_object(&self) -> EvalResult<&ObjectRef> {
        match self {
            Value::Object(object) => Ok(object),
            _ => Err(RuntimeError::Type),
        }
    }

    pub fn as_array(&self) -> EvalResult<&ArrayRef> {
        match self {
            Value::Array(array) => Ok(array),
            _ => Err(RuntimeError::Type),
        }
    }

    pub fn as_function(&self) -> EvalResult<&FunctionRef> {
        match self {
            Value::Function(function) => Ok(function),
            _ => Err(RuntimeError::Type),
        }
    }

    /// Resolve a property on an object or array value.
    ///
    /// User-defined properties win over kind builtins; a name found in
    /// neither is an error.
    pub fn get_property(&self, name: &str) -> EvalResult<Value> {
        let property = match self {
            Value::Object(object) => object.borrow().property(name),
            Value::Array(array) => array.borrow().property(name),
            _ => return Err(RuntimeError::Type),
        };
        property.ok_or_else(|| RuntimeError::undefined_property(name))
    }
}

/// Evaluate a comparison operator over two values.
///
/// Only same-kind scalars are ordered. `Undefined` equals itself and
/// every inequality on it is false; any other kind combination is a
/// type error.
pub fn compare(operator: &str, lhs: &Value, rhs: &Value) -> EvalResult<bool> {
    let ordering = match (lhs, rhs) {
        (Value::Undefined, Value::Undefined) => None,
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Long(a), Value::Long(b)) => Some(a.cmp(b)),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => return Err(RuntimeError::Type),
    };
    match (operator, ordering) {
        ("==", None) => Ok(true),
        ("!=", None) => Ok(false),
        (_, None) => Ok(false),
        ("==", Some(o)) => Ok(o == Ordering::Equal),
        ("!=", Some(o)) => Ok(o != Ordering::Equal),
        ("<=", Some(o)) => Ok(o != Ordering::Greater),
        ("<", Some(o)) => Ok(o == Ordering::Less),
        (">=", Some(o)) => Ok(o != Ordering::Less),
        (">", Some(o)) => Ok(o == Ordering::Greater),
        _ => Err(RuntimeError::Internal),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Long(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Function(_) => write!(f, "[function]"),
            Value::Object(object) => {
                write!(f, "{{")?;
                for (i, (name, value)) in object.borrow().properties.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "\"{name}\": {value}")?;
                }
                write!(f, "}}")
            }
            Value::Array(array) => {
                write!(f, "[")?;
                for (i, value) in array.borrow().values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => std::rc::Rc::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => std::rc::Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => std::rc::Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}
