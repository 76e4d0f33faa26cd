//! Heap-shared runtime payloads: objects, arrays, functions.
//!
//! Objects and arrays live behind `Rc<RefCell<...>>` so that cloned
//! values alias the same mutable payload. Both carry a fixed table of
//! built-in properties, looked up only when the user map has no entry
//! of that name.

use super::env::EnvRef;
use super::error::EvalResult;
use super::value::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

pub type ObjectRef = Rc<RefCell<ObjectValue>>;
pub type ArrayRef = Rc<RefCell<ArrayValue>>;
pub type FunctionRef = Rc<FunctionValue>;

/// A plain object: an ordered property map.
#[derive(Debug, Default)]
pub struct ObjectValue {
    pub properties: BTreeMap<String, Value>,
}

impl ObjectValue {
    pub fn into_ref(self) -> ObjectRef {
        Rc::new(RefCell::new(self))
    }

    /// User property first, then the object builtins.
    pub fn property(&self, name: &str) -> Option<Value> {
        self.properties
            .get(name)
            .cloned()
            .or_else(|| object_builtin(name))
    }
}

/// An array: an element sequence plus an object-style property map.
#[derive(Debug, Default)]
pub struct ArrayValue {
    pub properties: BTreeMap<String, Value>,
    pub values: Vec<Value>,
}

impl ArrayValue {
    pub fn into_ref(self) -> ArrayRef {
        Rc::new(RefCell::new(self))
    }

    /// User property first, then the array builtins.
    pub fn property(&self, name: &str) -> Option<Value> {
        self.properties
            .get(name)
            .cloned()
            .or_else(|| array_builtin(name))
    }
}

/// One declared parameter of a function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub mutable: bool,
}

impl Parameter {
    pub fn new(name: &str, mutable: bool) -> Self {
        Parameter {
            name: name.to_string(),
            mutable,
        }
    }
}

/// A callable value: a parameter list plus an opaque body.
///
/// Script functions capture their body tree and defining environment in
/// the closure; builtins capture Rust state. Either way the callable
/// receives a fresh call environment already seeded by the caller.
pub struct FunctionValue {
    pub params: Rc<Vec<Parameter>>,
    fun: Box<dyn Fn(EnvRef) -> EvalResult<Value>>,
}

impl FunctionValue {
    pub fn new(
        params: Vec<Parameter>,
        fun: impl Fn(EnvRef) -> EvalResult<Value> + 'static,
    ) -> Self {
        FunctionValue {
            params: Rc::new(params),
            fun: Box::new(fun),
        }
    }

    /// Build a function sharing an existing parameter list; used when
    /// wrapping a property function to bind its receiver.
    pub fn with_params(
        params: Rc<Vec<Parameter>>,
        fun: impl Fn(EnvRef) -> EvalResult<Value> + 'static,
    ) -> Self {
        FunctionValue {
            params,
            fun: Box::new(fun),
        }
    }

    pub fn call(&self, env: EnvRef) -> EvalResult<Value> {
        (self.fun)(env)
    }
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionValue")
            .field("params", &self.params)
            .field("fun", &"<callable>")
            .finish()
    }
}

/// Wrap a native callable as a function value.
pub fn native(
    params: Vec<Parameter>,
    fun: impl Fn(EnvRef) -> EvalResult<Value> + 'static,
) -> Value {
    Value::Function(Rc::new(FunctionValue::new(params, fun)))
}

fn object_builtin(name: &str) -> Option<Value> {
    match name {
        "size" => Some(native(Vec::new(), |env: EnvRef| {
            let this = env.borrow().get("this")?;
            let n = this.as_object()?.borrow().properties.len() as i64;
            Ok(Value::Long(n))
        })),
        _ => None,
    }
}

fn array_builtin(name: &str) -> Option<Value> {
    match name {
        "size" => Some(native(Vec::new(), |env: EnvRef| {
            let this = env.borrow().get("this")?;
            let n = this.as_array()?.borrow().values.len() as i64;
            Ok(Value::Long(n))
        })),
        "push" => Some(native(vec![Parameter::new("arg", false)], |env: EnvRef| {
            let (this, arg) = {
                let frame = env.borrow();
                (frame.get("this")?, frame.get("arg")?)
            };
            this.as_array()?.borrow_mut().values.push(arg);
            Ok(Value::Undefined)
        })),
        _ => None,
    }
}
