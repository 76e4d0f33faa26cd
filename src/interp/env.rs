//! Lexical environment chain.

use super::error::{EvalResult, RuntimeError};
use super::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared reference to an environment frame.
pub type EnvRef = Rc<RefCell<Environment>>;

/// One binding: a value plus its mutability flag.
#[derive(Debug, Clone)]
struct Symbol {
    value: Value,
    mutable: bool,
}

/// A frame of named bindings linked to an optional outer frame.
///
/// Frames are created for the global scope and for every function call;
/// closures keep their defining frame alive through the outer chain.
#[derive(Debug, Default)]
pub struct Environment {
    symbols: HashMap<String, Symbol>,
    outer: Option<EnvRef>,
}

impl Environment {
    pub fn new() -> Self {
        Environment::default()
    }

    /// Wrap in `Rc<RefCell<>>`.
    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    /// Whether `name` is bound in this frame or any outer frame.
    pub fn has(&self, name: &str) -> bool {
        if self.symbols.contains_key(name) {
            return true;
        }
        match &self.outer {
            Some(outer) => outer.borrow().has(name),
            None => false,
        }
    }

    /// Innermost binding of `name`.
    pub fn get(&self, name: &str) -> EvalResult<Value> {
        if let Some(symbol) = self.symbols.get(name) {
            return Ok(symbol.value.clone());
        }
        match &self.outer {
            Some(outer) => outer.borrow().get(name),
            None => Err(RuntimeError::undefined_variable(name)),
        }
    }

    /// Update the innermost existing binding of `name`.
    ///
    /// Callers check `has` first; a miss on the whole chain is an
    /// evaluator bug, not a user error.
    pub fn assign(&mut self, name: &str, value: Value) -> EvalResult<()> {
        if let Some(symbol) = self.symbols.get_mut(name) {
            if !symbol.mutable {
                return Err(RuntimeError::immutable_variable(name));
            }
            symbol.value = value;
            return Ok(());
        }
        match &self.outer {
            Some(outer) => outer.borrow_mut().assign(name, value),
            None => Err(RuntimeError::Internal),
        }
    }

    /// Introduce or overwrite `name` in this frame; outer frames are
    /// not consulted.
    pub fn initialize(&mut self, name: &str, value: Value, mutable: bool) {
        self.symbols
            .insert(name.to_string(), Symbol { value, mutable });
    }

    /// Append `outer` at the tail of this chain.
    ///
    /// Used when invoking a closure: the fresh call frame gets the
    /// captured defining chain beneath it.
    pub fn append_outer(&mut self, outer: EnvRef) {
        match &self.outer {
            Some(next) => next.borrow_mut().append_outer(outer),
            None => self.outer = Some(outer),
        }
    }
}
