//! Method resolution contract.
//!
//! Dispatch never walks a class hierarchy itself. It asks a [`MethodLookup`]
//! to resolve a name against a receiver and caches what comes back, so the
//! answer for a `(shape, name)` pair must be stable until the lookup's
//! [`epoch`](MethodLookup::epoch) changes.

use crate::error::{RuntimeError, VmResult};
use garnet_core::{Symbol, Value, intern};
use std::fmt;
use std::sync::Arc;

// =============================================================================
// Callable
// =============================================================================

/// A resolved method body.
pub trait Callable: Send + Sync {
    fn name(&self) -> &Symbol;

    /// Run the method. Failures are returned to the dispatcher's caller as-is.
    fn call(&self, receiver: &Value, block: Option<&Value>, args: &[Value]) -> VmResult<Value>;
}

/// Shared handle to a resolved method.
pub type MethodRef = Arc<dyn Callable>;

type NativeFn = dyn Fn(&Value, Option<&Value>, &[Value]) -> VmResult<Value> + Send + Sync;

/// A method implemented by a Rust closure.
pub struct NativeMethod {
    name: Symbol,
    arity: Option<usize>,
    func: Box<NativeFn>,
}

impl NativeMethod {
    /// Wrap `func` as a method called `name`. Any arity is accepted.
    pub fn new<F>(name: &str, func: F) -> Self
    where
        F: Fn(&Value, Option<&Value>, &[Value]) -> VmResult<Value> + Send + Sync + 'static,
    {
        Self {
            name: intern(name),
            arity: None,
            func: Box::new(func),
        }
    }

    /// Reject calls that do not pass exactly `arity` arguments.
    pub fn with_arity(mut self, arity: usize) -> Self {
        self.arity = Some(arity);
        self
    }

    /// Erase into a shareable [`MethodRef`].
    pub fn into_ref(self) -> MethodRef {
        Arc::new(self)
    }
}

impl Callable for NativeMethod {
    fn name(&self) -> &Symbol {
        &self.name
    }

    fn call(&self, receiver: &Value, block: Option<&Value>, args: &[Value]) -> VmResult<Value> {
        if let Some(expected) = self.arity {
            if args.len() != expected {
                return Err(RuntimeError::ArgumentCount {
                    method: self.name.clone(),
                    given: args.len(),
                    expected,
                });
            }
        }
        (self.func)(receiver, block, args)
    }
}

impl fmt::Debug for NativeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeMethod")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Lookup
// =============================================================================

/// Resolves method names against receivers.
pub trait MethodLookup {
    /// Find `name` on the receiver's ancestry.
    fn lookup(&self, receiver: &Value, name: &Symbol) -> Option<MethodRef>;

    /// Version of the method tables. Caches built at one epoch are discarded
    /// when the epoch changes. Object models without redefinition keep 0.
    fn epoch(&self) -> u64 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_method_call() {
        let len = NativeMethod::new("size", |_, _, args| Ok(Value::Int(args.len() as i64)));
        assert_eq!(len.name().as_str(), "size");
        let out = len.call(&Value::Nil, None, &[Value::Int(1), Value::Int(2)]).unwrap();
        assert_eq!(out, Value::Int(2));
    }

    #[test]
    fn test_arity_checked() {
        let unary = NativeMethod::new("neg", |_, _, args| Ok(args[0].clone())).with_arity(1);
        let err = unary.call(&Value::Nil, None, &[]).unwrap_err();
        assert_eq!(
            err,
            RuntimeError::ArgumentCount {
                method: intern("neg"),
                given: 0,
                expected: 1
            }
        );
    }

    #[test]
    fn test_block_is_passed_through() {
        let yielder = NativeMethod::new("each", |_, block, _| Ok(block.cloned().unwrap_or(Value::Nil)));
        let block = Value::symbol("blk");
        assert_eq!(yielder.call(&Value::Nil, Some(&block), &[]).unwrap(), block);
    }
}
