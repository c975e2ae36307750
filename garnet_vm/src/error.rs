//! Runtime errors raised through dispatch.

use garnet_core::{ShapeId, Symbol};
use thiserror::Error;

/// An error surfaced by dispatch or by a dispatched target.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// Neither the requested method nor the fallback handler resolved. The
    /// object model is malformed; this is never retried.
    #[error("{receiver} didn't have a #{fallback}")]
    FallbackExhausted { receiver: String, fallback: Symbol },

    /// An error raised by the invoked method itself.
    #[error("{class}: {message}")]
    Raised { class: Symbol, message: String },

    #[error("wrong number of arguments for `{method}` (given {given}, expected {expected})")]
    ArgumentCount {
        method: Symbol,
        given: usize,
        expected: usize,
    },

    #[error("no class registered for {0}")]
    UnknownShape(ShapeId),
}

impl RuntimeError {
    /// Build a [`RuntimeError::Raised`] with an interned class name.
    pub fn raised(class: &str, message: impl Into<String>) -> Self {
        RuntimeError::Raised {
            class: Symbol::from(class),
            message: message.into(),
        }
    }

    /// Check if the error indicates a broken object model rather than a
    /// failure of the running program.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RuntimeError::FallbackExhausted { .. })
    }
}

/// Result type for dispatch and method invocation.
pub type VmResult<T> = Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_exhausted_message() {
        let err = RuntimeError::FallbackExhausted {
            receiver: "#<Fish>".to_string(),
            fallback: Symbol::from("method_missing"),
        };
        assert_eq!(err.to_string(), "#<Fish> didn't have a #method_missing");
        assert!(err.is_fatal());
    }

    #[test]
    fn test_raised_is_not_fatal() {
        let err = RuntimeError::raised("ArgumentError", "bad value");
        assert_eq!(err.to_string(), "ArgumentError: bad value");
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_object_model_errors_are_not_fatal() {
        let arity = RuntimeError::ArgumentCount {
            method: Symbol::from("speak"),
            given: 2,
            expected: 1,
        };
        assert_eq!(
            arity.to_string(),
            "wrong number of arguments for `speak` (given 2, expected 1)"
        );
        assert!(!arity.is_fatal());
        assert!(!RuntimeError::UnknownShape(ShapeId::new(999)).is_fatal());
    }
}
