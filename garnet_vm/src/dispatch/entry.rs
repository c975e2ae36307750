//! Cache entries and growth events.

use crate::lookup::MethodRef;
use garnet_core::{ShapeId, SourceLocation, Symbol};
use std::fmt;

/// A resolved target cached for one receiver shape. Immutable once created.
#[derive(Clone)]
pub struct CacheEntry {
    target: MethodRef,
    is_fallback: bool,
}

impl CacheEntry {
    /// The requested method itself was found.
    pub fn direct(target: MethodRef) -> Self {
        Self {
            target,
            is_fallback: false,
        }
    }

    /// Resolution fell back to the missing-method handler.
    pub fn fallback(target: MethodRef) -> Self {
        Self {
            target,
            is_fallback: true,
        }
    }

    #[inline]
    pub fn target(&self) -> &MethodRef {
        &self.target
    }

    #[inline]
    pub fn is_fallback(&self) -> bool {
        self.is_fallback
    }
}

impl fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("target", self.target.name())
            .field("is_fallback", &self.is_fallback)
            .finish()
    }
}

/// Emitted every time a call site caches a new shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheGrowth {
    /// Method name the call site targets.
    pub method: Symbol,
    pub location: SourceLocation,
    /// Shape that was just cached.
    pub shape: ShapeId,
    pub is_fallback: bool,
    /// Cache size after the insert.
    pub size: usize,
    /// Configured polymorphic limit at the time of the insert.
    pub limit: usize,
}

impl CacheGrowth {
    /// Check if the call site has reached the polymorphic limit.
    #[inline]
    pub fn at_limit(&self) -> bool {
        self.size >= self.limit
    }
}
