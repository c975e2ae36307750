//! Dispatch configuration.

use garnet_core::{Symbol, intern};

/// Cache size at which a call site stops being considered polymorphic.
pub const DEFAULT_POLYMORPHIC_LIMIT: usize = 4;

/// Name of the handler invoked when a method is not found.
pub const DEFAULT_FALLBACK_NAME: &str = "method_missing";

/// Settings shared by every dispatch node of one engine.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Method resolved when the requested one is missing. It receives the
    /// requested name as its first argument.
    pub fallback_name: Symbol,

    /// Cache size from which growth is reported at warning level and the
    /// site is classified megamorphic. Caching itself is never capped.
    pub polymorphic_limit: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            fallback_name: intern(DEFAULT_FALLBACK_NAME),
            polymorphic_limit: DEFAULT_POLYMORPHIC_LIMIT,
        }
    }
}

impl DispatchConfig {
    /// Use a different fallback handler name.
    pub fn with_fallback(name: &str) -> Self {
        Self {
            fallback_name: intern(name),
            ..Default::default()
        }
    }

    /// Report every growth past the first shape at warning level.
    pub fn monomorphic() -> Self {
        Self {
            polymorphic_limit: 1,
            ..Default::default()
        }
    }
}
