//! Global symbol interning.
//!
//! Method names, local variable names and symbol values are interned once and
//! shared afterwards. Two symbols are equal iff they point at the same interned
//! string, so equality and hashing never touch the string bytes.
//!
//! # Thread Safety
//!
//! The table sits behind a `parking_lot::RwLock`. Lookups of existing names
//! only take the read lock; the write lock is taken on first sight of a name.

use parking_lot::RwLock;
use rustc_hash::FxHashSet;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

// =============================================================================
// Symbol
// =============================================================================

/// An interned name.
///
/// Cloning is a reference-count bump. Equality and hashing use the address of
/// the interned string.
#[derive(Clone)]
pub struct Symbol(Arc<str>);

impl Symbol {
    /// The symbol's text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as *const u8 as usize
    }
}

impl PartialEq for Symbol {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        intern(name)
    }
}

// =============================================================================
// Interner
// =============================================================================

static INTERNER: OnceLock<RwLock<FxHashSet<Arc<str>>>> = OnceLock::new();

#[inline]
fn table() -> &'static RwLock<FxHashSet<Arc<str>>> {
    INTERNER.get_or_init(|| RwLock::new(FxHashSet::default()))
}

/// Intern `name`, returning the canonical symbol for it.
pub fn intern(name: &str) -> Symbol {
    if let Some(existing) = table().read().get(name) {
        return Symbol(Arc::clone(existing));
    }

    let mut guard = table().write();
    // Another thread may have won the race between the two locks.
    if let Some(existing) = guard.get(name) {
        return Symbol(Arc::clone(existing));
    }
    let interned: Arc<str> = Arc::from(name);
    guard.insert(Arc::clone(&interned));
    Symbol(interned)
}

/// Number of distinct names interned so far.
pub fn interned_count() -> usize {
    table().read().len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_name_same_symbol() {
        let a = intern("speak");
        let b = intern("speak");
        assert_eq!(a, b);
        assert!(Arc::ptr_eq(&a.0, &b.0));
    }

    #[test]
    fn test_interned_count_grows_once_per_name() {
        let before = interned_count();
        intern("interned_count_marker");
        let after = interned_count();
        assert!(after > before);
        // Other tests may intern concurrently, so only the lower bound holds.
        intern("interned_count_marker");
        assert!(interned_count() >= after);
    }

    #[test]
    fn test_different_names_differ() {
        assert_ne!(intern("speak"), intern("bark"));
    }

    #[test]
    fn test_display_and_debug() {
        let sym = intern("method_missing");
        assert_eq!(sym.to_string(), "method_missing");
        assert_eq!(format!("{:?}", sym), ":method_missing");
    }

    #[test]
    fn test_ordering_is_lexical() {
        let mut names = vec![intern("zeta"), intern("alpha"), intern("mu")];
        names.sort();
        let text: Vec<_> = names.iter().map(Symbol::as_str).collect();
        assert_eq!(text, ["alpha", "mu", "zeta"]);
    }

    #[test]
    fn test_interning_across_threads() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| intern("shared_across_threads")))
            .collect();
        let symbols: Vec<Symbol> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(symbols.windows(2).all(|w| w[0] == w[1]));
    }
}
