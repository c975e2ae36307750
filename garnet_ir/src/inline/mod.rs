//! Inlining support.
//!
//! Inlining duplicates a callee's instructions into a caller. Each duplicate
//! must define variables distinct from the callee's originals and from every
//! other duplicate, otherwise two copies would define the same variable and
//! break the single-definition discipline simplification relies on. Variables
//! are therefore routed through a [`RenamingContext`] while cloning.
//!
//! - **Renaming** (`mod.rs`): the context contract and the host-scope renamer
//! - **Transform** (`transform.rs`): replacing a call with the renamed body

mod transform;

pub use transform::{InlineError, InlineInfo, InlineResult, inline_call};

use crate::scope::Scope;
use crate::variable::Variable;
use garnet_core::intern;
use rustc_hash::FxHashMap;

// =============================================================================
// Renaming Context
// =============================================================================

/// Maps variables of a cloned instruction sequence to their new names.
///
/// Within one context a variable must always map to the same new variable, so
/// a definition and its uses stay connected after cloning.
pub trait RenamingContext {
    fn rename_variable(&mut self, var: &Variable) -> Variable;
}

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Clone)]
pub struct InlineConfig {
    /// Maximum callee size (in instructions) to inline.
    pub max_callee_size: usize,
    /// Maximum inlining depth (for bodies that were themselves inlined into).
    pub max_depth: usize,
    /// Prefix for renamed locals. Followed by the inline id and `_`.
    pub local_prefix: String,
}

impl Default for InlineConfig {
    fn default() -> Self {
        Self {
            max_callee_size: 100,
            max_depth: 4,
            local_prefix: "%i".to_string(),
        }
    }
}

impl InlineConfig {
    /// Create a conservative inlining configuration for faster compilation.
    pub fn conservative() -> Self {
        Self {
            max_callee_size: 30,
            max_depth: 2,
            ..Default::default()
        }
    }
}

// =============================================================================
// Host-Scope Renamer
// =============================================================================

/// Renames callee variables into a host scope.
///
/// Temporaries become fresh host temporaries. Locals keep their kind and depth
/// but get a name prefixed with this context's inline id, so two inlined
/// copies of the same callee never share a local.
pub struct InlineRenamer<'a> {
    host: &'a mut Scope,
    inline_id: u32,
    prefix: String,
    renamed: FxHashMap<Variable, Variable>,
}

impl<'a> InlineRenamer<'a> {
    pub fn new(host: &'a mut Scope, config: &InlineConfig) -> Self {
        let inline_id = host.next_inline_id();
        Self {
            host,
            inline_id,
            prefix: format!("{}{}_", config.local_prefix, inline_id),
            renamed: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn inline_id(&self) -> u32 {
        self.inline_id
    }

    /// Number of distinct variables renamed so far.
    #[inline]
    pub fn renamed_count(&self) -> usize {
        self.renamed.len()
    }
}

impl RenamingContext for InlineRenamer<'_> {
    fn rename_variable(&mut self, var: &Variable) -> Variable {
        if let Some(existing) = self.renamed.get(var) {
            return existing.clone();
        }
        let fresh = match var {
            Variable::Local { name, depth } => {
                Variable::local_at(intern(&format!("{}{}", self.prefix, name)), *depth)
            }
            Variable::Temp(_) => self.host.new_temporary(),
        };
        self.renamed.insert(var.clone(), fresh.clone());
        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_config_conservative() {
        let config = InlineConfig::conservative();
        let default = InlineConfig::default();
        assert_eq!(config.max_callee_size, 30);
        assert_eq!(config.max_depth, 2);
        assert!(config.max_callee_size < default.max_callee_size);
        assert_eq!(config.local_prefix, default.local_prefix);
    }

    #[test]
    fn test_rename_is_memoized() {
        let mut host = Scope::new("host");
        let mut renamer = InlineRenamer::new(&mut host, &InlineConfig::default());

        let a = renamer.rename_variable(&Variable::temp(0));
        let b = renamer.rename_variable(&Variable::temp(0));
        let c = renamer.rename_variable(&Variable::temp(1));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(renamer.renamed_count(), 2);
    }

    #[test]
    fn test_locals_get_prefixed_names() {
        let mut host = Scope::new("host");
        let mut renamer = InlineRenamer::new(&mut host, &InlineConfig::default());
        let renamed = renamer.rename_variable(&Variable::local("x"));
        assert_eq!(renamed.to_string(), "%i0_x");
        assert!(renamed.is_local());
    }

    #[test]
    fn test_independent_contexts_disagree() {
        let mut host = Scope::new("host");
        host.push(crate::instr::CopyInstr::new(Variable::temp(0), crate::operand::Operand::nil()));

        let first = {
            let mut r = InlineRenamer::new(&mut host, &InlineConfig::default());
            (r.rename_variable(&Variable::temp(0)), r.rename_variable(&Variable::local("x")))
        };
        let second = {
            let mut r = InlineRenamer::new(&mut host, &InlineConfig::default());
            (r.rename_variable(&Variable::temp(0)), r.rename_variable(&Variable::local("x")))
        };

        assert_ne!(first.0, second.0);
        assert_ne!(first.1, second.1);
        assert_ne!(first.0, Variable::temp(0));
        assert_ne!(second.0, Variable::temp(0));
    }
}
