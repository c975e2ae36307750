//! IR variables.
//!
//! A variable is a named binding an instruction may define. Two kinds exist:
//!
//! - **Locals** are method-local variables from the source program. They may be
//!   assigned more than once (loops, conditionals), so substituting a known value
//!   for a local is only valid where that definition dominates the use.
//! - **Temporaries** are introduced by the compiler and defined exactly once, so
//!   a known value for a temporary may be substituted at every use.

use garnet_core::{Symbol, intern};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Variable {
    /// Source-level local. `depth` counts enclosing closure scopes.
    Local { name: Symbol, depth: u32 },
    /// Compiler temporary.
    Temp(u32),
}

impl Variable {
    /// A local at depth zero.
    pub fn local(name: &str) -> Self {
        Variable::Local {
            name: intern(name),
            depth: 0,
        }
    }

    pub fn local_at(name: Symbol, depth: u32) -> Self {
        Variable::Local { name, depth }
    }

    #[inline]
    pub const fn temp(id: u32) -> Self {
        Variable::Temp(id)
    }

    #[inline]
    pub fn is_temporary(&self) -> bool {
        matches!(self, Variable::Temp(_))
    }

    #[inline]
    pub fn is_local(&self) -> bool {
        matches!(self, Variable::Local { .. })
    }

    /// Name of a local, `None` for temporaries.
    pub fn name(&self) -> Option<&Symbol> {
        match self {
            Variable::Local { name, .. } => Some(name),
            Variable::Temp(_) => None,
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variable::Local { name, depth: 0 } => write!(f, "{}", name),
            Variable::Local { name, depth } => write!(f, "{}({})", name, depth),
            Variable::Temp(id) => write!(f, "%v_{}", id),
        }
    }
}
