//! IR operands.
//!
//! Operands are immutable descriptions of values available at a point in an
//! instruction sequence. Instructions never mutate an operand; they replace it
//! with a simplified one.

use crate::inline::RenamingContext;
use crate::variable::Variable;
use garnet_core::{Symbol, intern};
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// Known-better replacements for variables, built by an optimizer from the
/// results of earlier instructions.
pub type ValueMap = FxHashMap<Variable, Operand>;

// =============================================================================
// Constants
// =============================================================================

/// Literal constant operand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constant {
    Nil,
    Bool(bool),
    Fixnum(i64),
    Str(Arc<str>),
    Symbol(Symbol),
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Nil => f.write_str("nil"),
            Constant::Bool(b) => write!(f, "{}", b),
            Constant::Fixnum(i) => write!(f, "{}", i),
            Constant::Str(s) => write!(f, "{:?}", s),
            Constant::Symbol(sym) => write!(f, ":{}", sym),
        }
    }
}

// =============================================================================
// Operand
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    Const(Constant),
    Var(Variable),
    /// Array literal whose elements are themselves operands.
    Array(Vec<Operand>),
}

impl Operand {
    #[inline]
    pub fn nil() -> Self {
        Operand::Const(Constant::Nil)
    }

    #[inline]
    pub fn fixnum(value: i64) -> Self {
        Operand::Const(Constant::Fixnum(value))
    }

    #[inline]
    pub fn boolean(value: bool) -> Self {
        Operand::Const(Constant::Bool(value))
    }

    pub fn string(text: &str) -> Self {
        Operand::Const(Constant::Str(Arc::from(text)))
    }

    pub fn symbol(name: &str) -> Self {
        Operand::Const(Constant::Symbol(intern(name)))
    }

    #[inline]
    pub fn var(variable: Variable) -> Self {
        Operand::Var(variable)
    }

    #[inline]
    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Operand::Var(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_fixnum(&self) -> Option<i64> {
        match self {
            Operand::Const(Constant::Fixnum(i)) => Some(*i),
            _ => None,
        }
    }

    /// Check if the operand is known without running any code.
    pub fn is_constant(&self) -> bool {
        match self {
            Operand::Const(_) => true,
            Operand::Var(_) => false,
            Operand::Array(elems) => elems.iter().all(Operand::is_constant),
        }
    }

    /// Produce the simplified form of this operand under `map`.
    ///
    /// Temporaries are always substituted. Locals are substituted only when
    /// `force` is set, i.e. when the caller has established that the mapped
    /// definition reaches this use unconditionally. Chains of variables in the
    /// map are followed to their end, which makes simplification idempotent for
    /// a fixed map. An operand that cannot be simplified is returned unchanged.
    /// A cyclic map still terminates, with an unspecified partial result.
    pub fn simplify(&self, map: &ValueMap, force: bool) -> Operand {
        self.simplify_within(map, force, map.len())
    }

    /// `budget` caps the map lookups along any one path. An acyclic map never
    /// needs more than `map.len()` of them.
    fn simplify_within(&self, map: &ValueMap, force: bool, budget: usize) -> Operand {
        match self {
            Operand::Const(_) => self.clone(),
            Operand::Var(var) => resolve_variable(var, map, force, budget),
            Operand::Array(elems) => Operand::Array(
                elems
                    .iter()
                    .map(|e| e.simplify_within(map, force, budget))
                    .collect(),
            ),
        }
    }

    /// Clone this operand for a duplicated instruction sequence, renaming every
    /// variable through `ctx`.
    pub fn clone_for_inlining(&self, ctx: &mut dyn RenamingContext) -> Operand {
        match self {
            Operand::Const(_) => self.clone(),
            Operand::Var(var) => Operand::Var(ctx.rename_variable(var)),
            Operand::Array(elems) => {
                Operand::Array(elems.iter().map(|e| e.clone_for_inlining(ctx)).collect())
            }
        }
    }

    /// Call `f` on every variable this operand reads.
    pub fn for_each_variable(&self, f: &mut impl FnMut(&Variable)) {
        match self {
            Operand::Const(_) => {}
            Operand::Var(var) => f(var),
            Operand::Array(elems) => {
                for elem in elems {
                    elem.for_each_variable(f);
                }
            }
        }
    }

    /// Check if this operand reads `var`.
    pub fn references(&self, var: &Variable) -> bool {
        match self {
            Operand::Const(_) => false,
            Operand::Var(v) => v == var,
            Operand::Array(elems) => elems.iter().any(|e| e.references(var)),
        }
    }
}

fn resolve_variable(var: &Variable, map: &ValueMap, force: bool, mut budget: usize) -> Operand {
    let mut current = var;
    while budget > 0 {
        if !force && !current.is_temporary() {
            break;
        }
        budget -= 1;
        match map.get(current) {
            Some(Operand::Var(next)) => current = next,
            Some(other) => return other.simplify_within(map, force, budget),
            None => break,
        }
    }
    Operand::Var(current.clone())
}

impl From<Variable> for Operand {
    fn from(var: Variable) -> Self {
        Operand::Var(var)
    }
}

impl From<Constant> for Operand {
    fn from(constant: Constant) -> Self {
        Operand::Const(constant)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Const(c) => write!(f, "{}", c),
            Operand::Var(v) => write!(f, "{}", v),
            Operand::Array(elems) => {
                f.write_str("[")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", elem)?;
                }
                f.write_str("]")
            }
        }
    }
}
