//! Copy propagation.
//!
//! A single forward walk in definition order. Each instruction simplifies its
//! operands against the value map and reports the value it produces; when that
//! value is not the instruction's own result, the pass records
//! `result -> value` so later uses are rewritten. Copies therefore collapse
//! chains in one walk and are left dead for DCE, and constant-foldable
//! operators feed their folded constants forward the same way.
//!
//! Locals may be redefined. A redefinition kills the map entry for the local
//! and every entry whose value reads it, before the new value is recorded.

use super::OptimizationPass;
use crate::instr::Instruction;
use crate::operand::{Operand, ValueMap};
use crate::scope::Scope;
use crate::variable::Variable;
use smallvec::SmallVec;
use tracing::trace;

/// Counters from the last run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyPropStats {
    /// Instructions whose operands were rewritten.
    pub instrs_rewritten: usize,
    /// `result -> value` facts recorded.
    pub values_recorded: usize,
}

#[derive(Debug, Default)]
pub struct CopyPropagation {
    propagate_locals: bool,
    stats: CopyPropStats,
}

impl CopyPropagation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also substitute locals. Only valid when every recorded definition
    /// dominates the rest of the scope, which holds for straight-line bodies.
    pub fn with_locals(mut self, propagate_locals: bool) -> Self {
        self.propagate_locals = propagate_locals;
        self
    }

    #[inline]
    pub fn stats(&self) -> CopyPropStats {
        self.stats
    }

    fn run_copy_prop(&mut self, scope: &mut Scope) -> bool {
        self.stats = CopyPropStats::default();
        let mut instrs = scope.take_instrs();
        let mut map = ValueMap::default();

        for instr in instrs.iter_mut() {
            let before: SmallVec<[Operand; 4]> = instr.operands().into_iter().cloned().collect();

            if self.propagate_locals {
                instr.simplify_operands(&map, true);
            }
            let value = instr.simplify_and_get_result(scope, &map);

            if instr.operands().into_iter().ne(before.iter()) {
                self.stats.instrs_rewritten += 1;
                trace!(instr = %instr, "rewrote operands");
            }

            if let Some(result) = instr.result().cloned() {
                kill(&mut map, &result);
                if let Some(value) = value {
                    if value.as_variable() != Some(&result) && !value.references(&result) {
                        map.insert(result, value);
                        self.stats.values_recorded += 1;
                    }
                }
            }
        }

        scope.restore_instrs(instrs);
        self.stats.instrs_rewritten > 0
    }
}

/// Forget everything known about `var` and every fact that reads it.
fn kill(map: &mut ValueMap, var: &Variable) {
    map.remove(var);
    map.retain(|_, value| !value.references(var));
}

impl OptimizationPass for CopyPropagation {
    fn name(&self) -> &'static str {
        "copy-propagation"
    }

    fn run(&mut self, scope: &mut Scope) -> bool {
        self.run_copy_prop(scope)
    }
}
