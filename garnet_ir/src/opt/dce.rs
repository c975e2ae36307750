//! Dead code elimination.
//!
//! One backward walk over the straight-line body. An instruction is dropped
//! when it has no side effects and defines a temporary that nothing after it
//! reads. Locals are always kept: closures and bindings may read them without
//! an operand showing it.

use super::OptimizationPass;
use crate::instr::Instruction;
use crate::scope::Scope;
use crate::variable::Variable;
use rustc_hash::FxHashSet;
use tracing::debug;

#[derive(Debug, Default)]
pub struct DeadCodeElimination {
    removed: usize,
}

impl DeadCodeElimination {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instructions removed by the last run.
    #[inline]
    pub fn removed(&self) -> usize {
        self.removed
    }

    fn run_dce(&mut self, scope: &mut Scope) -> bool {
        let instrs = scope.instrs_mut();
        let mut live: FxHashSet<Variable> = FxHashSet::default();
        let mut keep = vec![true; instrs.len()];

        for (i, instr) in instrs.iter().enumerate().rev() {
            let dead = !instr.has_side_effects()
                && instr
                    .result()
                    .is_some_and(|r| r.is_temporary() && !live.contains(r));
            if dead {
                keep[i] = false;
                continue;
            }
            for operand in instr.operands() {
                operand.for_each_variable(&mut |v| {
                    live.insert(v.clone());
                });
            }
        }

        let before = instrs.len();
        let mut flags = keep.into_iter();
        instrs.retain(|_| flags.next().unwrap_or(true));
        self.removed = before - instrs.len();

        if self.removed > 0 {
            debug!(scope = %scope.name(), removed = self.removed, "removed dead instructions");
        }
        self.removed > 0
    }
}

impl OptimizationPass for DeadCodeElimination {
    fn name(&self) -> &'static str {
        "dce"
    }

    fn run(&mut self, scope: &mut Scope) -> bool {
        self.run_dce(scope)
    }
}
