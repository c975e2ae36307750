//! Copy instruction: `result = source`.
//!
//! The copy reports its simplified source as the value it produces, not its
//! own result. An optimizer that records that value in its map rewrites every
//! later use of `result` to `source`, which leaves the copy dead. Chains such as
//! `a = b; c = a` collapse in a single walk in definition order, because by the
//! time `c = a` is simplified the map already sends `a` to `b`.

use super::{Instr, InstrVisitor, Instruction, OperandList, Operation};
use crate::inline::RenamingContext;
use crate::operand::{Operand, ValueMap};
use crate::scope::Scope;
use crate::variable::Variable;
use smallvec::smallvec;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyInstr {
    result: Variable,
    source: Operand,
}

impl CopyInstr {
    pub fn new(result: Variable, source: Operand) -> Self {
        Self { result, source }
    }

    #[inline]
    pub fn source(&self) -> &Operand {
        &self.source
    }
}

impl Instruction for CopyInstr {
    fn operation(&self) -> Operation {
        Operation::Copy
    }

    fn operands(&self) -> OperandList<'_> {
        smallvec![&self.source]
    }

    fn result(&self) -> Option<&Variable> {
        Some(&self.result)
    }

    fn rebind_result(&mut self, var: Variable) -> Option<Variable> {
        Some(std::mem::replace(&mut self.result, var))
    }

    fn simplify_operands(&mut self, map: &ValueMap, force: bool) {
        self.source = self.source.simplify(map, force);
    }

    fn simplify_and_get_result(&mut self, _scope: &Scope, map: &ValueMap) -> Option<Operand> {
        self.simplify_operands(map, false);
        Some(self.source.clone())
    }

    fn clone_for_inlining(&self, ctx: &mut dyn RenamingContext) -> Instr {
        Instr::Copy(CopyInstr::new(
            ctx.rename_variable(&self.result),
            self.source.clone_for_inlining(ctx),
        ))
    }

    fn visit(&self, visitor: &mut dyn InstrVisitor) {
        visitor.visit_copy(self);
    }
}

impl fmt::Display for CopyInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = copy({})", self.result, self.source)
    }
}
