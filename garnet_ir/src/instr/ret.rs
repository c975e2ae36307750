//! Return instruction.

use super::{Instr, InstrVisitor, Instruction, OperandList, Operation};
use crate::inline::RenamingContext;
use crate::operand::{Operand, ValueMap};
use smallvec::smallvec;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnInstr {
    value: Operand,
}

impl ReturnInstr {
    pub fn new(value: Operand) -> Self {
        Self { value }
    }

    #[inline]
    pub fn value(&self) -> &Operand {
        &self.value
    }
}

impl Instruction for ReturnInstr {
    fn operation(&self) -> Operation {
        Operation::Return
    }

    fn operands(&self) -> OperandList<'_> {
        smallvec![&self.value]
    }

    fn simplify_operands(&mut self, map: &ValueMap, force: bool) {
        self.value = self.value.simplify(map, force);
    }

    fn clone_for_inlining(&self, ctx: &mut dyn RenamingContext) -> Instr {
        Instr::Return(ReturnInstr::new(self.value.clone_for_inlining(ctx)))
    }

    fn has_side_effects(&self) -> bool {
        true
    }

    fn visit(&self, visitor: &mut dyn InstrVisitor) {
        visitor.visit_return(self);
    }
}

impl fmt::Display for ReturnInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "return({})", self.value)
    }
}
