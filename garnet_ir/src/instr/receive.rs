//! Parameter definition: `result = <argument #index>`.

use super::{Instr, InstrVisitor, Instruction, OperandList, Operation};
use crate::inline::RenamingContext;
use crate::operand::ValueMap;
use crate::variable::Variable;
use smallvec::SmallVec;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiveArgInstr {
    result: Variable,
    index: u32,
}

impl ReceiveArgInstr {
    pub fn new(result: Variable, index: u32) -> Self {
        Self { result, index }
    }

    /// The parameter variable being defined.
    #[inline]
    pub fn param(&self) -> &Variable {
        &self.result
    }

    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl Instruction for ReceiveArgInstr {
    fn operation(&self) -> Operation {
        Operation::ReceiveArg
    }

    fn operands(&self) -> OperandList<'_> {
        SmallVec::new()
    }

    fn result(&self) -> Option<&Variable> {
        Some(&self.result)
    }

    fn rebind_result(&mut self, var: Variable) -> Option<Variable> {
        Some(std::mem::replace(&mut self.result, var))
    }

    fn simplify_operands(&mut self, _map: &ValueMap, _force: bool) {}

    fn clone_for_inlining(&self, ctx: &mut dyn RenamingContext) -> Instr {
        Instr::ReceiveArg(ReceiveArgInstr::new(ctx.rename_variable(&self.result), self.index))
    }

    // The argument is only known to the caller, so removing a parameter
    // definition would change the method's arity.
    fn has_side_effects(&self) -> bool {
        true
    }

    fn visit(&self, visitor: &mut dyn InstrVisitor) {
        visitor.visit_receive_arg(self);
    }
}

impl fmt::Display for ReceiveArgInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = recv_arg({})", self.result, self.index)
    }
}
