//! Dynamic method call: `[result =] receiver.name(args...)`.
//!
//! At run time each call instruction owns one dispatch node keyed by `name`.
//! In the IR it is an opaque side effect: it is never removed, and its result
//! is only ever itself.

use super::{Instr, InstrVisitor, Instruction, OperandList, Operation};
use crate::inline::RenamingContext;
use crate::operand::{Operand, ValueMap};
use crate::variable::Variable;
use garnet_core::Symbol;
use smallvec::SmallVec;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallInstr {
    result: Option<Variable>,
    receiver: Operand,
    name: Symbol,
    args: SmallVec<[Operand; 4]>,
}

impl CallInstr {
    pub fn new(
        result: Option<Variable>,
        receiver: Operand,
        name: impl Into<Symbol>,
        args: impl IntoIterator<Item = Operand>,
    ) -> Self {
        Self {
            result,
            receiver,
            name: name.into(),
            args: args.into_iter().collect(),
        }
    }

    #[inline]
    pub fn receiver(&self) -> &Operand {
        &self.receiver
    }

    #[inline]
    pub fn name(&self) -> &Symbol {
        &self.name
    }

    #[inline]
    pub fn args(&self) -> &[Operand] {
        &self.args
    }
}

impl Instruction for CallInstr {
    fn operation(&self) -> Operation {
        Operation::Call
    }

    fn operands(&self) -> OperandList<'_> {
        let mut operands = OperandList::with_capacity(1 + self.args.len());
        operands.push(&self.receiver);
        operands.extend(self.args.iter());
        operands
    }

    fn result(&self) -> Option<&Variable> {
        self.result.as_ref()
    }

    fn rebind_result(&mut self, var: Variable) -> Option<Variable> {
        self.result.as_mut().map(|slot| std::mem::replace(slot, var))
    }

    fn simplify_operands(&mut self, map: &ValueMap, force: bool) {
        self.receiver = self.receiver.simplify(map, force);
        for arg in self.args.iter_mut() {
            *arg = arg.simplify(map, force);
        }
    }

    fn clone_for_inlining(&self, ctx: &mut dyn RenamingContext) -> Instr {
        Instr::Call(CallInstr {
            result: self.result.as_ref().map(|r| ctx.rename_variable(r)),
            receiver: self.receiver.clone_for_inlining(ctx),
            name: self.name.clone(),
            args: self.args.iter().map(|a| a.clone_for_inlining(ctx)).collect(),
        })
    }

    fn has_side_effects(&self) -> bool {
        true
    }

    fn visit(&self, visitor: &mut dyn InstrVisitor) {
        visitor.visit_call(self);
    }
}

impl fmt::Display for CallInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(result) = &self.result {
            write!(f, "{} = ", result)?;
        }
        write!(f, "call({}, :{}", self.receiver, self.name)?;
        for arg in &self.args {
            write!(f, ", {}", arg)?;
        }
        f.write_str(")")
    }
}
