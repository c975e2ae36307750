//! Binary operator instruction: `result = lhs <op> rhs`.
//!
//! When both operands simplify to fixnum constants the instruction reports the
//! folded constant as its value. Folding is skipped when the scope has seen the
//! fixnum operators redefined, and on overflow, where the runtime promotes to a
//! bignum instead.

use super::{Instr, InstrVisitor, Instruction, OperandList, Operation};
use crate::inline::RenamingContext;
use crate::operand::{Constant, Operand, ValueMap};
use crate::scope::Scope;
use crate::variable::Variable;
use smallvec::smallvec;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Lt,
    Eq,
}

impl BinOp {
    /// Fold two fixnums. `None` when the result does not fit a fixnum.
    pub fn fold(self, lhs: i64, rhs: i64) -> Option<Constant> {
        match self {
            BinOp::Add => lhs.checked_add(rhs).map(Constant::Fixnum),
            BinOp::Sub => lhs.checked_sub(rhs).map(Constant::Fixnum),
            BinOp::Mul => lhs.checked_mul(rhs).map(Constant::Fixnum),
            BinOp::Lt => Some(Constant::Bool(lhs < rhs)),
            BinOp::Eq => Some(Constant::Bool(lhs == rhs)),
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinOp::Add => "add",
            BinOp::Sub => "sub",
            BinOp::Mul => "mul",
            BinOp::Lt => "lt",
            BinOp::Eq => "eq",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinOpInstr {
    op: BinOp,
    result: Variable,
    lhs: Operand,
    rhs: Operand,
}

impl BinOpInstr {
    pub fn new(op: BinOp, result: Variable, lhs: Operand, rhs: Operand) -> Self {
        Self {
            op,
            result,
            lhs,
            rhs,
        }
    }

    #[inline]
    pub fn op(&self) -> BinOp {
        self.op
    }

    #[inline]
    pub fn lhs(&self) -> &Operand {
        &self.lhs
    }

    #[inline]
    pub fn rhs(&self) -> &Operand {
        &self.rhs
    }
}

impl Instruction for BinOpInstr {
    fn operation(&self) -> Operation {
        Operation::BinOp(self.op)
    }

    fn operands(&self) -> OperandList<'_> {
        smallvec![&self.lhs, &self.rhs]
    }

    fn result(&self) -> Option<&Variable> {
        Some(&self.result)
    }

    fn rebind_result(&mut self, var: Variable) -> Option<Variable> {
        Some(std::mem::replace(&mut self.result, var))
    }

    fn simplify_operands(&mut self, map: &ValueMap, force: bool) {
        self.lhs = self.lhs.simplify(map, force);
        self.rhs = self.rhs.simplify(map, force);
    }

    fn simplify_and_get_result(&mut self, scope: &Scope, map: &ValueMap) -> Option<Operand> {
        self.simplify_operands(map, false);

        if !scope.fixnum_ops_redefined() {
            if let (Some(a), Some(b)) = (self.lhs.as_fixnum(), self.rhs.as_fixnum()) {
                if let Some(folded) = self.op.fold(a, b) {
                    return Some(Operand::Const(folded));
                }
            }
        }
        Some(Operand::Var(self.result.clone()))
    }

    fn clone_for_inlining(&self, ctx: &mut dyn RenamingContext) -> Instr {
        Instr::BinOp(BinOpInstr::new(
            self.op,
            ctx.rename_variable(&self.result),
            self.lhs.clone_for_inlining(ctx),
            self.rhs.clone_for_inlining(ctx),
        ))
    }

    fn visit(&self, visitor: &mut dyn InstrVisitor) {
        visitor.visit_bin_op(self);
    }
}

impl fmt::Display for BinOpInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}({}, {})", self.result, self.op, self.lhs, self.rhs)
    }
}
