//! IR instructions.
//!
//! Every instruction kind implements [`Instruction`], the capability interface
//! optimizer passes program against. Passes that need to handle kinds
//! differently match on the closed [`Instr`] enum or implement
//! [`InstrVisitor`].
//!
//! # Contract
//!
//! - `operands()` lists every operand the instruction reads, in order, and is
//!   always in sync with the instruction's fields.
//! - `result()` is `None` iff the instruction defines no variable.
//! - `simplify_operands` is idempotent for a fixed value map.
//! - `simplify_and_get_result` reports the operand standing for the value the
//!   instruction produces, which need not be its own result variable.
//! - `clone_for_inlining` never mutates `self`; the clone shares no mutable
//!   state with the original.

mod binop;
mod call;
mod copy;
mod receive;
mod ret;
mod visitor;

pub use binop::{BinOp, BinOpInstr};
pub use call::CallInstr;
pub use copy::CopyInstr;
pub use receive::ReceiveArgInstr;
pub use ret::ReturnInstr;
pub use visitor::InstrVisitor;

use crate::inline::RenamingContext;
use crate::operand::{Operand, ValueMap};
use crate::scope::Scope;
use crate::variable::Variable;
use smallvec::SmallVec;
use std::fmt;

/// Borrowed operand list. Almost every instruction reads four or fewer.
pub type OperandList<'a> = SmallVec<[&'a Operand; 4]>;

// =============================================================================
// Operation Tag
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Copy,
    BinOp(BinOp),
    Call,
    ReceiveArg,
    Return,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Copy => f.write_str("copy"),
            Operation::BinOp(op) => write!(f, "{}", op),
            Operation::Call => f.write_str("call"),
            Operation::ReceiveArg => f.write_str("recv_arg"),
            Operation::Return => f.write_str("return"),
        }
    }
}

// =============================================================================
// Instruction Contract
// =============================================================================

pub trait Instruction: fmt::Display {
    fn operation(&self) -> Operation;

    /// Every operand this instruction reads.
    fn operands(&self) -> OperandList<'_>;

    /// The variable this instruction defines, if any.
    fn result(&self) -> Option<&Variable> {
        None
    }

    /// Replace the defined variable, returning the previous one. Operands are
    /// untouched. Instructions that define nothing ignore the request.
    fn rebind_result(&mut self, _var: Variable) -> Option<Variable> {
        None
    }

    /// Replace every operand with its simplified form under `map`.
    fn simplify_operands(&mut self, map: &ValueMap, force: bool);

    /// Simplify operands (without `force`) and return the operand representing
    /// the value this instruction produces. Instructions defining nothing
    /// return `None`.
    fn simplify_and_get_result(&mut self, _scope: &Scope, map: &ValueMap) -> Option<Operand> {
        self.simplify_operands(map, false);
        self.result().cloned().map(Operand::Var)
    }

    /// Duplicate this instruction with every variable renamed through `ctx`.
    fn clone_for_inlining(&self, ctx: &mut dyn RenamingContext) -> Instr;

    /// Check if removing this instruction could change observable behavior
    /// even when its result is unused.
    fn has_side_effects(&self) -> bool {
        false
    }

    fn visit(&self, visitor: &mut dyn InstrVisitor);
}

// =============================================================================
// Closed Instruction Set
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instr {
    Copy(CopyInstr),
    BinOp(BinOpInstr),
    Call(CallInstr),
    ReceiveArg(ReceiveArgInstr),
    Return(ReturnInstr),
}

macro_rules! each_kind {
    ($instr:expr, $inner:ident => $body:expr) => {
        match $instr {
            Instr::Copy($inner) => $body,
            Instr::BinOp($inner) => $body,
            Instr::Call($inner) => $body,
            Instr::ReceiveArg($inner) => $body,
            Instr::Return($inner) => $body,
        }
    };
}

impl Instruction for Instr {
    fn operation(&self) -> Operation {
        each_kind!(self, i => i.operation())
    }

    fn operands(&self) -> OperandList<'_> {
        each_kind!(self, i => i.operands())
    }

    fn result(&self) -> Option<&Variable> {
        each_kind!(self, i => i.result())
    }

    fn rebind_result(&mut self, var: Variable) -> Option<Variable> {
        each_kind!(self, i => i.rebind_result(var))
    }

    fn simplify_operands(&mut self, map: &ValueMap, force: bool) {
        each_kind!(self, i => i.simplify_operands(map, force))
    }

    fn simplify_and_get_result(&mut self, scope: &Scope, map: &ValueMap) -> Option<Operand> {
        each_kind!(self, i => i.simplify_and_get_result(scope, map))
    }

    fn clone_for_inlining(&self, ctx: &mut dyn RenamingContext) -> Instr {
        each_kind!(self, i => i.clone_for_inlining(ctx))
    }

    fn has_side_effects(&self) -> bool {
        each_kind!(self, i => i.has_side_effects())
    }

    fn visit(&self, visitor: &mut dyn InstrVisitor) {
        each_kind!(self, i => i.visit(visitor))
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        each_kind!(self, i => fmt::Display::fmt(i, f))
    }
}

impl From<CopyInstr> for Instr {
    fn from(instr: CopyInstr) -> Self {
        Instr::Copy(instr)
    }
}

impl From<BinOpInstr> for Instr {
    fn from(instr: BinOpInstr) -> Self {
        Instr::BinOp(instr)
    }
}

impl From<CallInstr> for Instr {
    fn from(instr: CallInstr) -> Self {
        Instr::Call(instr)
    }
}

impl From<ReceiveArgInstr> for Instr {
    fn from(instr: ReceiveArgInstr) -> Self {
        Instr::ReceiveArg(instr)
    }
}

impl From<ReturnInstr> for Instr {
    fn from(instr: ReturnInstr) -> Self {
        Instr::Return(instr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct KindCounter {
        copies: usize,
        calls: usize,
        others: usize,
    }

    impl InstrVisitor for KindCounter {
        fn visit_copy(&mut self, _instr: &CopyInstr) {
            self.copies += 1;
        }

        fn visit_call(&mut self, _instr: &CallInstr) {
            self.calls += 1;
        }

        fn visit_return(&mut self, _instr: &ReturnInstr) {
            self.others += 1;
        }
    }

    #[test]
    fn test_visitor_dispatches_by_kind() {
        let instrs: Vec<Instr> = vec![
            CopyInstr::new(Variable::temp(0), Operand::fixnum(1)).into(),
            CallInstr::new(Some(Variable::temp(1)), Operand::var(Variable::temp(0)), "to_s", vec![]).into(),
            BinOpInstr::new(BinOp::Add, Variable::temp(2), Operand::fixnum(1), Operand::fixnum(2)).into(),
            ReturnInstr::new(Operand::var(Variable::temp(1))).into(),
        ];

        let mut counter = KindCounter::default();
        for instr in &instrs {
            instr.visit(&mut counter);
        }
        assert_eq!(counter.copies, 1);
        assert_eq!(counter.calls, 1);
        assert_eq!(counter.others, 1);
    }

    #[test]
    fn test_result_absent_iff_nothing_defined() {
        let ret: Instr = ReturnInstr::new(Operand::nil()).into();
        assert!(ret.result().is_none());

        let call: Instr = CallInstr::new(None, Operand::nil(), "puts", vec![]).into();
        assert!(call.result().is_none());

        let copy: Instr = CopyInstr::new(Variable::temp(0), Operand::nil()).into();
        assert_eq!(copy.result(), Some(&Variable::temp(0)));
    }

    #[test]
    fn test_rebind_result_keeps_operands() {
        let mut instr: Instr =
            BinOpInstr::new(BinOp::Mul, Variable::temp(0), Operand::var(Variable::local("a")), Operand::fixnum(2))
                .into();
        let before: Vec<Operand> = instr.operands().into_iter().cloned().collect();

        let old = instr.rebind_result(Variable::temp(5));
        assert_eq!(old, Some(Variable::temp(0)));
        assert_eq!(instr.result(), Some(&Variable::temp(5)));

        let after: Vec<Operand> = instr.operands().into_iter().cloned().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_rebind_result_on_return_is_ignored() {
        let mut instr: Instr = ReturnInstr::new(Operand::nil()).into();
        assert_eq!(instr.rebind_result(Variable::temp(1)), None);
        assert!(instr.result().is_none());
    }

    #[test]
    fn test_operation_tags() {
        let copy: Instr = CopyInstr::new(Variable::temp(0), Operand::nil()).into();
        assert_eq!(copy.operation(), Operation::Copy);
        let add: Instr =
            BinOpInstr::new(BinOp::Add, Variable::temp(1), Operand::fixnum(1), Operand::fixnum(1)).into();
        assert_eq!(add.operation(), Operation::BinOp(BinOp::Add));
        assert_eq!(add.operation().to_string(), "add");
    }
}
