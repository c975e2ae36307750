//! Double-dispatch hook over instruction kinds.

use super::{BinOpInstr, CallInstr, CopyInstr, ReceiveArgInstr, ReturnInstr};

/// Per-kind callbacks. Every method defaults to doing nothing, so a pass only
/// overrides the kinds it cares about.
pub trait InstrVisitor {
    fn visit_copy(&mut self, _instr: &CopyInstr) {}

    fn visit_bin_op(&mut self, _instr: &BinOpInstr) {}

    fn visit_call(&mut self, _instr: &CallInstr) {}

    fn visit_receive_arg(&mut self, _instr: &ReceiveArgInstr) {}

    fn visit_return(&mut self, _instr: &ReturnInstr) {}
}
