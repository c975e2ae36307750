//! Mutable instruction IR for the Garnet optimizer.
//!
//! # Core Components
//!
//! - **Variables** (`variable.rs`): method locals and compiler temporaries
//! - **Operands** (`operand.rs`): constants, variable references, compound operands
//! - **Instructions** (`instr/`): the instruction contract and its closed set of kinds
//! - **Scope** (`scope.rs`): an instruction sequence plus its temporary allocator
//! - **Inlining** (`inline/`): renaming contexts and the call-inlining transform
//! - **Optimization** (`opt/`): copy propagation, dead code elimination, pass pipeline
//!
//! # Simplification Protocol
//!
//! An optimizer walks a scope in definition order, feeding each instruction a
//! value map built from the results of earlier instructions. An instruction
//! rewrites its operands through the map and reports the operand that stands
//! for the value it produces. A copy reports its source, so every later use of
//! the copy's result is rewritten to the source and the copy itself becomes
//! dead.

pub mod inline;
pub mod instr;
pub mod opt;
pub mod operand;
pub mod scope;
pub mod variable;

pub use inline::{InlineConfig, InlineError, InlineInfo, InlineRenamer, InlineResult, RenamingContext, inline_call};
pub use instr::{
    BinOp, BinOpInstr, CallInstr, CopyInstr, Instr, InstrVisitor, Instruction, Operation,
    OperandList, ReceiveArgInstr, ReturnInstr,
};
pub use operand::{Constant, Operand, ValueMap};
pub use opt::{CopyPropagation, DeadCodeElimination, OptimizationPass, Pipeline, PipelineConfig};
pub use scope::Scope;
pub use variable::Variable;
