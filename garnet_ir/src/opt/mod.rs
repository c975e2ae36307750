//! Optimization passes over instruction scopes.
//!
//! - **Copy propagation** (`copy_prop.rs`): forward walk driving the
//!   simplification protocol
//! - **Dead code elimination** (`dce.rs`): drops side-effect-free definitions of
//!   unused temporaries
//! - **Pipeline** (`pipeline.rs`): runs passes by phase to a fixed point
//!
//! Passes take the scope by `&mut`, so exactly one pass owns the instruction
//! sequence at any time and instructions are rewritten in place.

mod copy_prop;
mod dce;
mod pipeline;

pub use copy_prop::{CopyPropStats, CopyPropagation};
pub use dce::DeadCodeElimination;
pub use pipeline::{PassPhase, PassStat, Pipeline, PipelineConfig, PipelineStats, optimize};

use crate::scope::Scope;

/// A transformation over one scope.
pub trait OptimizationPass {
    fn name(&self) -> &'static str;

    /// Run the pass. Returns `true` if the scope changed.
    fn run(&mut self, scope: &mut Scope) -> bool;
}
