//! Optimization Pipeline.
//!
//! Orchestrates the scope passes with phase ordering, fixed-point iteration
//! and per-pass statistics.
//!
//! # Pass Phases
//!
//! 1. **Local**: copy propagation and constant folding
//! 2. **Cleanup**: DCE
//!
//! Inlining is not a phase: it needs a callee, so the caller runs
//! [`crate::inline_call`] first and then this pipeline over the host scope.

use super::OptimizationPass;
use super::copy_prop::CopyPropagation;
use super::dce::DeadCodeElimination;
use crate::scope::Scope;
use std::time::{Duration, Instant};
use tracing::debug;

// =============================================================================
// Pass Phase
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PassPhase {
    /// Local rewrites: copy propagation, folding.
    Local,
    /// Cleanup passes: DCE.
    Cleanup,
}

struct PassEntry {
    pass: Box<dyn OptimizationPass>,
    phase: PassPhase,
    runs: usize,
    changes: usize,
    time: Duration,
}

impl PassEntry {
    fn new<P: OptimizationPass + 'static>(pass: P, phase: PassPhase) -> Self {
        Self {
            pass: Box::new(pass),
            phase,
            runs: 0,
            changes: 0,
            time: Duration::ZERO,
        }
    }
}

// =============================================================================
// Pipeline Configuration
// =============================================================================

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Enable copy propagation.
    pub enable_copy_propagation: bool,

    /// Let copy propagation substitute locals. Scopes here are straight-line,
    /// so every definition dominates the instructions after it.
    pub propagate_locals: bool,

    /// Enable DCE.
    pub enable_dce: bool,

    /// Maximum iterations per phase.
    pub max_iterations: usize,

    /// Collect timing statistics.
    pub collect_timing: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            enable_copy_propagation: true,
            propagate_locals: true,
            enable_dce: true,
            max_iterations: 4,
            collect_timing: true,
        }
    }
}

impl PipelineConfig {
    /// Temporaries only, single iteration, no timing.
    pub fn minimal() -> Self {
        Self {
            propagate_locals: false,
            max_iterations: 1,
            collect_timing: false,
            ..Default::default()
        }
    }
}

// =============================================================================
// Optimization Pipeline
// =============================================================================

pub struct Pipeline {
    config: PipelineConfig,
    passes: Vec<PassEntry>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    pub fn with_config(config: PipelineConfig) -> Self {
        let mut pipeline = Self {
            config,
            passes: Vec::new(),
        };
        pipeline.register_default_passes();
        pipeline
    }

    fn register_default_passes(&mut self) {
        if self.config.enable_copy_propagation {
            let pass = CopyPropagation::new().with_locals(self.config.propagate_locals);
            self.register(pass, PassPhase::Local);
        }
        if self.config.enable_dce {
            self.register(DeadCodeElimination::new(), PassPhase::Cleanup);
        }
    }

    /// Register a custom pass.
    pub fn register<P: OptimizationPass + 'static>(&mut self, pass: P, phase: PassPhase) {
        self.passes.push(PassEntry::new(pass, phase));
    }

    /// Run every phase in order over `scope`.
    pub fn run(&mut self, scope: &mut Scope) -> PipelineStats {
        let start = Instant::now();
        let mut stats = PipelineStats {
            initial_size: scope.len(),
            ..Default::default()
        };

        for phase in [PassPhase::Local, PassPhase::Cleanup] {
            stats.total_iterations += self.run_phase(scope, phase);
            stats.phases_run += 1;
        }

        stats.final_size = scope.len();
        stats.total_time = start.elapsed();
        debug!(
            scope = %scope.name(),
            initial = stats.initial_size,
            final_size = stats.final_size,
            iterations = stats.total_iterations,
            "pipeline finished"
        );
        stats
    }

    fn run_phase(&mut self, scope: &mut Scope, phase: PassPhase) -> usize {
        let mut iterations = 0;

        for _ in 0..self.config.max_iterations {
            iterations += 1;
            let mut iter_changed = false;

            for entry in self.passes.iter_mut().filter(|e| e.phase == phase) {
                let start = self.config.collect_timing.then(Instant::now);

                let changed = entry.pass.run(scope);

                if let Some(start) = start {
                    entry.time += start.elapsed();
                }
                entry.runs += 1;
                if changed {
                    entry.changes += 1;
                    iter_changed = true;
                }
            }

            if !iter_changed {
                break;
            }
        }

        iterations
    }

    pub fn pass_stats(&self) -> Vec<PassStat> {
        self.passes
            .iter()
            .map(|e| PassStat {
                name: e.pass.name(),
                phase: e.phase,
                runs: e.runs,
                changes: e.changes,
                time: e.time,
            })
            .collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Statistics
// =============================================================================

#[derive(Debug, Clone)]
pub struct PassStat {
    pub name: &'static str,
    pub phase: PassPhase,
    pub runs: usize,
    /// Number of runs that changed the scope.
    pub changes: usize,
    pub time: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    pub total_iterations: usize,
    pub phases_run: usize,
    pub total_time: Duration,
    pub initial_size: usize,
    pub final_size: usize,
}

impl PipelineStats {
    /// Instructions removed by the run.
    pub fn removed(&self) -> usize {
        self.initial_size.saturating_sub(self.final_size)
    }
}

/// Run the default pipeline on a scope.
pub fn optimize(scope: &mut Scope) -> PipelineStats {
    Pipeline::new().run(scope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instr::{CopyInstr, Instr, Instruction, ReturnInstr};
    use crate::operand::Operand;
    use crate::variable::Variable;

    fn copy_chain() -> Scope {
        let mut scope = Scope::new("chain");
        scope.push(CopyInstr::new(Variable::temp(0), Operand::fixnum(5)));
        scope.push(CopyInstr::new(Variable::temp(1), Operand::var(Variable::temp(0))));
        scope.push(CopyInstr::new(Variable::temp(2), Operand::var(Variable::temp(1))));
        scope.push(ReturnInstr::new(Operand::var(Variable::temp(2))));
        scope
    }

    #[test]
    fn test_copies_eliminated() {
        let mut scope = copy_chain();
        let stats = optimize(&mut scope);

        assert_eq!(stats.initial_size, 4);
        assert_eq!(stats.final_size, 1);
        assert_eq!(stats.removed(), 3);
        assert!(matches!(&scope.instrs()[0], Instr::Return(r) if r.value() == &Operand::fixnum(5)));
    }

    #[test]
    fn test_pass_stats_recorded() {
        let mut pipeline = Pipeline::new();
        pipeline.run(&mut copy_chain());

        let stats = pipeline.pass_stats();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].name, "copy-propagation");
        assert_eq!(stats[0].phase, PassPhase::Local);
        assert!(stats[0].changes >= 1);
        assert_eq!(stats[1].name, "dce");
        assert_eq!(stats[1].changes, 1);
    }

    #[test]
    fn test_disabled_passes_not_registered() {
        let config = PipelineConfig {
            enable_dce: false,
            ..PipelineConfig::minimal()
        };
        let mut scope = copy_chain();
        let mut pipeline = Pipeline::with_config(config);
        pipeline.run(&mut scope);

        assert_eq!(pipeline.pass_stats().len(), 1);
        assert_eq!(scope.len(), 4);
        assert_eq!(scope.instrs()[3].operands()[0], &Operand::fixnum(5));
    }
}
