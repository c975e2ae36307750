//! Call inlining transform.
//!
//! ```text
//!   caller                      callee                    caller after
//!   ──────                      ──────                    ────────────
//!   %v_3 = call(r, :f, 7)       x = recv_arg(0)           %i0_x = copy(7)
//!                               %v_0 = add(x, 1)    ──►   %v_4 = add(%i0_x, 1)
//!                               return(%v_0)              %v_3 = copy(%v_4)
//! ```
//!
//! Parameters become copies of the call's arguments and the trailing return
//! becomes a copy into the call's result. Every other callee instruction is
//! cloned through an [`InlineRenamer`]. The copies introduced here are exactly
//! what copy propagation removes afterwards.

use super::{InlineConfig, InlineRenamer, RenamingContext};
use crate::instr::{CopyInstr, Instr, Instruction};
use crate::operand::Operand;
use crate::scope::Scope;
use garnet_core::Symbol;
use std::ops::Range;
use thiserror::Error;
use tracing::debug;

// =============================================================================
// Inline Transform Error
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InlineError {
    #[error("instruction index {index} out of range (scope has {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("instruction {index} is not a call")]
    NotACall { index: usize },

    #[error("callee `{callee}` expects {expected} arguments, call passes {given}")]
    ArityMismatch {
        callee: Symbol,
        expected: usize,
        given: usize,
    },

    #[error("callee `{callee}` returns before its last instruction")]
    ReturnNotLast { callee: Symbol },

    #[error("callee `{callee}` has {size} instructions, limit is {limit}")]
    CalleeTooLarge {
        callee: Symbol,
        size: usize,
        limit: usize,
    },

    #[error("inlining depth {depth} exceeds limit {limit}")]
    DepthExceeded { depth: usize, limit: usize },
}

/// Result type for inline operations.
pub type InlineResult<T> = Result<T, InlineError>;

// =============================================================================
// Inline Info
// =============================================================================

/// What an inline did to the host scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineInfo {
    /// Id distinguishing this inlined copy within the host.
    pub inline_id: u32,
    /// Host instruction range now occupied by the inlined body.
    pub range: Range<usize>,
    /// Distinct callee variables renamed.
    pub variables_renamed: usize,
}

// =============================================================================
// Transform
// =============================================================================

/// Replace the call at `call_index` in `host` with a renamed copy of `callee`.
///
/// `callee` is only read; inlining the same callee again, at this or any other
/// call site, produces variables disjoint from every earlier copy.
pub fn inline_call(
    host: &mut Scope,
    call_index: usize,
    callee: &Scope,
    config: &InlineConfig,
) -> InlineResult<InlineInfo> {
    let call = match host.instrs().get(call_index) {
        Some(Instr::Call(call)) => call.clone(),
        Some(_) => return Err(InlineError::NotACall { index: call_index }),
        None => {
            return Err(InlineError::IndexOutOfRange {
                index: call_index,
                len: host.len(),
            });
        }
    };

    if callee.len() > config.max_callee_size {
        return Err(InlineError::CalleeTooLarge {
            callee: callee.name().clone(),
            size: callee.len(),
            limit: config.max_callee_size,
        });
    }

    let depth = callee.inline_depth() + 1;
    if depth > config.max_depth {
        return Err(InlineError::DepthExceeded {
            depth,
            limit: config.max_depth,
        });
    }

    if callee.arity() != call.args().len() {
        return Err(InlineError::ArityMismatch {
            callee: callee.name().clone(),
            expected: callee.arity(),
            given: call.args().len(),
        });
    }

    let last = callee.len().saturating_sub(1);
    if callee.instrs()[..last]
        .iter()
        .any(|instr| matches!(instr, Instr::Return(_)))
    {
        return Err(InlineError::ReturnNotLast {
            callee: callee.name().clone(),
        });
    }

    let mut renamer = InlineRenamer::new(host, config);
    let inline_id = renamer.inline_id();
    let mut body: Vec<Instr> = Vec::with_capacity(callee.len() + 1);
    let mut returned = false;

    for instr in callee.instrs() {
        match instr {
            Instr::ReceiveArg(recv) => {
                let param = renamer.rename_variable(recv.param());
                let arg = call.args()[recv.index() as usize].clone();
                body.push(CopyInstr::new(param, arg).into());
            }
            Instr::Return(ret) => {
                returned = true;
                if let Some(result) = call.result() {
                    let value = ret.value().clone_for_inlining(&mut renamer);
                    body.push(CopyInstr::new(result.clone(), value).into());
                }
            }
            other => body.push(other.clone_for_inlining(&mut renamer)),
        }
    }

    // Falling off the end of a method yields nil.
    if !returned {
        if let Some(result) = call.result() {
            body.push(CopyInstr::new(result.clone(), Operand::nil()).into());
        }
    }

    let variables_renamed = renamer.renamed_count();
    drop(renamer);

    let inserted = body.len();
    host.instrs_mut().splice(call_index..=call_index, body);
    host.note_inline_depth(depth);

    debug!(
        callee = %callee.name(),
        host = %host.name(),
        inline_id,
        inserted,
        "inlined call"
    );

    Ok(InlineInfo {
        inline_id,
        range: call_index..call_index + inserted,
        variables_renamed,
    })
}
