//! Polymorphic inline caching for dynamic method calls.
//!
//! Each static call expression owns one dispatch node. The node maps receiver
//! shapes to resolved targets, so after the first call for a shape the call
//! costs one hash lookup instead of a walk over the receiver's ancestry.
//!
//! # Dispatch Protocol
//!
//! 1. Take the receiver's shape and look it up in the node's cache
//! 2. On a miss, resolve the method name; if that fails, resolve the
//!    fallback handler; if that fails too, raise the fatal
//!    [`RuntimeError::FallbackExhausted`] and leave the cache alone
//! 3. Cache the entry and report the growth to the diagnostic sink
//! 4. Invoke the target. Fallback targets receive the requested name as a
//!    symbol in front of the original arguments
//!
//! Entries are never evicted individually. The whole cache is dropped when the
//! lookup's epoch changes.
//!
//! # Nodes
//!
//! - [`DispatchNode`]: single owner, `&mut self`
//! - [`SharedDispatchNode`]: `&self` and `Sync`, for code shared by threads

mod entry;
mod node;
mod shared;
mod sink;

pub use entry::{CacheEntry, CacheGrowth};
pub use node::DispatchNode;
pub use shared::SharedDispatchNode;
pub use sink::{DiagnosticSink, RecordingSink, TracingSink};

use crate::config::DispatchConfig;
use crate::error::{RuntimeError, VmResult};
use crate::lookup::MethodLookup;
use garnet_core::{Symbol, Value};
use smallvec::SmallVec;

static TRACING_SINK: TracingSink = TracingSink;

// =============================================================================
// Dispatch Context
// =============================================================================

/// Collaborators a node needs for one dispatch.
#[derive(Clone, Copy)]
pub struct DispatchContext<'a> {
    pub lookup: &'a dyn MethodLookup,
    pub sink: Option<&'a dyn DiagnosticSink>,
    pub config: &'a DispatchConfig,
}

impl<'a> DispatchContext<'a> {
    /// Context reporting cache growth through [`TracingSink`].
    pub fn new(lookup: &'a dyn MethodLookup, config: &'a DispatchConfig) -> Self {
        Self {
            lookup,
            sink: Some(&TRACING_SINK),
            config,
        }
    }

    /// Report cache growth to `sink` instead of the tracing sink.
    pub fn with_sink(mut self, sink: &'a dyn DiagnosticSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Drop growth reports entirely.
    pub fn without_sink(mut self) -> Self {
        self.sink = None;
        self
    }

    fn report(&self, event: CacheGrowth) {
        if let Some(sink) = self.sink {
            sink.cache_grew(&event);
        }
    }
}

// =============================================================================
// Shared Routines
// =============================================================================

/// Resolve `name` for `receiver`, falling back to the configured handler.
fn resolve(ctx: &DispatchContext<'_>, receiver: &Value, name: &Symbol) -> VmResult<CacheEntry> {
    if let Some(target) = ctx.lookup.lookup(receiver, name) {
        return Ok(CacheEntry::direct(target));
    }

    let fallback = &ctx.config.fallback_name;
    match ctx.lookup.lookup(receiver, fallback) {
        Some(target) => Ok(CacheEntry::fallback(target)),
        None => Err(RuntimeError::FallbackExhausted {
            receiver: receiver.to_string(),
            fallback: fallback.clone(),
        }),
    }
}

/// Call the entry's target, prepending the requested name for fallbacks.
fn invoke(
    entry: &CacheEntry,
    saw_fallback: bool,
    name: &Symbol,
    receiver: &Value,
    block: Option<&Value>,
    args: &[Value],
) -> VmResult<Value> {
    if saw_fallback && entry.is_fallback() {
        let mut full: SmallVec<[Value; 8]> = SmallVec::with_capacity(args.len() + 1);
        full.push(Value::Symbol(name.clone()));
        full.extend(args.iter().cloned());
        entry.target().call(receiver, block, &full)
    } else {
        entry.target().call(receiver, block, args)
    }
}

// =============================================================================
// Inspection
// =============================================================================

/// Hit and miss counters of one node. A miss is one resolution attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub hits: u64,
    pub misses: u64,
    /// Times the cache was discarded because the lookup epoch moved.
    pub invalidations: u64,
}

impl DispatchStats {
    /// Hit rate as a percentage.
    pub fn hit_rate(&self) -> f32 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f32) / (total as f32) * 100.0
        }
    }
}

/// Advisory classification of a call site by the number of cached shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Nothing cached yet.
    Uninitialized,
    /// Exactly one shape.
    Monomorphic,
    /// Up to the polymorphic limit.
    Polymorphic,
    /// Beyond the limit. Caching continues.
    Megamorphic,
}

impl CacheState {
    /// Classify a cache holding `size` shapes.
    pub fn classify(size: usize, polymorphic_limit: usize) -> Self {
        match size {
            0 => CacheState::Uninitialized,
            1 => CacheState::Monomorphic,
            n if n <= polymorphic_limit => CacheState::Polymorphic,
            _ => CacheState::Megamorphic,
        }
    }
}
