//! Single-owner dispatch node.

use super::{CacheEntry, CacheGrowth, CacheState, DispatchContext, DispatchStats, invoke, resolve};
use crate::error::VmResult;
use garnet_core::{ShapeId, SourceLocation, Symbol, Value};
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use tracing::debug;

/// Inline cache for one call site, owned by one execution context.
#[derive(Debug)]
pub struct DispatchNode {
    name: Symbol,
    location: SourceLocation,
    cache: FxHashMap<ShapeId, CacheEntry>,
    /// Set once any fallback entry is cached. Never cleared, not even when the
    /// cache is invalidated.
    saw_fallback: bool,
    epoch: u64,
    stats: DispatchStats,
}

impl DispatchNode {
    /// Create an empty node for calls to `name` at `location`.
    pub fn new(name: impl Into<Symbol>, location: SourceLocation) -> Self {
        Self {
            name: name.into(),
            location,
            cache: FxHashMap::default(),
            saw_fallback: false,
            epoch: 0,
            stats: DispatchStats::default(),
        }
    }

    /// Call this site's method on `receiver`.
    ///
    /// Errors raised by the target are returned unchanged.
    pub fn dispatch(
        &mut self,
        ctx: &DispatchContext<'_>,
        receiver: &Value,
        block: Option<&Value>,
        args: &[Value],
    ) -> VmResult<Value> {
        self.sync_epoch(ctx.lookup.epoch());

        let shape = receiver.shape();
        let size = self.cache.len();
        let entry = match self.cache.entry(shape) {
            Entry::Occupied(slot) => {
                self.stats.hits += 1;
                slot.into_mut()
            }
            Entry::Vacant(slot) => {
                self.stats.misses += 1;
                let resolved = resolve(ctx, receiver, &self.name)?;
                if resolved.is_fallback() {
                    self.saw_fallback = true;
                }
                ctx.report(CacheGrowth {
                    method: self.name.clone(),
                    location: self.location.clone(),
                    shape,
                    is_fallback: resolved.is_fallback(),
                    size: size + 1,
                    limit: ctx.config.polymorphic_limit,
                });
                slot.insert(resolved)
            }
        };

        invoke(entry, self.saw_fallback, &self.name, receiver, block, args)
    }

    fn sync_epoch(&mut self, epoch: u64) {
        if epoch == self.epoch {
            return;
        }
        if !self.cache.is_empty() {
            debug!(
                method = %self.name,
                location = %self.location,
                dropped = self.cache.len(),
                epoch,
                "call site cache invalidated"
            );
            self.cache.clear();
            self.stats.invalidations += 1;
        }
        self.epoch = epoch;
    }

    #[inline]
    pub fn name(&self) -> &Symbol {
        &self.name
    }

    #[inline]
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    /// Number of cached shapes.
    #[inline]
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    #[inline]
    pub fn saw_fallback(&self) -> bool {
        self.saw_fallback
    }

    /// Entry cached for `shape`, if any.
    pub fn entry(&self, shape: ShapeId) -> Option<&CacheEntry> {
        self.cache.get(&shape)
    }

    /// Cached shapes, in no particular order.
    pub fn shapes(&self) -> impl Iterator<Item = ShapeId> + '_ {
        self.cache.keys().copied()
    }

    #[inline]
    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    pub fn state(&self, polymorphic_limit: usize) -> CacheState {
        CacheState::classify(self.cache.len(), polymorphic_limit)
    }
}
