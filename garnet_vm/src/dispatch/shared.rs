//! Dispatch node reachable from several threads at once.
//!
//! The cache is a `DashMap`. Resolution runs outside any shard lock, so two
//! threads missing on the same shape may both resolve it; the first insert
//! wins and every racer invokes the winning entry. Only the winner reports
//! growth.
//!
//! Lookup epochs only move forward. A resolution started under an older epoch
//! than the node has since seen is used for that one call and never cached.

use super::{CacheEntry, CacheGrowth, CacheState, DispatchContext, DispatchStats, invoke, resolve};
use crate::error::VmResult;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use garnet_core::{ShapeId, SourceLocation, Symbol, Value};
use rustc_hash::FxBuildHasher;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::debug;

/// Inline cache for one call site, shared between threads.
///
/// Follows the same protocol as [`super::DispatchNode`] through `&self`.
pub struct SharedDispatchNode {
    name: Symbol,
    location: SourceLocation,
    cache: DashMap<ShapeId, CacheEntry, FxBuildHasher>,
    /// Stored before any fallback entry becomes visible in `cache`.
    saw_fallback: AtomicBool,
    epoch: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    invalidations: AtomicU64,
}

impl SharedDispatchNode {
    /// Create an empty node for calls to `name` at `location`.
    pub fn new(name: impl Into<Symbol>, location: SourceLocation) -> Self {
        Self {
            name: name.into(),
            location,
            cache: DashMap::with_hasher(FxBuildHasher),
            saw_fallback: AtomicBool::new(false),
            epoch: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            invalidations: AtomicU64::new(0),
        }
    }

    /// Same protocol as [`super::DispatchNode::dispatch`].
    pub fn dispatch(
        &self,
        ctx: &DispatchContext<'_>,
        receiver: &Value,
        block: Option<&Value>,
        args: &[Value],
    ) -> VmResult<Value> {
        let epoch = ctx.lookup.epoch();
        self.sync_epoch(epoch);

        let shape = receiver.shape();
        // Clone out of the map so no shard lock is held while the target runs.
        let cached = self.cache.get(&shape).map(|entry| entry.clone());
        let entry = match cached {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                entry
            }
            None => self.populate(ctx, receiver, shape, epoch)?,
        };

        invoke(
            &entry,
            self.saw_fallback.load(Ordering::Acquire),
            &self.name,
            receiver,
            block,
            args,
        )
    }

    fn populate(
        &self,
        ctx: &DispatchContext<'_>,
        receiver: &Value,
        shape: ShapeId,
        epoch: u64,
    ) -> VmResult<CacheEntry> {
        self.misses.fetch_add(1, Ordering::Relaxed);
        let resolved = resolve(ctx, receiver, &self.name)?;
        if resolved.is_fallback() {
            self.saw_fallback.store(true, Ordering::Release);
        }

        // The epoch is compared under the shard lock. An invalidation that
        // lands after the comparison has to take the same lock to clear.
        let slot = self.cache.entry(shape);
        if self.epoch.load(Ordering::Acquire) != epoch {
            drop(slot);
            return Ok(resolved);
        }
        let (entry, won) = match slot {
            Entry::Occupied(slot) => (slot.get().clone(), false),
            Entry::Vacant(slot) => (slot.insert(resolved).clone(), true),
        };

        if won {
            ctx.report(CacheGrowth {
                method: self.name.clone(),
                location: self.location.clone(),
                shape,
                is_fallback: entry.is_fallback(),
                size: self.cache.len(),
                limit: ctx.config.polymorphic_limit,
            });
        }
        Ok(entry)
    }

    fn sync_epoch(&self, epoch: u64) {
        let mut seen = self.epoch.load(Ordering::Acquire);
        while seen < epoch {
            match self
                .epoch
                .compare_exchange(seen, epoch, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => {
                    let dropped = self.cache.len();
                    self.cache.clear();
                    if dropped > 0 {
                        debug!(method = %self.name, location = %self.location, dropped, epoch, "shared call site cache invalidated");
                        self.invalidations.fetch_add(1, Ordering::Relaxed);
                    }
                    return;
                }
                Err(current) => seen = current,
            }
        }
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
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Whether a fallback entry was ever cached here.
    pub fn saw_fallback(&self) -> bool {
        self.saw_fallback.load(Ordering::Acquire)
    }

    /// Copy of the entry cached for `shape`.
    pub fn entry(&self, shape: ShapeId) -> Option<CacheEntry> {
        self.cache.get(&shape).map(|entry| entry.clone())
    }

    /// Snapshot of the counters. Each one is read separately.
    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
        }
    }

    pub fn state(&self, polymorphic_limit: usize) -> CacheState {
        CacheState::classify(self.cache.len(), polymorphic_limit)
    }
}
