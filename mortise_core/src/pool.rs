// Copyright 2026 the Mortise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Explicit content recycling pool.
//!
//! Released content handles are kept on a free list per [`ContentShape`] and
//! handed back on the next acquire of the same shape. Ownership moves into
//! the registry on acquire and back into the pool on release; a handle the
//! pool has no room for is returned to the caller to be destroyed.

use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::component::ContentShape;

/// Counters describing pool traffic since creation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Acquires served from a free list.
    pub recycled: u64,
    /// Acquires that found the free list empty.
    pub misses: u64,
    /// Handles accepted back into a free list.
    pub released: u64,
    /// Handles rejected because the free list was full.
    pub overflowed: u64,
}

/// Per-shape free lists of content handles.
#[derive(Debug)]
pub struct ContentPool<C> {
    free: HashMap<ContentShape, Vec<C>>,
    capacity: usize,
    stats: PoolStats,
}

impl<C> ContentPool<C> {
    /// Creates a pool keeping at most `capacity` handles per shape.
    ///
    /// A capacity of zero disables recycling.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            free: HashMap::new(),
            capacity,
            stats: PoolStats::default(),
        }
    }

    /// Takes a recycled handle for `shape`, if one is available.
    pub fn acquire(&mut self, shape: ContentShape) -> Option<C> {
        let content = self.free.get_mut(&shape).and_then(Vec::pop);
        if content.is_some() {
            self.stats.recycled += 1;
        } else {
            self.stats.misses += 1;
        }
        content
    }

    /// Returns a handle to the pool.
    ///
    /// Gives the handle back when the free list for `shape` is full; the
    /// caller is then responsible for destroying it.
    pub fn release(&mut self, shape: ContentShape, content: C) -> Option<C> {
        if self.capacity == 0 {
            self.stats.overflowed += 1;
            return Some(content);
        }
        let list = self.free.entry(shape).or_default();
        if list.len() >= self.capacity {
            self.stats.overflowed += 1;
            return Some(content);
        }
        list.push(content);
        self.stats.released += 1;
        None
    }

    /// Number of pooled handles for `shape`.
    #[must_use]
    pub fn available(&self, shape: ContentShape) -> usize {
        self.free.get(&shape).map_or(0, Vec::len)
    }

    /// Traffic counters.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Empties every free list, yielding the pooled handles.
    pub fn drain(&mut self) -> impl Iterator<Item = C> + '_ {
        self.free.drain().flat_map(|(_, list)| list)
    }
}
