// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

use crate::ir::BlockId;

/// Per-block side table owned by an analysis pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PassInfoPool<T> {
    infos: Vec<Option<T>>,
}

impl<T> PassInfoPool<T> {
    /// Creates a pool with room for `block_count` blocks and no entries.
    #[must_use]
    pub fn new(block_count: usize) -> Self {
        let mut infos = Vec::with_capacity(block_count);
        infos.resize_with(block_count, || None);
        Self { infos }
    }

    /// Stores the info for `block`, replacing any previous entry.
    ///
    /// # Panics
    ///
    /// Panics if `block` is outside the pool.
    pub fn insert(&mut self, block: BlockId, info: T) {
        self.infos[block.index()] = Some(info);
    }

    /// Returns the info for `block`, if present.
    #[must_use]
    pub fn get(&self, block: BlockId) -> Option<&T> {
        self.infos.get(block.index())?.as_ref()
    }

    /// Returns the info for `block` mutably, if present.
    pub fn get_mut(&mut self, block: BlockId) -> Option<&mut T> {
        self.infos.get_mut(block.index())?.as_mut()
    }

    /// Drops every entry, keeping the block capacity.
    pub fn clear(&mut self) {
        self.infos.iter_mut().for_each(|slot| *slot = None);
    }

    /// Iterates over the populated entries in block order.
    pub fn iter(&self) -> impl Iterator<Item = (BlockId, &T)> + '_ {
        self.infos.iter().enumerate().filter_map(|(i, info)| {
            let id = BlockId::new(u32::try_from(i).ok()?);
            Some((id, info.as_ref()?))
        })
    }
}
