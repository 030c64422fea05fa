// This file is part of kvreactor.
// Copyright (C) 2026 kvreactor contributors
// SPDX-License-Identifier: Apache-2.0
// Licensed under the Apache License, Version 2.0 (the "License");
// You may not use this file except in compliance with the License.
// You may obtain a copy of the License at
// http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Progressive rehashing on top of [`super::table::HashTable`].
//!
//! A [`HashMap2`] never resizes its whole keyspace in one call. When the
//! primary table's load factor crosses [`MAX_LOAD_FACTOR`], the primary is
//! demoted to `secondary` and a fresh, double-capacity table takes its place
//! as `primary`. Every subsequent operation walks up to [`REHASH_WORK`]
//! slots of `secondary` before doing its own work, so no single call pays
//! for more than a bounded amount of rehashing work, whether or not those
//! slots happen to hold anything to migrate.

use super::table::{HashNode, HashTable};

/// Above this load factor (size / capacity), a rehash begins.
pub const MAX_LOAD_FACTOR: f64 = 8.0;

/// Maximum number of `secondary` slots (empty or occupied) visited per
/// operation. Bounding slot visits rather than migrations keeps a single
/// call's latency bounded even when a long run of empty slots sits ahead of
/// the migration cursor.
pub const REHASH_WORK: usize = 128;

const INITIAL_CAPACITY: usize = 4;

pub struct HashMap2<T> {
    primary: HashTable<T>,
    secondary: HashTable<T>,
    migration_cursor: usize,
}

impl<T> HashMap2<T> {
    pub fn new() -> Self {
        HashMap2 {
            primary: HashTable::new(),
            secondary: HashTable::new(),
            migration_cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.primary.len() + self.secondary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn rehashing(&self) -> bool {
        self.secondary.capacity() > 0
    }

    /// Migrate up to `REHASH_WORK` nodes from `secondary` into `primary`.
    /// Called at the start of every public operation.
    fn help_rehashing(&mut self) {
        if !self.rehashing() {
            return;
        }
        let primary = &mut self.primary;
        self.secondary
            .drain_budget(&mut self.migration_cursor, REHASH_WORK, |node| {
                primary.insert(node);
            });
        if self.secondary.is_empty() {
            self.secondary = HashTable::new();
            self.migration_cursor = 0;
        }
    }

    /// Demote `primary` to `secondary` and install a fresh, double-capacity
    /// table as the new `primary`.
    fn start_resizing(&mut self) {
        let new_cap = (self.primary.capacity().max(INITIAL_CAPACITY / 2)) * 2;
        let old_primary = std::mem::replace(&mut self.primary, HashTable::with_capacity(new_cap));
        self.secondary = old_primary;
        self.migration_cursor = 0;
        tracing::info!(
            new_capacity = new_cap,
            pending = self.secondary.len(),
            "keyspace rehash started"
        );
    }

    pub fn insert(&mut self, node: Box<HashNode<T>>) {
        self.help_rehashing();
        if self.primary.capacity() == 0 {
            self.primary = HashTable::with_capacity(INITIAL_CAPACITY);
        }
        self.primary.insert(node);
        if !self.rehashing() && self.primary.load_factor() > MAX_LOAD_FACTOR {
            self.start_resizing();
        }
    }

    pub fn lookup<F>(&mut self, hcode: u64, mut eq: F) -> Option<&T>
    where
        F: FnMut(&T) -> bool,
    {
        self.help_rehashing();
        if let Some(v) = self.primary.lookup(hcode, &mut eq) {
            return Some(v);
        }
        self.secondary.lookup(hcode, eq)
    }

    pub fn lookup_mut<F>(&mut self, hcode: u64, mut eq: F) -> Option<&mut T>
    where
        F: FnMut(&T) -> bool,
    {
        self.help_rehashing();
        if self.primary.lookup(hcode, &mut eq).is_some() {
            return self.primary.lookup_mut(hcode, eq);
        }
        self.secondary.lookup_mut(hcode, eq)
    }

    pub fn pop<F>(&mut self, hcode: u64, mut eq: F) -> Option<Box<HashNode<T>>>
    where
        F: FnMut(&T) -> bool,
    {
        self.help_rehashing();
        if let Some(n) = self.primary.detach(hcode, &mut eq) {
            return Some(n);
        }
        self.secondary.detach(hcode, eq)
    }

    /// Visit every live node. Used by `KEYS`-style commands.
    ///
    /// Note: this does a full O(n) walk and is exempt from the bounded-work
    /// rule that governs rehashing; it is only ever invoked directly as a
    /// command, never as a side effect of another operation.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&T),
    {
        self.primary.for_each_slot(&mut f);
        self.secondary.for_each_slot(&mut f);
    }
}

impl<T> Default for HashMap2<T> {
    fn default() -> Self {
        Self::new()
    }
}
