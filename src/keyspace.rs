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

//! The global keyspace: one progressively-rehashed hash map owning every
//! top-level entry, whichever of the value types it holds.

use crate::hash::{str_hash, HashMap2, HashNode};
use crate::zset::SortedSet;

/// A top-level value. `GET`/`SET`/`DEL` operate on [`Entry::Str`]; the
/// `Z*` commands operate on [`Entry::ZSet`].
pub enum Entry {
    Str(String),
    ZSet(SortedSet),
}

impl Entry {
    pub fn type_name(&self) -> &'static str {
        match self {
            Entry::Str(_) => "string",
            Entry::ZSet(_) => "zset",
        }
    }
}

/// One keyed slot in the keyspace: the key plus its value. Stored as the
/// hash table's payload; `keyed_entry.0` is compared by the `eq` callback
/// every lookup passes in, recovering `str_hash` collisions correctly even
/// when hash codes coincide for distinct keys.
pub type KeyedEntry = (String, Entry);

pub struct Keyspace {
    entries: HashMap2<KeyedEntry>,
}

impl Keyspace {
    pub fn new() -> Self {
        Keyspace {
            entries: HashMap2::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&mut self, key: &str) -> Option<&Entry> {
        let hcode = str_hash(key.as_bytes());
        self.entries
            .lookup(hcode, |(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Entry> {
        let hcode = str_hash(key.as_bytes());
        self.entries
            .lookup_mut(hcode, |(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Insert or overwrite `key` with `entry`. Returns the old entry, if any.
    pub fn set(&mut self, key: &str, entry: Entry) -> Option<Entry> {
        let hcode = str_hash(key.as_bytes());
        if let Some(slot) = self.entries.lookup_mut(hcode, |(k, _)| k == key) {
            let old = std::mem::replace(&mut slot.1, entry);
            return Some(old);
        }
        self.entries
            .insert(Box::new(HashNode::new(hcode, (key.to_string(), entry))));
        None
    }

    /// Remove `key`. Returns `true` if it was present.
    pub fn delete(&mut self, key: &str) -> bool {
        let hcode = str_hash(key.as_bytes());
        self.entries.pop(hcode, |(k, _)| k == key).is_some()
    }

    /// Get the entry at `key`, inserting a fresh `Entry::ZSet` if absent.
    /// Returns an error description if `key` holds a non-zset value.
    pub fn zset_mut(&mut self, key: &str) -> Result<&mut SortedSet, &'static str> {
        let hcode = str_hash(key.as_bytes());
        if self.entries.lookup(hcode, |(k, _)| k == key).is_none() {
            self.entries.insert(Box::new(HashNode::new(
                hcode,
                (key.to_string(), Entry::ZSet(SortedSet::new())),
            )));
        }
        match self.entries.lookup_mut(hcode, |(k, _)| k == key) {
            Some((_, Entry::ZSet(z))) => Ok(z),
            Some((_, Entry::Str(_))) => Err("WRONGTYPE value at key is not a zset"),
            None => unreachable!("just inserted"),
        }
    }

    pub fn zset(&mut self, key: &str) -> Option<&SortedSet> {
        match self.get(key) {
            Some(Entry::ZSet(z)) => Some(z),
            _ => None,
        }
    }

    /// All keys currently in the keyspace, in arbitrary (slot) order.
    pub fn keys(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.entries.len());
        self.entries.for_each(|(k, _)| out.push(k.clone()));
        out
    }
}

impl Default for Keyspace {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips() {
        let mut ks = Keyspace::new();
        assert!(ks.set("a", Entry::Str("1".into())).is_none());
        match ks.get("a") {
            Some(Entry::Str(s)) => assert_eq!(s, "1"),
            _ => panic!("expected string entry"),
        }
    }

    #[test]
    fn set_overwrites_and_returns_old_value() {
        let mut ks = Keyspace::new();
        ks.set("a", Entry::Str("1".into()));
        let old = ks.set("a", Entry::Str("2".into()));
        assert!(matches!(old, Some(Entry::Str(s)) if s == "1"));
        assert_eq!(ks.len(), 1);
    }

    #[test]
    fn delete_is_idempotent() {
        let mut ks = Keyspace::new();
        ks.set("a", Entry::Str("1".into()));
        assert!(ks.delete("a"));
        assert!(!ks.delete("a"));
    }

    #[test]
    fn zset_mut_lazily_creates_and_rejects_wrong_type() {
        let mut ks = Keyspace::new();
        ks.set("s", Entry::Str("x".into()));
        assert!(ks.zset_mut("s").is_err());
        assert!(ks.zset_mut("z").is_ok());
        assert!(ks.zset("z").is_some());
    }

    #[test]
    fn keys_lists_every_live_key() {
        let mut ks = Keyspace::new();
        ks.set("a", Entry::Str("1".into()));
        ks.set("b", Entry::Str("2".into()));
        let mut keys = ks.keys();
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }
}
