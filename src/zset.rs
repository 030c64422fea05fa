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

//! Sorted sets: a name-keyed hash index layered with a `(score, name)`
//! ordered AVL index over the same members.

use std::cmp::Ordering;

use crate::avl::AvlTree;
use crate::hash::{str_hash, HashMap2, HashNode};

/// A single sorted-set member. Ordering is `(score, name)`, with a
/// lexicographic byte-wise tie-break on `name` — matching the original's
/// `zless` comparator, never treating same-score members as equal.
#[derive(Clone, Debug)]
pub struct ZMember {
    pub score: f64,
    pub name: String,
}

impl PartialEq for ZMember {
    fn eq(&self, other: &Self) -> bool {
        self.score.to_bits() == other.score.to_bits() && self.name == other.name
    }
}
impl Eq for ZMember {}

impl PartialOrd for ZMember {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ZMember {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .partial_cmp(&other.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.name.cmp(&other.name))
    }
}

/// A sorted set: every member is simultaneously reachable by name (O(1), via
/// `by_name`, whose entries are `(name, score)` pairs) and in `(score, name)`
/// order (O(log n), via `ordered`).
pub struct SortedSet {
    by_name: HashMap2<(String, f64)>,
    ordered: AvlTree<ZMember>,
}

impl SortedSet {
    pub fn new() -> Self {
        SortedSet {
            by_name: HashMap2::new(),
            ordered: AvlTree::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn score(&mut self, name: &str) -> Option<f64> {
        let hcode = str_hash(name.as_bytes());
        self.by_name
            .lookup(hcode, |(n, _)| n == name)
            .map(|(_, score)| *score)
    }

    /// Insert `name` with `score`, or update its score if already present.
    /// Returns `true` if this created a new member.
    pub fn add(&mut self, name: &str, score: f64) -> bool {
        let hcode = str_hash(name.as_bytes());
        if let Some((_, old_score)) = self.by_name.lookup(hcode, |(n, _)| n == name) {
            let old_score = *old_score;
            if old_score.to_bits() != score.to_bits() {
                self.ordered.remove(&ZMember {
                    score: old_score,
                    name: name.to_string(),
                });
                self.ordered.insert(ZMember {
                    score,
                    name: name.to_string(),
                });
                if let Some(slot) = self.by_name.lookup_mut(hcode, |(n, _)| n == name) {
                    slot.1 = score;
                }
            }
            false
        } else {
            self.by_name
                .insert(Box::new(HashNode::new(hcode, (name.to_string(), score))));
            self.ordered.insert(ZMember {
                score,
                name: name.to_string(),
            });
            true
        }
    }

    /// Remove `name`. Returns `true` if it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        let hcode = str_hash(name.as_bytes());
        match self.by_name.pop(hcode, |(n, _)| n == name) {
            None => false,
            Some(node) => {
                let (_, score) = node.value;
                self.ordered.remove(&ZMember {
                    score,
                    name: name.to_string(),
                });
                true
            }
        }
    }

    /// Up to `limit` members at or after `(score, name)` plus `offset`
    /// positions, in ascending `(score, name)` order.
    pub fn query(&self, score: f64, name: &str, offset: usize, limit: usize) -> Vec<ZMember> {
        let probe = ZMember {
            score,
            name: name.to_string(),
        };
        let start = self.ordered.offset_of(&probe) + offset;
        self.ordered.iter_from(start).take(limit).cloned().collect()
    }
}

impl Default for SortedSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_reports_new_vs_update() {
        let mut z = SortedSet::new();
        assert!(z.add("alice", 1.0));
        assert!(!z.add("alice", 2.0));
        assert_eq!(z.len(), 1);
        assert_eq!(z.score("alice"), Some(2.0));
    }

    #[test]
    fn remove_drops_from_both_indexes() {
        let mut z = SortedSet::new();
        z.add("alice", 1.0);
        assert!(z.remove("alice"));
        assert!(!z.remove("alice"));
        assert_eq!(z.len(), 0);
        assert!(z.query(f64::MIN, "", 0, 10).is_empty());
    }

    #[test]
    fn query_returns_ascending_score_then_name_order() {
        let mut z = SortedSet::new();
        z.add("carol", 3.0);
        z.add("alice", 1.0);
        z.add("bob", 2.0);
        z.add("dave", 2.0);
        let all = z.query(f64::MIN, "", 0, 100);
        let names: Vec<&str> = all.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob", "dave", "carol"]);
    }

    #[test]
    fn query_respects_offset_and_limit() {
        let mut z = SortedSet::new();
        for i in 0..10 {
            z.add(&format!("m{i}"), i as f64);
        }
        let page = z.query(0.0, "", 3, 2);
        let names: Vec<&str> = page.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["m3", "m4"]);
    }

    #[test]
    fn update_then_query_reflects_new_score_position() {
        let mut z = SortedSet::new();
        z.add("alice", 1.0);
        z.add("bob", 5.0);
        z.add("alice", 9.0);
        let all = z.query(f64::MIN, "", 0, 100);
        let names: Vec<&str> = all.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["bob", "alice"]);
    }
}
