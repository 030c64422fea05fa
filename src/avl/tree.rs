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

//! The owned, recursive AVL tree itself: insert, delete, rotations and the
//! rank-based offset queries sorted sets need for range access.

use std::cmp::Ordering;

use super::node::{cnt, height, update, AvlNode};

pub struct AvlTree<T> {
    root: Option<Box<AvlNode<T>>>,
}

impl<T: Ord> AvlTree<T> {
    pub fn new() -> Self {
        AvlTree { root: None }
    }

    pub fn len(&self) -> usize {
        cnt(&self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn contains(&self, value: &T) -> bool {
        let mut cur = self.root.as_deref();
        while let Some(n) = cur {
            cur = match value.cmp(&n.value) {
                Ordering::Less => n.left.as_deref(),
                Ordering::Greater => n.right.as_deref(),
                Ordering::Equal => return true,
            };
        }
        false
    }

    pub fn insert(&mut self, value: T) {
        self.root = Some(insert_rec(self.root.take(), value));
    }

    /// Remove the node equal to `value`. Returns whether a node was removed.
    pub fn remove(&mut self, value: &T) -> bool {
        let (new_root, removed) = remove_rec(self.root.take(), value);
        self.root = new_root;
        removed
    }

    /// The 0-indexed in-order element, or `None` if `offset >= len()`.
    pub fn rank_at(&self, offset: usize) -> Option<&T> {
        rank_at_rec(self.root.as_deref(), offset)
    }

    /// Count of elements strictly less than `value` — the in-order position
    /// `value` would occupy (lower bound). Used by range queries that start
    /// "at or after" a given value.
    pub fn offset_of(&self, value: &T) -> usize {
        offset_of_rec(self.root.as_deref(), value)
    }

    /// Iterate values in ascending order starting at in-order offset `from`.
    pub fn iter_from(&self, from: usize) -> impl Iterator<Item = &T> {
        (from..self.len()).map(move |i| self.rank_at(i).expect("index within len()"))
    }
}

impl<T: Ord> Default for AvlTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn balance_factor<T>(n: &AvlNode<T>) -> i32 {
    height(&n.left) - height(&n.right)
}

fn rotate_left<T>(mut n: Box<AvlNode<T>>) -> Box<AvlNode<T>> {
    let mut r = n.right.take().expect("rotate_left requires a right child");
    n.right = r.left.take();
    update(&mut n);
    r.left = Some(n);
    update(&mut r);
    r
}

fn rotate_right<T>(mut n: Box<AvlNode<T>>) -> Box<AvlNode<T>> {
    let mut l = n.left.take().expect("rotate_right requires a left child");
    n.left = l.right.take();
    update(&mut n);
    l.right = Some(n);
    update(&mut l);
    l
}

fn rebalance<T>(mut n: Box<AvlNode<T>>) -> Box<AvlNode<T>> {
    let bf = balance_factor(&n);
    if bf > 1 {
        if balance_factor(n.left.as_ref().expect("bf>1 implies a left child")) < 0 {
            let l = n.left.take().unwrap();
            n.left = Some(rotate_left(l));
            update(&mut n);
        }
        rotate_right(n)
    } else if bf < -1 {
        if balance_factor(n.right.as_ref().expect("bf<-1 implies a right child")) > 0 {
            let r = n.right.take().unwrap();
            n.right = Some(rotate_right(r));
            update(&mut n);
        }
        rotate_left(n)
    } else {
        n
    }
}

fn insert_rec<T: Ord>(node: Option<Box<AvlNode<T>>>, value: T) -> Box<AvlNode<T>> {
    let mut n = match node {
        None => return Box::new(AvlNode::new(value)),
        Some(n) => n,
    };
    match value.cmp(&n.value) {
        Ordering::Less => n.left = Some(insert_rec(n.left.take(), value)),
        Ordering::Greater | Ordering::Equal => n.right = Some(insert_rec(n.right.take(), value)),
    }
    update(&mut n);
    rebalance(n)
}

fn remove_rec<T: Ord>(
    node: Option<Box<AvlNode<T>>>,
    target: &T,
) -> (Option<Box<AvlNode<T>>>, bool) {
    let mut n = match node {
        None => return (None, false),
        Some(n) => n,
    };
    match target.cmp(&n.value) {
        Ordering::Less => {
            let (new_left, removed) = remove_rec(n.left.take(), target);
            n.left = new_left;
            if !removed {
                return (Some(n), false);
            }
            update(&mut n);
            (Some(rebalance(n)), true)
        }
        Ordering::Greater => {
            let (new_right, removed) = remove_rec(n.right.take(), target);
            n.right = new_right;
            if !removed {
                return (Some(n), false);
            }
            update(&mut n);
            (Some(rebalance(n)), true)
        }
        Ordering::Equal => match (n.left.take(), n.right.take()) {
            (None, None) => (None, true),
            (Some(l), None) => (Some(l), true),
            (None, Some(r)) => (Some(r), true),
            (Some(l), Some(r)) => {
                let (new_right, succ_value) = remove_min(r);
                n.value = succ_value;
                n.left = Some(l);
                n.right = new_right;
                update(&mut n);
                (Some(rebalance(n)), true)
            }
        },
    }
}

/// Remove and return the left-most (minimum) value of `node`'s subtree,
/// along with the rebalanced remainder. Used to find the in-order successor
/// when deleting a node with two children (see `DESIGN.md` Open Question 2).
fn remove_min<T>(node: Box<AvlNode<T>>) -> (Option<Box<AvlNode<T>>>, T) {
    let AvlNode {
        value, left, right, ..
    } = *node;
    match left {
        None => (right, value),
        Some(l) => {
            let (new_left, min_value) = remove_min(l);
            let mut replacement = Box::new(AvlNode {
                value,
                left: new_left,
                right,
                height: 0,
                cnt: 0,
            });
            update(&mut replacement);
            (Some(rebalance(replacement)), min_value)
        }
    }
}

fn rank_at_rec<T>(node: Option<&AvlNode<T>>, offset: usize) -> Option<&T> {
    let n = node?;
    let left_cnt = cnt(&n.left);
    match offset.cmp(&left_cnt) {
        Ordering::Less => rank_at_rec(n.left.as_deref(), offset),
        Ordering::Equal => Some(&n.value),
        Ordering::Greater => rank_at_rec(n.right.as_deref(), offset - left_cnt - 1),
    }
}

fn offset_of_rec<T: Ord>(node: Option<&AvlNode<T>>, target: &T) -> usize {
    match node {
        None => 0,
        Some(n) => {
            if *target <= n.value {
                offset_of_rec(n.left.as_deref(), target)
            } else {
                cnt(&n.left) + 1 + offset_of_rec(n.right.as_deref(), target)
            }
        }
    }
}
