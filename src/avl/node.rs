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

/// A node in an [`super::tree::AvlTree`].
///
/// `height` and `cnt` are maintained by every mutating operation; a leaf has
/// `height == 1` and `cnt == 1`.
pub struct AvlNode<T> {
    pub value: T,
    pub(super) left: Option<Box<AvlNode<T>>>,
    pub(super) right: Option<Box<AvlNode<T>>>,
    pub(super) height: i32,
    pub(super) cnt: usize,
}

impl<T> AvlNode<T> {
    pub fn new(value: T) -> Self {
        AvlNode {
            value,
            left: None,
            right: None,
            height: 1,
            cnt: 1,
        }
    }
}

/// Height of a subtree; an absent subtree has height 0 (see `DESIGN.md`
/// Open Question 1).
pub(super) fn height<T>(n: &Option<Box<AvlNode<T>>>) -> i32 {
    n.as_ref().map_or(0, |n| n.height)
}

/// Node count of a subtree; an absent subtree has count 0.
pub(super) fn cnt<T>(n: &Option<Box<AvlNode<T>>>) -> usize {
    n.as_ref().map_or(0, |n| n.cnt)
}

pub(super) fn update<T>(node: &mut AvlNode<T>) {
    node.height = 1 + height(&node.left).max(height(&node.right));
    node.cnt = 1 + cnt(&node.left) + cnt(&node.right);
}
