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

//! Height-balanced binary search tree with subtree-size bookkeeping.
//!
//! Unlike the parent-pointer design this is ported from, nodes here are
//! owned recursively (`Option<Box<AvlNode<T>>>`) with no back-pointer;
//! rotations and rebalancing return the (possibly new) subtree root up the
//! call stack instead of rewriting a parent link. See `DESIGN.md`.

pub mod node;
pub mod tree;

pub use node::AvlNode;
pub use tree::AvlTree;
