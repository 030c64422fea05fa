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

//! A single-process, in-memory key-value server: a non-blocking
//! single-threaded reactor over a length-prefixed binary protocol, backed by
//! a progressively-rehashed hash table and an AVL-indexed sorted set.

pub mod avl;
pub mod conn;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod hash;
pub mod keyspace;
pub mod reactor;
pub mod wire;
pub mod zset;

pub use config::Args;
pub use error::ServerError;
pub use reactor::Reactor;
