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

//! Tagged reply encoding.

use super::frame::MAX_MSG;

pub const SER_NIL: u8 = 0;
pub const SER_ERR: u8 = 1;
pub const SER_STR: u8 = 2;
pub const SER_INT: u8 = 3;
pub const SER_ARR: u8 = 4;

pub const ERR_2BIG: i32 = 0;
pub const ERR_UNKNOWN: i32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Nil,
    Err(i32, String),
    Str(Vec<u8>),
    Int(i64),
    Arr(Vec<Reply>),
}

impl Reply {
    pub fn str(s: impl Into<Vec<u8>>) -> Self {
        Reply::Str(s.into())
    }

    pub fn err(code: i32, msg: impl Into<String>) -> Self {
        Reply::Err(code, msg.into())
    }

    fn encode_into(&self, buf: &mut Vec<u8>) {
        match self {
            Reply::Nil => buf.push(SER_NIL),
            Reply::Err(code, msg) => {
                buf.push(SER_ERR);
                buf.extend_from_slice(&code.to_le_bytes());
                buf.extend_from_slice(&(msg.len() as u32).to_le_bytes());
                buf.extend_from_slice(msg.as_bytes());
            }
            Reply::Str(s) => {
                buf.push(SER_STR);
                buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
                buf.extend_from_slice(s);
            }
            Reply::Int(v) => {
                buf.push(SER_INT);
                buf.extend_from_slice(&v.to_le_bytes());
            }
            Reply::Arr(items) => {
                buf.push(SER_ARR);
                buf.extend_from_slice(&(items.len() as u32).to_le_bytes());
                for item in items {
                    item.encode_into(buf);
                }
            }
        }
    }

    /// Encode as a complete response frame (`u32 LE body_len || body`). If
    /// the encoded body would exceed [`MAX_MSG`], it's replaced wholesale by
    /// a `SER_ERR(ERR_2BIG)` reply, matching the original's "too big"
    /// fallback.
    pub fn into_frame(&self) -> Vec<u8> {
        let mut body = Vec::new();
        self.encode_into(&mut body);
        if body.len() > MAX_MSG {
            body.clear();
            Reply::err(ERR_2BIG, "response exceeds the message size limit").encode_into(&mut body);
        }
        let mut out = Vec::with_capacity(4 + body.len());
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(&body);
        out
    }
}
