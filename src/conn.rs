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

//! Per-connection state machine: buffered, non-blocking read/write driven by
//! reactor readiness notifications.

use std::io::{self, Read, Write};

use mio::net::TcpStream;
use mio::Token;

use crate::dispatch::dispatch;
use crate::keyspace::Keyspace;
use crate::wire::frame;

/// Where a connection sits in its request/response cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    /// Waiting for (and decoding) request frames.
    Req,
    /// Flushing queued replies.
    Res,
    /// Terminal: the connection should be deregistered and dropped.
    End,
}

/// A single client connection: its socket plus read/write buffering.
///
/// Buffer sizing matches the wire protocol's own limit: a read buffer never
/// needs to hold more than one frame's worth of unconsumed bytes plus the
/// next frame's length prefix.
pub struct Connection {
    pub stream: TcpStream,
    pub token: Token,
    state: ConnState,
    rbuf: Vec<u8>,
    wbuf: Vec<u8>,
    wbuf_sent: usize,
}

impl Connection {
    pub fn new(stream: TcpStream, token: Token) -> Self {
        Connection {
            stream,
            token,
            state: ConnState::Req,
            rbuf: Vec::with_capacity(4 + frame::MAX_MSG),
            wbuf: Vec::new(),
            wbuf_sent: 0,
        }
    }

    pub fn state(&self) -> ConnState {
        self.state
    }

    pub fn wants_read(&self) -> bool {
        matches!(self.state, ConnState::Req)
    }

    pub fn wants_write(&self) -> bool {
        matches!(self.state, ConnState::Res)
    }

    /// Force this connection into its terminal state, e.g. after a reactor
    /// bookkeeping error (failed reregister) unrelated to the socket's own
    /// readiness.
    pub fn close(&mut self) {
        self.state = ConnState::End;
    }

    /// Fill `rbuf` from the socket, decode and dispatch every complete frame
    /// it now holds, and queue the replies. Ends the connection on EOF, a
    /// hard I/O error, or a malformed frame.
    pub fn on_readable(&mut self, keyspace: &mut Keyspace) {
        loop {
            let mut tmp = [0u8; 4096];
            match self.stream.read(&mut tmp) {
                Ok(0) => {
                    self.state = ConnState::End;
                    return;
                }
                Ok(n) => {
                    self.rbuf.extend_from_slice(&tmp[..n]);
                    if !self.drain_requests(keyspace) {
                        return; // malformed frame; state already End
                    }
                    if !self.wbuf.is_empty() {
                        self.state = ConnState::Res;
                        self.try_flush();
                        return;
                    }
                    if n < tmp.len() {
                        return; // socket drained for now
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::debug!(error = %e, "read error, closing connection");
                    self.state = ConnState::End;
                    return;
                }
            }
        }
    }

    /// Decode and dispatch every complete frame currently buffered.
    /// Returns `false` if a malformed frame ended the connection.
    fn drain_requests(&mut self, keyspace: &mut Keyspace) -> bool {
        loop {
            match frame::try_decode(&self.rbuf) {
                Ok(None) => return true,
                Ok(Some((args, consumed))) => {
                    let reply = dispatch(keyspace, &args);
                    self.wbuf.extend_from_slice(&reply.into_frame());
                    self.rbuf.drain(0..consumed);
                }
                Err(e) => {
                    tracing::debug!(error = %e, "malformed frame, closing connection");
                    self.state = ConnState::End;
                    return false;
                }
            }
        }
    }

    /// Flush as much of `wbuf` as the socket accepts right now.
    pub fn on_writable(&mut self) {
        self.try_flush();
    }

    fn try_flush(&mut self) {
        loop {
            match self.stream.write(&self.wbuf[self.wbuf_sent..]) {
                Ok(0) => {
                    self.state = ConnState::End;
                    return;
                }
                Ok(n) => {
                    self.wbuf_sent += n;
                    if self.wbuf_sent == self.wbuf.len() {
                        self.wbuf.clear();
                        self.wbuf_sent = 0;
                        self.state = ConnState::Req;
                        return;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::debug!(error = %e, "write error, closing connection");
                    self.state = ConnState::End;
                    return;
                }
            }
        }
    }
}
