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

//! The single-threaded, readiness-driven event loop.
//!
//! One [`mio::Poll`] instance multiplexes the listening socket and every
//! client connection on this thread. Nothing here ever blocks except the
//! poll wait itself, which is bounded by the configured poll timeout (see
//! [`Reactor::bind_with_timeout`]) so periodic bookkeeping still runs even
//! with no traffic.

use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use mio::net::TcpListener;
use mio::{Events, Interest, Poll, Token};

use crate::conn::{ConnState, Connection};
use crate::error::ServerError;
use crate::keyspace::Keyspace;

const LISTENER: Token = Token(0);

/// Default poll wait bound when a caller does not pick one explicitly (used
/// by tests); production code goes through `Args::poll_timeout`.
const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(30);

pub struct Reactor {
    poll: Poll,
    listener: TcpListener,
    connections: HashMap<Token, Connection>,
    next_token: usize,
    keyspace: Keyspace,
    poll_timeout: Duration,
}

impl Reactor {
    /// Bind the listening socket and create the poller, using
    /// [`DEFAULT_POLL_TIMEOUT`] as the poll wait bound. Any failure here is
    /// fatal to the process (see `DESIGN.md` / `SPEC_FULL.md` section 7).
    pub fn bind(addr: SocketAddr) -> Result<Self, ServerError> {
        Self::bind_with_timeout(addr, DEFAULT_POLL_TIMEOUT)
    }

    /// Like [`Reactor::bind`], but with an explicit poll wait bound (wired up
    /// to `--poll-timeout-ms` by `main`).
    pub fn bind_with_timeout(addr: SocketAddr, poll_timeout: Duration) -> Result<Self, ServerError> {
        let mut listener =
            TcpListener::bind(addr).map_err(|source| ServerError::Bind { addr, source })?;
        let poll = Poll::new().map_err(ServerError::PollCreate)?;
        poll.registry()
            .register(&mut listener, LISTENER, Interest::READABLE)
            .map_err(ServerError::Register)?;
        tracing::info!(%addr, "listening");
        Ok(Reactor {
            poll,
            listener,
            connections: HashMap::new(),
            next_token: 1,
            keyspace: Keyspace::new(),
            poll_timeout,
        })
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Run the loop, calling `should_continue` once per wake-up so tests and
    /// graceful-shutdown hooks can stop it; production code passes `|| true`.
    pub fn run(&mut self, mut should_continue: impl FnMut() -> bool) -> io::Result<()> {
        let mut events = Events::with_capacity(1024);
        while should_continue() {
            match self.poll.poll(&mut events, Some(self.poll_timeout)) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
            for event in events.iter() {
                if event.token() == LISTENER {
                    self.accept_all();
                    continue;
                }
                self.service(event.token(), event.is_readable(), event.is_writable());
            }
            self.reap_closed();
        }
        Ok(())
    }

    fn accept_all(&mut self) {
        loop {
            match self.listener.accept() {
                Ok((mut stream, peer)) => {
                    let token = Token(self.next_token);
                    self.next_token += 1;
                    if let Err(e) = self.poll.registry().register(
                        &mut stream,
                        token,
                        Interest::READABLE,
                    ) {
                        tracing::warn!(error = %e, %peer, "failed to register accepted connection");
                        continue;
                    }
                    tracing::info!(%peer, "accepted connection");
                    self.connections
                        .insert(token, Connection::new(stream, token));
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::warn!(error = %e, "accept failed");
                    break;
                }
            }
        }
    }

    fn service(&mut self, token: Token, readable: bool, writable: bool) {
        let Some(conn) = self.connections.get_mut(&token) else {
            return;
        };
        let before = conn.state();
        if readable && before == ConnState::Req {
            conn.on_readable(&mut self.keyspace);
        }
        if writable && conn.state() == ConnState::Res {
            conn.on_writable();
        }
        self.rearm(token);
    }

    /// Re-register a connection's interest set after its state may have
    /// changed (REQ -> RES arms writable, RES -> REQ re-arms readable).
    fn rearm(&mut self, token: Token) {
        let Some(conn) = self.connections.get_mut(&token) else {
            return;
        };
        let interest = match conn.state() {
            ConnState::Req => Some(Interest::READABLE),
            ConnState::Res => Some(Interest::WRITABLE),
            ConnState::End => None,
        };
        if let Some(interest) = interest {
            if let Err(e) = self
                .poll
                .registry()
                .reregister(&mut conn.stream, token, interest)
            {
                tracing::debug!(error = %e, ?token, "reregister failed, closing connection");
                conn.close();
            }
        }
    }

    fn reap_closed(&mut self) {
        let closed: Vec<Token> = self
            .connections
            .iter()
            .filter(|(_, c)| c.state() == ConnState::End)
            .map(|(t, _)| *t)
            .collect();
        for token in closed {
            if let Some(mut conn) = self.connections.remove(&token) {
                let _ = self.poll.registry().deregister(&mut conn.stream);
                tracing::info!(?token, "connection closed");
            }
        }
    }
}
