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

//! Error types for the two places this server can fail: at startup, fatally,
//! and per request, recoverably.

use thiserror::Error;

/// A startup-time failure. `main` turns one of these into a nonzero exit
/// code; nothing past `main` ever has to handle one.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to create the readiness poller: {0}")]
    PollCreate(#[source] std::io::Error),
    #[error("failed to register the listening socket: {0}")]
    Register(#[source] std::io::Error),
}

/// A command-level failure. Carries the numeric error code the wire
/// protocol expects in a `SER_ERR` reply; never closes the connection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command")]
    UnknownCommand,
    #[error("wrong number of arguments")]
    WrongArity,
    #[error("{0}")]
    WrongType(String),
}

impl CommandError {
    pub fn code(&self) -> i32 {
        match self {
            CommandError::UnknownCommand | CommandError::WrongArity => {
                crate::wire::reply::ERR_UNKNOWN
            }
            CommandError::WrongType(_) => crate::wire::reply::ERR_UNKNOWN,
        }
    }
}

impl From<CommandError> for crate::wire::reply::Reply {
    fn from(err: CommandError) -> Self {
        crate::wire::reply::Reply::err(err.code(), err.to_string())
    }
}
