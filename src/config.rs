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

//! Command-line / environment configuration.

use std::net::IpAddr;
use std::time::Duration;

use clap::Parser;

/// A single-process, in-memory key-value server.
#[derive(Debug, Parser)]
#[command(name = "kvreactor", version, about)]
pub struct Args {
    /// Address to bind the listening socket to.
    #[arg(long, env = "KVREACTOR_BIND", default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// Port to listen on.
    #[arg(long, env = "KVREACTOR_PORT", default_value_t = 1234)]
    pub port: u16,

    /// How long a single poll wait may block with no readiness events.
    #[arg(long, env = "KVREACTOR_POLL_TIMEOUT_MS", default_value_t = 30_000)]
    pub poll_timeout_ms: u64,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::new(self.bind, self.port)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    /// Default `tracing` filter directive for this verbosity level, used
    /// when `RUST_LOG` isn't set.
    pub fn default_log_directive(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
