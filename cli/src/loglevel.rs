// Command-line tool for asset smart contracts orchestration
//
// SPDX-License-Identifier: Apache-2.0
//
// Copyright (C) 2025 ASC runtime contributors.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use this file except
// in compliance with the License. You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software distributed under the License
// is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express
// or implied. See the License for the specific language governing permissions and limitations under
// the License.

use env_logger::Env;
use log::LevelFilter;

/// Verbosity of the log output selected with repeated `-v` flags.
///
/// An explicit `RUST_LOG` environment variable takes precedence.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Display, Default)]
#[repr(u8)]
pub enum LogLevel {
    /// Only failures of the executed workflow. Used when no `-v` flag is given.
    #[default]
    #[display("error")]
    Error = 0,

    /// Skipped deployment stages and other recoverable conditions (`-v`).
    #[display("warn")]
    Warn,

    /// Progress of the workflows: created applications, transfers, purchases (`-vv`).
    #[display("info")]
    Info,

    /// Submitted groups and confirmations (`-vvv`).
    #[display("debug")]
    Debug,

    /// Everything, including signing and ledger internals (`-vvvv`).
    #[display("trace")]
    Trace,
}

impl From<u8> for LogLevel {
    fn from(count: u8) -> Self { Self::from_verbosity_flag_count(count) }
}

impl From<LogLevel> for u8 {
    fn from(level: LogLevel) -> Self { level as u8 }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

impl LogLevel {
    pub fn from_verbosity_flag_count(count: u8) -> Self {
        match count {
            0 => LogLevel::Error,
            1 => LogLevel::Warn,
            2 => LogLevel::Info,
            3 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    /// Installs the global logger writing to stderr.
    pub fn apply(self) {
        log::set_max_level(self.into());
        env_logger::Builder::from_env(Env::default().default_filter_or(self.to_string()))
            .format_timestamp(None)
            .init();
    }
}
