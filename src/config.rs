// Orchestration runtime for asset smart contracts
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

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub const DEFAULT_GENESIS_ID: &str = "sandbox-v1";

/// Tunable parameters of the workflows.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[derive(Serialize, Deserialize)]
#[serde(crate = "serde_crate", rename_all = "camelCase", default)]
pub struct Config {
    /// Fee paid by each transaction, in micro-units.
    pub fee: u64,
    /// Amount paid to every freshly deployed application account.
    pub app_funding: u64,
    /// Number of rounds to wait for a submitted group to be confirmed.
    pub confirm_rounds: u64,
    /// Length of the validity window of constructed transactions.
    pub validity_rounds: u64,
    /// Purchases must be strictly below this quantity.
    pub purchase_cap: u64,
    pub genesis_id: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            fee: 1000,
            app_funding: 1_000_000,
            confirm_rounds: 10,
            validity_rounds: 1000,
            purchase_cap: 1000,
            genesis_id: DEFAULT_GENESIS_ID.to_owned(),
        }
    }
}

impl Config {
    /// Loads configuration from a YAML file, falling back to defaults when the file is absent.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No configuration file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let file = fs::File::open(path)?;
        Ok(serde_yaml::from_reader(file)?)
    }
}

#[derive(Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum ConfigError {
    /// unable to read configuration file: {0}
    #[from]
    Io(std::io::Error),

    /// invalid configuration: {0}
    #[from]
    Yaml(serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.fee, 1000);
        assert_eq!(config.app_funding, 1_000_000);
        assert_eq!(config.purchase_cap, 1000);
    }

    #[test]
    fn partial_yaml() {
        let config: Config = serde_yaml::from_str("fee: 2000\nconfirmRounds: 3\n").unwrap();
        assert_eq!(config.fee, 2000);
        assert_eq!(config.confirm_rounds, 3);
        assert_eq!(config.app_funding, 1_000_000);
        assert_eq!(config.genesis_id, DEFAULT_GENESIS_ID);
    }
}
