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

use asctx::{Address, AssetId, AssetParams, Intent};
use serde::{Deserialize, Serialize};

use super::Runtime;
use crate::checkpoint::{CheckpointStore, CheckpointValue};
use crate::ledger::Ledger;
use crate::signer::Signer;
use crate::submit::Confirmation;
use crate::WorkflowError;

pub const DEFAULT_TOKEN: &str = "acsCoinASA";
pub const DEFAULT_DISTRIBUTION: u64 = 100;
/// Units of the fungible token paid for a single NFT.
pub const NFT_COST: u64 = 5;

/// Named standalone asset definition.
#[derive(Clone, Eq, PartialEq, Debug)]
#[derive(Serialize, Deserialize)]
#[serde(crate = "serde_crate", rename_all = "camelCase")]
pub struct TokenSpec {
    pub name: String,
    pub params: AssetParams,
}

impl Default for TokenSpec {
    fn default() -> Self {
        TokenSpec {
            name: DEFAULT_TOKEN.to_owned(),
            params: AssetParams {
                total: 10_000,
                decimals: 0,
                unit_name: s!("ACS"),
                asset_name: s!("acsCoin"),
                url: None,
                metadata_hash: None,
                default_frozen: false,
            },
        }
    }
}

#[derive(Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum TokenListError {
    /// unable to read token list: {0}
    #[from]
    Io(std::io::Error),

    /// invalid token list: {0}
    #[from]
    Yaml(serde_yaml::Error),
}

impl TokenSpec {
    /// Reads a list of token definitions from a YAML file.
    pub fn load_all(path: impl AsRef<Path>) -> Result<Vec<TokenSpec>, TokenListError> {
        let file = fs::File::open(path)?;
        Ok(serde_yaml::from_reader(file)?)
    }
}

impl<L: Ledger, S: Signer, C: CheckpointStore> Runtime<L, S, C> {
    /// Creates a standalone asset and records its id under the token name.
    pub fn deploy_token(&mut self, creator: Address, spec: &TokenSpec) -> Result<AssetId, WorkflowError> {
        if let Some(CheckpointValue::Asset(asset)) = self.checkpoints.value(&spec.name) {
            warn!("Token {} is already deployed as asset {asset}, skipping", spec.name);
            return Ok(*asset);
        }
        let intent = Intent::AssetCreate {
            creator,
            params: spec.params.clone(),
        };
        let confirmation = self.send(vec![intent], &format!("deploy token {}", spec.name))?;
        let asset = confirmation
            .created_asset
            .ok_or(WorkflowError::NotCreated("asset"))?;
        self.record(&spec.name, CheckpointValue::Asset(asset), confirmation.round)?;
        Ok(asset)
    }

    /// Opts the receiver in to a deployed token (when needed) and sends units to it.
    pub fn distribute_token(
        &mut self,
        creator: Address,
        receiver: Address,
        token: &str,
        amount: u64,
    ) -> Result<Confirmation, WorkflowError> {
        let asset = self.checkpoints.asset_id(token)?;
        if self.verifier().holding(receiver, asset)?.is_none() {
            self.send(vec![Intent::opt_in(receiver, asset)], &format!("opt in to {token}"))?;
        }
        let transfer = Intent::asset_transfer(creator, receiver, asset, amount);
        let confirmation = self.send(vec![transfer], &format!("distribute {amount} {token}"))?;
        info!("Distributed {amount} units of {token} to {receiver}");
        Ok(confirmation)
    }

    /// Swaps a single NFT for `cost` units of a fungible token in one atomic group.
    pub fn purchase_nft(
        &mut self,
        creator: Address,
        receiver: Address,
        nft: AssetId,
        fungible: AssetId,
        cost: u64,
    ) -> Result<Confirmation, WorkflowError> {
        let intents = vec![
            Intent::opt_in(receiver, nft),
            Intent::asset_transfer(creator, receiver, nft, 1),
            Intent::asset_transfer(receiver, creator, fungible, cost),
        ];
        let confirmation = self.send(intents, &format!("purchase NFT {nft} for {cost} units"))?;
        info!("NFT {nft} is transferred to {receiver}");
        Ok(confirmation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_list() {
        let dir = std::env::temp_dir().join(format!("asc-tokens-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let path = dir.join("tokens.yaml");
        let specs = vec![TokenSpec::default()];
        fs::write(&path, serde_yaml::to_string(&specs).unwrap()).unwrap();
        assert_eq!(TokenSpec::load_all(&path).unwrap(), specs);

        let broken = dir.join("broken.yaml");
        fs::write(&broken, "- name: [").unwrap();
        let err = TokenSpec::load_all(&broken).unwrap_err();
        assert!(matches!(err, TokenListError::Yaml(_)));
        assert!(err.to_string().starts_with("invalid token list"));

        let err = TokenSpec::load_all(dir.join("absent.yaml")).unwrap_err();
        assert!(matches!(err, TokenListError::Io(_)));

        fs::remove_dir_all(dir).unwrap();
    }
}
