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

//! In-process ledger executing transactions and the asset contracts natively.
//!
//! The sandbox mirrors the behaviour of a development network: named genesis accounts with keys
//! held by the node, rounds advancing with each committed group, minimal fee and minimal balance
//! rules, and all-or-nothing execution of atomic groups.

mod exec;
mod programs;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use asctx::{
    Address, AppId, AssetId, AssetParams, Group, SignedTx, SigningKey, StateSchema, Txid,
    TxParams, MIN_FEE,
};
use serde::{Deserialize, Serialize};

use crate::ledger::{
    AccountInfo, AppInfo, AssetHolding, AssetInfo, KeyValueStore, Ledger, LedgerError, Rejection,
    SubmissionError, TxStatus,
};
use crate::signer::Keyring;

pub const MIN_BALANCE: u64 = 100_000;
pub const ASSET_SLOT_BALANCE: u64 = 100_000;
pub const VALIDITY_ROUNDS: u64 = 1000;

#[derive(Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum SandboxError {
    /// unable to access sandbox state file: {0}
    #[from]
    Io(std::io::Error),

    /// sandbox state file is corrupted: {0}
    #[from]
    Yaml(serde_yaml::Error),
}

#[derive(Clone, Eq, PartialEq, Debug, Default)]
#[derive(Serialize, Deserialize)]
#[serde(crate = "serde_crate", rename_all = "camelCase")]
pub struct AccountState {
    pub amount: u64,
    pub assets: BTreeMap<AssetId, u64>,
    pub local: BTreeMap<AppId, KeyValueStore>,
}

impl AccountState {
    pub fn min_balance(&self) -> u64 { MIN_BALANCE + ASSET_SLOT_BALANCE * self.assets.len() as u64 }
}

#[derive(Clone, Eq, PartialEq, Debug)]
#[derive(Serialize, Deserialize)]
#[serde(crate = "serde_crate", rename_all = "camelCase")]
pub struct AppState {
    pub creator: Address,
    pub program: String,
    pub schema: StateSchema,
    pub global: KeyValueStore,
}

#[derive(Clone, Eq, PartialEq, Debug)]
#[derive(Serialize, Deserialize)]
#[serde(crate = "serde_crate", rename_all = "camelCase")]
pub struct AssetState {
    pub creator: Address,
    pub params: AssetParams,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
#[derive(Serialize, Deserialize)]
#[serde(crate = "serde_crate", rename_all = "camelCase")]
pub struct TxRecord {
    pub round: u64,
    pub created_app: Option<AppId>,
    pub created_asset: Option<AssetId>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
#[derive(Serialize, Deserialize)]
#[serde(crate = "serde_crate", rename_all = "camelCase")]
pub struct Sandbox {
    genesis_id: String,
    round: u64,
    next_index: u64,
    keys: BTreeMap<String, SigningKey>,
    accounts: BTreeMap<Address, AccountState>,
    apps: BTreeMap<AppId, AppState>,
    assets: BTreeMap<AssetId, AssetState>,
    confirmed: BTreeMap<Txid, TxRecord>,
}

impl Sandbox {
    pub fn new(genesis_id: impl ToString) -> Self {
        Sandbox {
            genesis_id: genesis_id.to_string(),
            round: 0,
            next_index: 1,
            keys: none!(),
            accounts: none!(),
            apps: none!(),
            assets: none!(),
            confirmed: none!(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SandboxError> {
        let file = fs::File::open(path)?;
        Ok(serde_yaml::from_reader(file)?)
    }

    pub fn store(&self, path: impl AsRef<Path>) -> Result<(), SandboxError> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let staging = path.with_extension("yaml.tmp");
        let file = fs::File::create(&staging)?;
        serde_yaml::to_writer(&file, self)?;
        file.sync_all()?;
        fs::rename(staging, path)?;
        Ok(())
    }

    pub fn genesis_id(&self) -> &str { &self.genesis_id }

    pub fn round(&self) -> u64 { self.round }

    /// Creates (or tops up) a named genesis account whose key is held by the sandbox.
    pub fn fund_account(&mut self, name: &str, amount: u64) -> Address {
        let key = self
            .keys
            .entry(name.to_owned())
            .or_insert_with(|| SigningKey::from_seed(&format!("{}/{name}", self.genesis_id)));
        let address = key.address();
        self.accounts.entry(address).or_default().amount += amount;
        debug!("Dispensed {amount} to genesis account {name} ({address})");
        address
    }

    pub fn named_address(&self, name: &str) -> Option<Address> {
        self.keys.get(name).map(SigningKey::address)
    }

    pub fn account_names(&self) -> impl Iterator<Item = (&str, Address)> + '_ {
        self.keys
            .iter()
            .map(|(name, key)| (name.as_str(), key.address()))
    }

    /// Signer holding the keys of all genesis accounts.
    pub fn keyring(&self) -> Keyring { Keyring::with(self.keys.values().cloned()) }

    fn key_for(&self, address: Address) -> Option<&SigningKey> {
        self.keys.values().find(|key| key.address() == address)
    }

    fn next_index(&mut self) -> u64 {
        let index = self.next_index;
        self.next_index += 1;
        index
    }
}

impl Ledger for Sandbox {
    fn suggested_params(&self) -> Result<TxParams, LedgerError> {
        Ok(TxParams {
            fee: MIN_FEE,
            min_fee: MIN_FEE,
            first_valid: self.round + 1,
            last_valid: self.round + VALIDITY_ROUNDS,
            genesis_id: self.genesis_id.clone(),
        })
    }

    fn last_round(&self) -> Result<u64, LedgerError> { Ok(self.round) }

    fn wait_for_round(&mut self, round: u64) -> Result<u64, LedgerError> {
        if round > self.round {
            trace!("Advancing sandbox round {} -> {round}", self.round);
            self.round = round;
        }
        Ok(self.round)
    }

    fn account_info(&self, address: Address) -> Result<AccountInfo, LedgerError> {
        let state = self.accounts.get(&address).cloned().unwrap_or_default();
        Ok(AccountInfo {
            address,
            amount: state.amount,
            min_balance: state.min_balance(),
            assets: state
                .assets
                .iter()
                .map(|(asset, amount)| AssetHolding {
                    asset: *asset,
                    amount: *amount,
                })
                .collect(),
            local: state.local,
        })
    }

    fn app_info(&self, app: AppId) -> Result<AppInfo, LedgerError> {
        let state = self.apps.get(&app).ok_or(LedgerError::UnknownApp(app))?;
        Ok(AppInfo {
            id: app,
            creator: state.creator,
            address: Address::for_app(app),
            program: state.program.clone(),
            global: state.global.clone(),
        })
    }

    fn asset_info(&self, asset: AssetId) -> Result<AssetInfo, LedgerError> {
        let state = self
            .assets
            .get(&asset)
            .ok_or(LedgerError::UnknownAsset(asset))?;
        Ok(AssetInfo {
            id: asset,
            creator: state.creator,
            params: state.params.clone(),
        })
    }

    fn submit(&mut self, txs: &[SignedTx]) -> Result<Txid, SubmissionError> {
        let mut signed = Vec::with_capacity(txs.len());
        for (index, blob) in txs.iter().enumerate() {
            let tx = blob
                .decode()
                .map_err(|e| SubmissionError::new(index, None, Rejection::Malformed(e.to_string())))?;
            signed.push(tx);
        }
        let txns = signed.iter().map(|s| s.txn.clone()).collect::<Vec<_>>();
        let Some(first) = txns.first() else {
            return Err(SubmissionError::new(0, None, Rejection::InvalidGroup(s!("empty group"))));
        };
        let first_txid = first.txid();

        Group::verify(&txns)
            .map_err(|e| SubmissionError::new(0, Some(first_txid), Rejection::InvalidGroup(e.to_string())))?;

        let round = self.round + 1;
        for (index, stx) in signed.iter().enumerate() {
            let txid = stx.txn.txid();
            let reject = |reason| SubmissionError::new(index, Some(txid), reason);
            if stx.txn.genesis_id != self.genesis_id {
                return Err(reject(Rejection::WrongNetwork(stx.txn.genesis_id.clone())));
            }
            if stx.txn.fee < MIN_FEE {
                return Err(reject(Rejection::FeeTooLow(stx.txn.fee)));
            }
            if !stx.txn.is_valid_at(round) {
                return Err(reject(Rejection::OutOfValidity(round)));
            }
            if self.confirmed.contains_key(&txid) {
                return Err(reject(Rejection::Duplicate));
            }
            let authorized = self
                .key_for(stx.txn.sender)
                .map(|key| key.verify(txid, stx.sig))
                .unwrap_or(false);
            if !authorized {
                return Err(reject(Rejection::InvalidSignature));
            }
        }

        let mut next = self.clone();
        let mut records = Vec::with_capacity(txns.len());
        for (index, tx) in txns.iter().enumerate() {
            let record = next
                .apply(tx, &txns, index, round)
                .map_err(|reason| SubmissionError::new(index, Some(tx.txid()), reason))?;
            records.push((tx.txid(), record));
        }
        next.round = round;
        next.confirmed.extend(records);
        *self = next;

        debug!("Sandbox committed {} transaction(s) in round {round}", txns.len());
        Ok(first_txid)
    }

    fn tx_status(&self, txid: Txid) -> Result<TxStatus, LedgerError> {
        Ok(match self.confirmed.get(&txid) {
            Some(record) => TxStatus::Confirmed {
                round: record.round,
                created_app: record.created_app,
                created_asset: record.created_asset,
            },
            None => TxStatus::Unknown,
        })
    }
}
