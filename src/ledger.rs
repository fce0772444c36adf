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

//! Ledger client interface: network parameters, state queries, submission and confirmation.

use std::collections::BTreeMap;

use asctx::{Address, AppId, AssetId, AssetParams, SignedTx, Txid, TxParams};
use serde::{Deserialize, Serialize};

/// Contract key/value storage entry.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Display)]
#[derive(Serialize, Deserialize)]
#[serde(crate = "serde_crate", rename_all = "camelCase")]
pub enum StateValue {
    #[display("{0}")]
    Uint(u64),
    #[display("{0:02x?}")]
    Bytes(Vec<u8>),
}

impl StateValue {
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            StateValue::Uint(v) => Some(*v),
            StateValue::Bytes(_) => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            StateValue::Bytes(v) => Some(v),
            StateValue::Uint(_) => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            StateValue::Uint(_) => "uint",
            StateValue::Bytes(_) => "bytes",
        }
    }
}

impl From<u64> for StateValue {
    fn from(value: u64) -> Self { StateValue::Uint(value) }
}

impl From<Address> for StateValue {
    fn from(addr: Address) -> Self { StateValue::Bytes(addr.to_byte_array().to_vec()) }
}

pub type KeyValueStore = BTreeMap<String, StateValue>;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[derive(Serialize, Deserialize)]
#[serde(crate = "serde_crate", rename_all = "camelCase")]
pub struct AssetHolding {
    pub asset: AssetId,
    pub amount: u64,
}

#[derive(Clone, Eq, PartialEq, Debug)]
#[derive(Serialize, Deserialize)]
#[serde(crate = "serde_crate", rename_all = "camelCase")]
pub struct AccountInfo {
    pub address: Address,
    pub amount: u64,
    pub min_balance: u64,
    pub assets: Vec<AssetHolding>,
    pub local: BTreeMap<AppId, KeyValueStore>,
}

impl AccountInfo {
    /// Amount of the asset held by the account, or `None` if the account has not opted in.
    ///
    /// Scans the complete holdings list.
    pub fn holding(&self, asset: AssetId) -> Option<u64> {
        self.assets
            .iter()
            .find(|holding| holding.asset == asset)
            .map(|holding| holding.amount)
    }

    pub fn is_opted_in(&self, asset: AssetId) -> bool { self.holding(asset).is_some() }
}

#[derive(Clone, Eq, PartialEq, Debug)]
#[derive(Serialize, Deserialize)]
#[serde(crate = "serde_crate", rename_all = "camelCase")]
pub struct AppInfo {
    pub id: AppId,
    pub creator: Address,
    pub address: Address,
    pub program: String,
    pub global: KeyValueStore,
}

#[derive(Clone, Eq, PartialEq, Debug)]
#[derive(Serialize, Deserialize)]
#[serde(crate = "serde_crate", rename_all = "camelCase")]
pub struct AssetInfo {
    pub id: AssetId,
    pub creator: Address,
    pub params: AssetParams,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
pub enum TxStatus {
    #[display("unknown")]
    Unknown,

    #[display("pending")]
    Pending,

    #[display("confirmed in round {round}")]
    Confirmed {
        round: u64,
        created_app: Option<AppId>,
        created_asset: Option<AssetId>,
    },
}

/// Reason for the ledger refusing a transaction group.
#[derive(Clone, Eq, PartialEq, Debug, Display)]
#[derive(Serialize, Deserialize)]
#[serde(crate = "serde_crate", rename_all = "camelCase")]
#[display(doc_comments)]
pub enum Rejection {
    /// application logic rejected the call: {0}.
    LogicRejected(String),

    /// sender {0} balance would fall below its minimal balance.
    InsufficientBalance(Address),

    /// sender {0} does not have enough funds to cover the amount and the fee.
    Overspend(Address),

    /// account {0} does not hold enough units of asset {1}.
    AssetOverspend(Address, AssetId),

    /// account {0} is not opted in to asset {1}.
    NotOptedIn(Address, AssetId),

    /// account {0} is already opted in to asset {1}.
    AlreadyOptedIn(Address, AssetId),

    /// operation is not authorized for {0}.
    Unauthorized(Address),

    /// transaction signature is invalid.
    InvalidSignature,

    /// transaction group is malformed: {0}.
    InvalidGroup(String),

    /// transaction fee {0} is below the minimal fee.
    FeeTooLow(u64),

    /// transaction is not valid in the current round {0}.
    OutOfValidity(u64),

    /// unknown application {0}.
    UnknownApp(AppId),

    /// unknown asset {0}.
    UnknownAsset(AssetId),

    /// transaction was already committed.
    Duplicate,

    /// transaction belongs to a different network {0}.
    WrongNetwork(String),

    /// transaction encoding is malformed: {0}.
    Malformed(String),
}

/// Ledger-level rejection of a submitted group.
#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
#[display("ledger rejected transaction #{index} of the group: {reason}")]
pub struct SubmissionError {
    pub index: usize,
    pub txid: Option<Txid>,
    pub reason: Rejection,
}

impl SubmissionError {
    pub fn new(index: usize, txid: Option<Txid>, reason: Rejection) -> Self {
        SubmissionError {
            index,
            txid,
            reason,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum LedgerError {
    /// unknown account {0}.
    UnknownAccount(Address),

    /// unknown application {0}.
    UnknownApp(AppId),

    /// unknown asset {0}.
    UnknownAsset(AssetId),

    /// transaction {txid} was not confirmed within {rounds} rounds.
    ConfirmationTimeout { txid: Txid, rounds: u64 },

    /// ledger is not reachable: {0}.
    Transport(String),
}

/// Client of the ledger network.
///
/// Submission and confirmation are split: [`Ledger::submit`] returns as soon as the ledger
/// accepts the group into its pool, while [`Ledger::tx_status`] reports commitment.
pub trait Ledger {
    /// Parameters for constructing transactions valid from the next round.
    fn suggested_params(&self) -> Result<TxParams, LedgerError>;

    fn last_round(&self) -> Result<u64, LedgerError>;

    /// Blocks until the ledger reaches the given round.
    fn wait_for_round(&mut self, round: u64) -> Result<u64, LedgerError>;

    fn account_info(&self, address: Address) -> Result<AccountInfo, LedgerError>;

    fn app_info(&self, app: AppId) -> Result<AppInfo, LedgerError>;

    fn asset_info(&self, asset: AssetId) -> Result<AssetInfo, LedgerError>;

    /// Submits signed transactions forming a single atomic group (or a single transaction).
    /// Returns id of the first transaction.
    fn submit(&mut self, txs: &[SignedTx]) -> Result<Txid, SubmissionError>;

    fn tx_status(&self, txid: Txid) -> Result<TxStatus, LedgerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holding_scans_whole_list() {
        let info = AccountInfo {
            address: Address::from_byte_array([1; 32]),
            amount: 0,
            min_balance: 100_000,
            assets: vec![
                AssetHolding {
                    asset: AssetId::from(1),
                    amount: 5,
                },
                AssetHolding {
                    asset: AssetId::from(2),
                    amount: 0,
                },
                AssetHolding {
                    asset: AssetId::from(3),
                    amount: 77,
                },
            ],
            local: none!(),
        };
        assert_eq!(info.holding(AssetId::from(3)), Some(77));
        assert_eq!(info.holding(AssetId::from(2)), Some(0));
        assert_eq!(info.holding(AssetId::from(4)), None);
        assert!(info.is_opted_in(AssetId::from(2)));
    }

    #[test]
    fn state_values() {
        assert_eq!(StateValue::Uint(5).as_uint(), Some(5));
        assert_eq!(StateValue::Uint(5).as_bytes(), None);
        assert_eq!(StateValue::Bytes(vec![1]).as_bytes(), Some(&[1u8][..]));
        assert_eq!(StateValue::Bytes(vec![1]).type_name(), "bytes");
    }

    #[test]
    fn submission_error_message() {
        let err = SubmissionError::new(1, None, Rejection::InvalidSignature);
        assert_eq!(
            err.to_string(),
            "ledger rejected transaction #1 of the group: transaction signature is invalid."
        );
    }
}
