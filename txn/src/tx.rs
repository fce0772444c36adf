// Transaction construction library for asset smart contracts
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

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{tagged_hash, Address, AppId, AssetId, GroupId, Signature, Txid};

pub const MIN_FEE: u64 = 1000;
pub const MAX_GROUP_SIZE: usize = 16;
pub const MAX_APP_ARGS: usize = 16;
pub const MAX_FOREIGN_ACCOUNTS: usize = 4;
pub const MAX_FOREIGN_ASSETS: usize = 8;

/// Network parameters a transaction is built against.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[derive(Serialize, Deserialize)]
#[serde(crate = "serde_crate", rename_all = "camelCase")]
pub struct TxParams {
    pub fee: u64,
    pub min_fee: u64,
    pub first_valid: u64,
    pub last_valid: u64,
    pub genesis_id: String,
}

impl TxParams {
    pub fn with_fee(mut self, fee: u64) -> Self {
        self.fee = fee;
        self
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[derive(Serialize, Deserialize)]
#[serde(crate = "serde_crate", rename_all = "camelCase")]
pub struct StateSchema {
    pub num_uint: u8,
    pub num_bytes: u8,
}

impl StateSchema {
    pub const fn new(num_uint: u8, num_bytes: u8) -> Self { Self { num_uint, num_bytes } }

    pub const fn total(&self) -> usize { self.num_uint as usize + self.num_bytes as usize }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[derive(Serialize, Deserialize)]
#[serde(crate = "serde_crate", rename_all = "camelCase")]
pub struct AssetParams {
    pub total: u64,
    pub decimals: u8,
    pub unit_name: String,
    pub asset_name: String,
    pub url: Option<String>,
    pub metadata_hash: Option<[u8; 32]>,
    pub default_frozen: bool,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Display)]
#[derive(Serialize, Deserialize)]
#[serde(crate = "serde_crate", rename_all = "camelCase")]
#[display(doc_comments)]
pub enum OnComplete {
    /// noop
    #[default]
    NoOp,
    /// optin
    OptIn,
    /// closeout
    CloseOut,
    /// delete
    DeleteApplication,
    /// update
    UpdateApplication,
}

/// Application call argument before encoding into raw bytes.
#[derive(Clone, Eq, PartialEq, Hash, Debug, From)]
pub enum AppArg {
    #[from]
    Str(String),
    #[from]
    U64(u64),
    #[from]
    Bytes(Vec<u8>),
    #[from]
    Address(Address),
}

impl From<&str> for AppArg {
    fn from(s: &str) -> Self { AppArg::Str(s.to_owned()) }
}

impl AppArg {
    /// Integers are encoded as 8-byte big-endian values, strings as UTF-8.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            AppArg::Str(s) => s.as_bytes().to_vec(),
            AppArg::U64(v) => v.to_be_bytes().to_vec(),
            AppArg::Bytes(b) => b.clone(),
            AppArg::Address(addr) => addr.to_byte_array().to_vec(),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[derive(Serialize, Deserialize)]
#[serde(crate = "serde_crate", rename_all = "camelCase")]
pub enum TxKind {
    Payment {
        receiver: Address,
        amount: u64,
    },
    /// Asset transfer; a zero-amount transfer to self is an opt-in.
    AssetTransfer {
        asset: AssetId,
        receiver: Address,
        amount: u64,
    },
    AssetCreate(AssetParams),
    AppCreate {
        program: String,
        schema: StateSchema,
        args: Vec<Vec<u8>>,
        accounts: Vec<Address>,
        assets: Vec<AssetId>,
    },
    AppCall {
        app: AppId,
        on_complete: OnComplete,
        args: Vec<Vec<u8>>,
        accounts: Vec<Address>,
        assets: Vec<AssetId>,
    },
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
#[display(lowercase)]
pub enum TxType {
    Pay,
    Axfer,
    Acfg,
    Appl,
}

impl TxKind {
    pub fn tx_type(&self) -> TxType {
        match self {
            TxKind::Payment { .. } => TxType::Pay,
            TxKind::AssetTransfer { .. } => TxType::Axfer,
            TxKind::AssetCreate(_) => TxType::Acfg,
            TxKind::AppCreate { .. } | TxKind::AppCall { .. } => TxType::Appl,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[derive(Serialize, Deserialize)]
#[serde(crate = "serde_crate", rename_all = "camelCase")]
pub struct Transaction {
    pub sender: Address,
    pub fee: u64,
    pub first_valid: u64,
    pub last_valid: u64,
    pub genesis_id: String,
    pub note: Option<Vec<u8>>,
    pub group: Option<GroupId>,
    pub kind: TxKind,
}

impl Transaction {
    pub fn txid(&self) -> Txid {
        let data = encode(self);
        Txid::from_byte_array(tagged_hash(b"TX", [data.as_slice()]))
    }

    pub fn tx_type(&self) -> TxType { self.kind.tx_type() }

    pub fn is_opt_in(&self) -> bool {
        matches!(self.kind, TxKind::AssetTransfer { receiver, amount: 0, .. } if receiver == self.sender)
    }

    /// Checks whether the round falls within the transaction validity window.
    pub fn is_valid_at(&self, round: u64) -> bool {
        self.first_valid <= round && round <= self.last_valid
    }

    pub fn to_unsigned(&self) -> UnsignedTx { UnsignedTx(encode(self)) }
}

impl Display for Transaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} from {}", self.tx_type(), self.txid(), self.sender)
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[derive(Serialize, Deserialize)]
#[serde(crate = "serde_crate", rename_all = "camelCase")]
pub struct SignedTransaction {
    pub txn: Transaction,
    pub sig: Signature,
}

/// Wire-encoded unsigned transaction, as handed over to a signer.
#[derive(Wrapper, Clone, Eq, PartialEq, Hash, Debug, From)]
#[wrapper(Deref)]
pub struct UnsignedTx(#[from] Vec<u8>);

impl UnsignedTx {
    pub fn from_bytes(bytes: Vec<u8>) -> Self { Self(bytes) }

    pub fn decode(&self) -> Result<Transaction, DecodeError> { decode(&self.0) }
}

/// Wire-encoded signed transaction, as submitted to the ledger.
#[derive(Wrapper, Clone, Eq, PartialEq, Hash, Debug, From)]
#[wrapper(Deref)]
pub struct SignedTx(#[from] Vec<u8>);

impl SignedTx {
    pub fn from_bytes(bytes: Vec<u8>) -> Self { Self(bytes) }

    pub fn new(txn: Transaction, sig: Signature) -> Self { Self(encode(&SignedTransaction { txn, sig })) }

    pub fn decode(&self) -> Result<SignedTransaction, DecodeError> { decode(&self.0) }
}

#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
#[display("malformed transaction encoding: {0}")]
pub struct DecodeError(String);

fn encode<T: serde::Serialize>(value: &T) -> Vec<u8> {
    bincode::serde::encode_to_vec(value, bincode::config::standard())
        .expect("in-memory serialization of transaction data never fails")
}

fn decode<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T, DecodeError> {
    let (value, read) = bincode::serde::decode_from_slice(data, bincode::config::standard())
        .map_err(|e| DecodeError(e.to_string()))?;
    if read != data.len() {
        return Err(DecodeError(format!("{} trailing bytes", data.len() - read)));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment() -> Transaction {
        Transaction {
            sender: Address::from_byte_array([1u8; 32]),
            fee: MIN_FEE,
            first_valid: 1,
            last_valid: 1001,
            genesis_id: s!("sandbox-v1"),
            note: None,
            group: None,
            kind: TxKind::Payment {
                receiver: Address::from_byte_array([2u8; 32]),
                amount: 1_000_000,
            },
        }
    }

    #[test]
    fn txid_changes_with_group() {
        let tx = payment();
        let mut grouped = tx.clone();
        grouped.group = Some(GroupId::from_byte_array([9u8; 32]));
        assert_eq!(tx.txid(), payment().txid());
        assert_ne!(tx.txid(), grouped.txid());
    }

    #[test]
    fn wire_encoding() {
        let tx = payment();
        let unsigned = tx.to_unsigned();
        assert_eq!(unsigned.decode().unwrap(), tx);

        let signed = SignedTx::new(tx.clone(), Signature::from_byte_array([3u8; 32]));
        let decoded = signed.decode().unwrap();
        assert_eq!(decoded.txn, tx);

        let mut bytes = signed.to_vec();
        bytes.push(0);
        assert!(SignedTx::from_bytes(bytes).decode().is_err());
        assert!(SignedTx::from_bytes(vec![0xFF, 0xFF]).decode().is_err());
    }

    #[test]
    fn app_args() {
        assert_eq!(AppArg::from("Mint").to_bytes(), b"Mint".to_vec());
        assert_eq!(AppArg::from(1000u64).to_bytes(), vec![0, 0, 0, 0, 0, 0, 0x03, 0xE8]);
    }

    #[test]
    fn opt_in_detection() {
        let mut tx = payment();
        assert!(!tx.is_opt_in());
        tx.kind = TxKind::AssetTransfer {
            asset: AssetId::from(5),
            receiver: tx.sender,
            amount: 0,
        };
        assert!(tx.is_opt_in());
        assert_eq!(tx.tx_type().to_string(), "axfer");
    }

    #[test]
    fn validity_window() {
        let tx = payment();
        assert!(!tx.is_valid_at(0));
        assert!(tx.is_valid_at(1));
        assert!(tx.is_valid_at(1001));
        assert!(!tx.is_valid_at(1002));
    }
}
