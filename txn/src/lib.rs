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

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Construction, grouping and wire encoding of ledger transactions used by the asset smart
//! contracts orchestration runtime.

#[macro_use]
extern crate amplify;
extern crate serde_crate as serde;

mod ids;
mod key;
mod tx;
pub mod builder;
pub mod group;

pub use builder::{AppCall, AppCreate, Intent, IntentError, MAX_TX_LIFE};
pub use group::{assign_group, group_id, Group, GroupError};
pub use ids::{tagged_hash, Address, AppId, AssetId, GroupId, Signature, Txid};
pub use key::SigningKey;
pub use tx::{
    AppArg, AssetParams, DecodeError, OnComplete, SignedTransaction, SignedTx, StateSchema,
    Transaction, TxKind, TxParams, TxType, UnsignedTx, MAX_APP_ARGS, MAX_FOREIGN_ACCOUNTS,
    MAX_FOREIGN_ASSETS, MAX_GROUP_SIZE, MIN_FEE,
};
