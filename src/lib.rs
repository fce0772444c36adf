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

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Orchestration of the asset smart contracts lifecycle: deployment and funding of the mint,
//! holdings and burn applications, minting, transfers, burning, price updates and atomic
//! purchases, together with read-back verification of the resulting ledger state.

#[macro_use]
extern crate amplify;
#[macro_use]
extern crate log;
extern crate serde_crate as serde;

pub mod ledger;
pub mod signer;
pub mod submit;
pub mod checkpoint;
pub mod contract;
pub mod verify;
pub mod workflow;
pub mod sandbox;
mod config;
mod error;

pub use asctx as txn;
pub use checkpoint::{
    Checkpoint, CheckpointError, CheckpointStore, CheckpointValue, FileCheckpoints, MemCheckpoints,
};
pub use config::{Config, ConfigError, DEFAULT_GENESIS_ID};
pub use contract::Role;
pub use error::WorkflowError;
pub use ledger::{
    AccountInfo, AppInfo, AssetHolding, AssetInfo, Ledger, LedgerError, Rejection, StateValue,
    SubmissionError, TxStatus,
};
pub use sandbox::{Sandbox, SandboxError};
pub use signer::{Keyring, RejectingSigner, Signer, SignerError};
pub use submit::{Confirmation, SubmitError, Submitter};
pub use verify::{StateSlot, StateVerifier, VerifyError};
pub use workflow::{
    DeployStage, Deployment, Purchase, PurchaseStage, Runtime, TokenListError, TokenSpec,
    DEFAULT_BURN, DEFAULT_DISTRIBUTION, DEFAULT_PRICE, DEFAULT_TOKEN, DEFAULT_TRANSFER, NFT_COST,
};
