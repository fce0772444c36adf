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

//! Multi-step orchestration of the asset lifecycle over a ledger.
//!
//! Every step is submitted and awaited before the next one starts. A failed step halts the
//! workflow; progress recorded in the checkpoint store allows a re-run to resume from the last
//! completed stage.

mod deploy;
mod ops;
mod purchase;
mod tokens;

use std::cmp::min;

use asctx::{assign_group, Group, Intent, Transaction, TxParams, MAX_TX_LIFE};

pub use self::deploy::{DeployStage, Deployment, ASSET_CHECKPOINT};
pub use self::purchase::{Purchase, PurchaseStage};
pub use self::tokens::{TokenListError, TokenSpec, DEFAULT_DISTRIBUTION, DEFAULT_TOKEN, NFT_COST};
use crate::checkpoint::{CheckpointStore, CheckpointValue};
use crate::ledger::Ledger;
use crate::signer::Signer;
use crate::submit::{Confirmation, Submitter};
use crate::verify::StateVerifier;
use crate::{Config, WorkflowError};

pub const DEFAULT_TRANSFER: u64 = 1000;
pub const DEFAULT_BURN: u64 = 1000;
pub const DEFAULT_PRICE: u64 = 6_000_000;

/// Workflow runner combining the ledger client, the signer and the checkpoint store.
pub struct Runtime<L: Ledger, S: Signer, C: CheckpointStore> {
    ledger: L,
    signer: S,
    checkpoints: C,
    config: Config,
}

impl<L: Ledger, S: Signer, C: CheckpointStore> Runtime<L, S, C> {
    pub fn new(ledger: L, signer: S, checkpoints: C, config: Config) -> Self {
        Self {
            ledger,
            signer,
            checkpoints,
            config,
        }
    }

    pub fn ledger(&self) -> &L { &self.ledger }
    pub fn ledger_mut(&mut self) -> &mut L { &mut self.ledger }
    pub fn signer_mut(&mut self) -> &mut S { &mut self.signer }
    pub fn checkpoints(&self) -> &C { &self.checkpoints }
    pub fn checkpoints_mut(&mut self) -> &mut C { &mut self.checkpoints }
    pub fn config(&self) -> &Config { &self.config }

    pub fn into_parts(self) -> (L, S, C) { (self.ledger, self.signer, self.checkpoints) }

    pub fn verifier(&self) -> StateVerifier<'_, L> { StateVerifier::new(&self.ledger) }

    /// Transaction parameters with the configured fee and validity window.
    pub fn params(&self) -> Result<TxParams, WorkflowError> {
        let mut params = self.ledger.suggested_params()?;
        params.fee = params.fee.max(self.config.fee);
        params.last_valid = params.first_valid + min(self.config.validity_rounds, MAX_TX_LIFE);
        Ok(params)
    }

    pub fn build(&self, intent: Intent) -> Result<Transaction, WorkflowError> {
        let params = self.params()?;
        Ok(intent.build(&params)?)
    }

    /// Builds, signs and submits the intents as a single transaction or an atomic group,
    /// waiting for confirmation.
    pub fn send(
        &mut self,
        intents: Vec<Intent>,
        description: &str,
    ) -> Result<Confirmation, WorkflowError> {
        let params = self.params()?;
        let mut txs = intents
            .into_iter()
            .map(|intent| intent.build(&params))
            .collect::<Result<Vec<_>, _>>()?;
        let group = if txs.len() == 1 { Group::single(txs.remove(0))? } else { assign_group(txs)? };
        self.send_group(group, description)
    }

    /// Signs and submits an already assembled group.
    pub fn send_group(
        &mut self,
        group: Group,
        description: &str,
    ) -> Result<Confirmation, WorkflowError> {
        debug!("Sending {description} ({} transaction(s))", group.len());
        let confirmation = Submitter::new(&mut self.ledger, &mut self.signer, self.config.confirm_rounds)
            .send(group, Some(description))?;
        Ok(confirmation)
    }

    fn record(
        &mut self,
        key: &str,
        value: CheckpointValue,
        round: u64,
    ) -> Result<(), WorkflowError> {
        info!("Checkpoint {key} = {value}");
        self.checkpoints.put(key, value, round)?;
        Ok(())
    }
}
