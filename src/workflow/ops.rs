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

use asctx::{Address, AppCall, AssetId};

use super::{Deployment, Runtime};
use crate::checkpoint::CheckpointStore;
use crate::contract::{Role, KEY_COIN_ID, METHOD_BURN, METHOD_TRANSFER, METHOD_UPDATE_PRICE};
use crate::ledger::Ledger;
use crate::signer::Signer;
use crate::submit::Confirmation;
use crate::WorkflowError;

impl<L: Ledger, S: Signer, C: CheckpointStore> Runtime<L, S, C> {
    /// Asset id as recorded in the global state of the mint application.
    pub fn minted_asset(&self, deployment: &Deployment) -> Result<AssetId, WorkflowError> {
        Ok(AssetId::from(self.verifier().global_uint(deployment.mint_app, KEY_COIN_ID)?))
    }

    /// Moves minted units from the mint application to the holdings account.
    pub fn transfer(&mut self, creator: Address, amount: u64) -> Result<Confirmation, WorkflowError> {
        self.send_minted(creator, amount, Role::Holdings)
    }

    /// Moves minted units from the mint application to the burn account.
    pub fn burn(&mut self, creator: Address, amount: u64) -> Result<Confirmation, WorkflowError> {
        self.send_minted(creator, amount, Role::Burn)
    }

    fn send_minted(
        &mut self,
        creator: Address,
        amount: u64,
        target: Role,
    ) -> Result<Confirmation, WorkflowError> {
        let deployment = Deployment::load(&self.checkpoints)?;
        let asset = self.minted_asset(&deployment)?;
        let (method, receiver) = match target {
            Role::Burn => (METHOD_BURN, deployment.burn_addr),
            _ => (METHOD_TRANSFER, deployment.holdings_addr),
        };
        let call = AppCall::new(creator, deployment.mint_app)
            .arg(method)
            .arg(amount)
            .account(receiver)
            .asset(asset);
        let confirmation = self.send(vec![call.into()], &format!("{method} {amount} units"))?;
        info!("Moved {amount} units of asset {asset} to the {target} account {receiver}");
        Ok(confirmation)
    }

    /// Sets a new price of a single unit in the holdings application.
    pub fn update_price(&mut self, creator: Address, price: u64) -> Result<Confirmation, WorkflowError> {
        let deployment = Deployment::load(&self.checkpoints)?;
        let call = AppCall::new(creator, deployment.holdings_app)
            .arg(METHOD_UPDATE_PRICE)
            .arg(price);
        let confirmation = self.send(vec![call.into()], &format!("update price to {price}"))?;
        info!("Price of the asset is set to {price}");
        Ok(confirmation)
    }
}
