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

use asctx::{Address, AppCall, Intent, IntentError};

use super::{Deployment, Runtime};
use crate::checkpoint::CheckpointStore;
use crate::contract::{sell_quote, KEY_PRICE, METHOD_SELL};
use crate::ledger::Ledger;
use crate::signer::Signer;
use crate::submit::Confirmation;
use crate::WorkflowError;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display)]
#[display(lowercase)]
pub enum PurchaseStage {
    Unopted,
    OptedIn,
    Settled,
}

/// Result of a completed purchase.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Purchase {
    pub amount: u64,
    pub price: u64,
    pub paid: u64,
    /// Whether the buyer was opted in to the asset as a part of this purchase.
    pub opted_in: bool,
    pub confirmation: Confirmation,
}

impl<L: Ledger, S: Signer, C: CheckpointStore> Runtime<L, S, C> {
    /// Buys units of the asset from the holdings application.
    ///
    /// Opts the buyer in when needed and settles the purchase as an atomic group of the payment
    /// followed by the sell call. Quantities outside of `1..purchase_cap` are refused before
    /// anything is submitted.
    pub fn buy(&mut self, buyer: Address, amount: u64) -> Result<Purchase, WorkflowError> {
        let cap = self.config.purchase_cap;
        if amount == 0 || amount >= cap {
            return Err(IntentError::AmountOutOfRange { amount, max: cap }.into());
        }
        let deployment = Deployment::load(&self.checkpoints)?;
        let asset = self.minted_asset(&deployment)?;
        let price = self.verifier().global_uint(deployment.holdings_app, KEY_PRICE)?;
        let paid = sell_quote(amount, price)
            .ok_or(IntentError::AmountOutOfRange { amount, max: cap })?;

        let opted_in = self.verifier().holding(buyer, asset)?.is_none();
        if opted_in {
            debug!("Buyer {buyer} is {}, opting in to asset {asset}", PurchaseStage::Unopted);
            self.send(vec![Intent::opt_in(buyer, asset)], "opt in to the asset")?;
        } else {
            debug!("Buyer {buyer} already holds asset {asset}, skipping opt-in");
        }
        info!("Purchase of {amount} units by {buyer}: {}", PurchaseStage::OptedIn);

        let confirmation = self.sell_group(buyer, amount, paid)?;
        info!("Purchase of {amount} units by {buyer}: {} for {paid}", PurchaseStage::Settled);
        Ok(Purchase {
            amount,
            price,
            paid,
            opted_in,
            confirmation,
        })
    }

    /// Submits the payment and the sell call as one atomic group, without local validation of
    /// the amount or the payment.
    pub fn sell_group(
        &mut self,
        buyer: Address,
        amount: u64,
        payment: u64,
    ) -> Result<Confirmation, WorkflowError> {
        let deployment = Deployment::load(&self.checkpoints)?;
        let asset = self.minted_asset(&deployment)?;
        let pay = Intent::payment(buyer, deployment.holdings_addr, payment);
        let call = AppCall::new(buyer, deployment.holdings_app)
            .arg(METHOD_SELL)
            .arg(amount)
            .asset(asset);
        self.send(vec![pay, call.into()], &format!("buy {amount} units for {payment}"))
    }
}
