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

use asctx::{Address, AppId, AssetId, AssetParams, OnComplete, Transaction, TxKind, MIN_FEE};

use super::programs::Call;
use super::{AccountState, AppState, AssetState, Sandbox, TxRecord};
use crate::contract::Role;
use crate::ledger::{Rejection, StateValue};

/// Transaction executed by an application account on behalf of its program.
#[derive(Clone, Eq, PartialEq, Debug)]
pub(super) enum InnerTx {
    AssetCreate(AssetParams),
    AssetOptIn(AssetId),
    AssetTransfer {
        asset: AssetId,
        receiver: Address,
        amount: u64,
    },
}

impl Sandbox {
    /// Applies a single transaction of a group to the sandbox state.
    pub(super) fn apply(
        &mut self,
        tx: &Transaction,
        group: &[Transaction],
        index: usize,
        round: u64,
    ) -> Result<TxRecord, Rejection> {
        let mut record = TxRecord {
            round,
            ..TxRecord::default()
        };
        let sender = tx.sender;
        match &tx.kind {
            TxKind::Payment { receiver, amount } => {
                self.debit(sender, *amount, tx.fee)?;
                self.account_mut(*receiver).amount += amount;
            }
            TxKind::AssetTransfer {
                asset,
                receiver,
                amount,
            } => {
                self.debit(sender, 0, tx.fee)?;
                if tx.is_opt_in() {
                    self.opt_in(sender, *asset)?;
                } else {
                    self.move_asset(*asset, sender, *receiver, *amount)?;
                }
            }
            TxKind::AssetCreate(params) => {
                self.debit(sender, 0, tx.fee)?;
                record.created_asset = Some(self.create_asset(sender, params.clone())?);
            }
            TxKind::AppCreate {
                program,
                schema,
                args: _,
                accounts: _,
                assets,
            } => {
                self.debit(sender, 0, tx.fee)?;
                let role = Role::from_program(program)
                    .ok_or_else(|| Rejection::LogicRejected(format!("unknown program '{program}'")))?;
                let app = AppId::from(self.next_index());
                self.apps.insert(app, AppState {
                    creator: sender,
                    program: program.clone(),
                    schema: *schema,
                    global: none!(),
                });
                self.run_create(role, app, assets)?;
                debug!("Sandbox created application {app} running {program}");
                record.created_app = Some(app);
            }
            TxKind::AppCall {
                app,
                on_complete,
                args,
                accounts,
                assets,
            } => {
                self.debit(sender, 0, tx.fee)?;
                let state = self.apps.get(app).ok_or(Rejection::UnknownApp(*app))?;
                if *on_complete != OnComplete::NoOp {
                    return Err(Rejection::LogicRejected(format!(
                        "{on_complete} calls are not supported by the application"
                    )));
                }
                let role = Role::from_program(&state.program).ok_or_else(|| {
                    Rejection::LogicRejected(format!("unknown program '{}'", state.program))
                })?;
                let app = *app;
                self.run_call(role, Call {
                    app,
                    sender,
                    args,
                    accounts,
                    assets,
                    group,
                    index,
                })?;
            }
        }
        self.check_min_balance(sender)?;
        Ok(record)
    }

    pub(super) fn account_mut(&mut self, address: Address) -> &mut AccountState {
        self.accounts.entry(address).or_default()
    }

    fn debit(&mut self, address: Address, amount: u64, fee: u64) -> Result<(), Rejection> {
        let account = self.account_mut(address);
        let total = amount
            .checked_add(fee)
            .ok_or(Rejection::Overspend(address))?;
        if account.amount < total {
            return Err(Rejection::Overspend(address));
        }
        account.amount -= total;
        Ok(())
    }

    fn check_min_balance(&self, address: Address) -> Result<(), Rejection> {
        let Some(account) = self.accounts.get(&address) else {
            return Ok(());
        };
        if account.amount < account.min_balance() {
            return Err(Rejection::InsufficientBalance(address));
        }
        Ok(())
    }

    fn opt_in(&mut self, address: Address, asset: AssetId) -> Result<(), Rejection> {
        if !self.assets.contains_key(&asset) {
            return Err(Rejection::UnknownAsset(asset));
        }
        let account = self.account_mut(address);
        if account.assets.contains_key(&asset) {
            return Err(Rejection::AlreadyOptedIn(address, asset));
        }
        account.assets.insert(asset, 0);
        Ok(())
    }

    pub(super) fn holding(&self, address: Address, asset: AssetId) -> Option<u64> {
        self.accounts
            .get(&address)
            .and_then(|account| account.assets.get(&asset))
            .copied()
    }

    fn move_asset(
        &mut self,
        asset: AssetId,
        from: Address,
        to: Address,
        amount: u64,
    ) -> Result<(), Rejection> {
        if !self.assets.contains_key(&asset) {
            return Err(Rejection::UnknownAsset(asset));
        }
        let available = self
            .holding(from, asset)
            .ok_or(Rejection::NotOptedIn(from, asset))?;
        if self.holding(to, asset).is_none() {
            return Err(Rejection::NotOptedIn(to, asset));
        }
        if available < amount {
            return Err(Rejection::AssetOverspend(from, asset));
        }
        *self.account_mut(from).assets.entry(asset).or_default() -= amount;
        *self.account_mut(to).assets.entry(asset).or_default() += amount;
        Ok(())
    }

    fn create_asset(&mut self, creator: Address, params: AssetParams) -> Result<AssetId, Rejection> {
        if params.total == 0 {
            return Err(Rejection::LogicRejected(s!("asset total supply must be positive")));
        }
        let asset = AssetId::from(self.next_index());
        let total = params.total;
        self.assets.insert(asset, AssetState { creator, params });
        self.account_mut(creator).assets.insert(asset, total);
        debug!("Sandbox created asset {asset} with supply {total}");
        Ok(asset)
    }

    /// Executes a transaction issued by the application account; the account pays the fee.
    pub(super) fn inner_tx(&mut self, app: AppId, inner: InnerTx) -> Result<Option<AssetId>, Rejection> {
        let sender = Address::for_app(app);
        trace!("Application {app} issues inner transaction {inner:?}");
        self.debit(sender, 0, MIN_FEE)?;
        let created = match inner {
            InnerTx::AssetCreate(params) => Some(self.create_asset(sender, params)?),
            InnerTx::AssetOptIn(asset) => {
                self.opt_in(sender, asset)?;
                None
            }
            InnerTx::AssetTransfer {
                asset,
                receiver,
                amount,
            } => {
                self.move_asset(asset, sender, receiver, amount)?;
                None
            }
        };
        self.check_min_balance(sender)?;
        Ok(created)
    }

    pub(super) fn global(&self, app: AppId, key: &str) -> Option<&StateValue> {
        self.apps.get(&app).and_then(|state| state.global.get(key))
    }

    /// Writes application global state, enforcing the declared schema.
    pub(super) fn set_global(
        &mut self,
        app: AppId,
        key: &str,
        value: StateValue,
    ) -> Result<(), Rejection> {
        let state = self.apps.get_mut(&app).ok_or(Rejection::UnknownApp(app))?;
        let mut global = state.global.clone();
        global.insert(key.to_owned(), value);
        let uints = global.values().filter(|v| matches!(v, StateValue::Uint(_))).count();
        let bytes = global.len() - uints;
        if uints > state.schema.num_uint as usize || bytes > state.schema.num_bytes as usize {
            return Err(Rejection::LogicRejected(format!(
                "global state of application {app} exceeds its schema"
            )));
        }
        state.global = global;
        Ok(())
    }
}
