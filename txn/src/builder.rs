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

//! Typed construction of ledger transactions from domain intents.

use crate::{
    Address, AppArg, AppId, AssetId, AssetParams, OnComplete, StateSchema, Transaction, TxKind,
    TxParams, MAX_APP_ARGS, MAX_FOREIGN_ACCOUNTS, MAX_FOREIGN_ASSETS,
};

/// Maximal distance between the first and the last valid round of a transaction.
pub const MAX_TX_LIFE: u64 = 1000;

pub const MAX_ASSET_DECIMALS: u8 = 19;

#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum IntentError {
    /// {0} address must not be the zero address.
    ZeroAddress(&'static str),

    /// {0} must reference an existing entity and can't be zero.
    ZeroId(&'static str),

    /// transaction fee {fee} is below the minimal fee {min_fee}.
    FeeTooLow { fee: u64, min_fee: u64 },

    /// invalid validity window: first valid round {first} must not exceed last valid round {last}
    /// and the window must not be longer than 1000 rounds.
    InvalidValidity { first: u64, last: u64 },

    /// application call has {0} arguments, while at most 16 are allowed.
    TooManyArgs(usize),

    /// application call references {accounts} accounts and {assets} assets, exceeding the
    /// limits of 4 accounts and 8 assets.
    TooManyReferences { accounts: usize, assets: usize },

    /// invalid asset parameters: total supply must be positive and decimals must not exceed 19.
    InvalidAssetParams,

    /// application program reference is empty.
    EmptyProgram,

    /// amount {amount} is out of the allowed range 1..{max}.
    AmountOutOfRange { amount: u64, max: u64 },
}

/// Application call under construction.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct AppCall {
    pub sender: Address,
    pub app: AppId,
    pub on_complete: OnComplete,
    pub args: Vec<AppArg>,
    pub accounts: Vec<Address>,
    pub assets: Vec<AssetId>,
}

impl AppCall {
    pub fn new(sender: Address, app: AppId) -> Self {
        AppCall {
            sender,
            app,
            on_complete: OnComplete::NoOp,
            args: vec![],
            accounts: vec![],
            assets: vec![],
        }
    }

    pub fn arg(mut self, arg: impl Into<AppArg>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn account(mut self, account: Address) -> Self {
        self.accounts.push(account);
        self
    }

    pub fn asset(mut self, asset: AssetId) -> Self {
        self.assets.push(asset);
        self
    }

    pub fn on_complete(mut self, on_complete: OnComplete) -> Self {
        self.on_complete = on_complete;
        self
    }
}

/// Application deployment under construction.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct AppCreate {
    pub sender: Address,
    pub program: String,
    pub schema: StateSchema,
    pub args: Vec<AppArg>,
    pub accounts: Vec<Address>,
    pub assets: Vec<AssetId>,
}

impl AppCreate {
    pub fn new(sender: Address, program: impl ToString, schema: StateSchema) -> Self {
        AppCreate {
            sender,
            program: program.to_string(),
            schema,
            args: vec![],
            accounts: vec![],
            assets: vec![],
        }
    }

    pub fn asset(mut self, asset: AssetId) -> Self {
        self.assets.push(asset);
        self
    }

    pub fn arg(mut self, arg: impl Into<AppArg>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// Domain-level description of a single transaction.
#[derive(Clone, Eq, PartialEq, Debug, From)]
pub enum Intent {
    Payment {
        sender: Address,
        receiver: Address,
        amount: u64,
    },
    AssetTransfer {
        sender: Address,
        receiver: Address,
        asset: AssetId,
        amount: u64,
    },
    AssetOptIn {
        account: Address,
        asset: AssetId,
    },
    AssetCreate {
        creator: Address,
        params: AssetParams,
    },
    #[from]
    AppCreate(AppCreate),
    #[from]
    AppCall(AppCall),
}

impl Intent {
    pub fn payment(sender: Address, receiver: Address, amount: u64) -> Self {
        Intent::Payment {
            sender,
            receiver,
            amount,
        }
    }

    pub fn asset_transfer(sender: Address, receiver: Address, asset: AssetId, amount: u64) -> Self {
        Intent::AssetTransfer {
            sender,
            receiver,
            asset,
            amount,
        }
    }

    pub fn opt_in(account: Address, asset: AssetId) -> Self { Intent::AssetOptIn { account, asset } }

    pub fn sender(&self) -> Address {
        match self {
            Intent::Payment { sender, .. } | Intent::AssetTransfer { sender, .. } => *sender,
            Intent::AssetOptIn { account, .. } => *account,
            Intent::AssetCreate { creator, .. } => *creator,
            Intent::AppCreate(create) => create.sender,
            Intent::AppCall(call) => call.sender,
        }
    }

    /// Validates the intent against network parameters and produces an unsigned, ungrouped
    /// transaction.
    pub fn build(self, params: &TxParams) -> Result<Transaction, IntentError> {
        if params.fee < params.min_fee {
            return Err(IntentError::FeeTooLow {
                fee: params.fee,
                min_fee: params.min_fee,
            });
        }
        if params.first_valid > params.last_valid ||
            params.last_valid - params.first_valid > MAX_TX_LIFE
        {
            return Err(IntentError::InvalidValidity {
                first: params.first_valid,
                last: params.last_valid,
            });
        }
        let sender = self.sender();
        if sender.is_zero() {
            return Err(IntentError::ZeroAddress("sender"));
        }

        let kind = match self {
            Intent::Payment {
                receiver, amount, ..
            } => {
                non_zero_address(receiver, "receiver")?;
                TxKind::Payment { receiver, amount }
            }
            Intent::AssetTransfer {
                receiver,
                asset,
                amount,
                ..
            } => {
                non_zero_address(receiver, "receiver")?;
                non_zero_asset(asset)?;
                TxKind::AssetTransfer {
                    asset,
                    receiver,
                    amount,
                }
            }
            Intent::AssetOptIn { account, asset } => {
                non_zero_asset(asset)?;
                TxKind::AssetTransfer {
                    asset,
                    receiver: account,
                    amount: 0,
                }
            }
            Intent::AssetCreate { params, .. } => {
                if params.total == 0 || params.decimals > MAX_ASSET_DECIMALS {
                    return Err(IntentError::InvalidAssetParams);
                }
                TxKind::AssetCreate(params)
            }
            Intent::AppCreate(create) => {
                if create.program.trim().is_empty() {
                    return Err(IntentError::EmptyProgram);
                }
                check_references(create.args.len(), &create.accounts, &create.assets)?;
                TxKind::AppCreate {
                    program: create.program,
                    schema: create.schema,
                    args: create.args.iter().map(AppArg::to_bytes).collect(),
                    accounts: create.accounts,
                    assets: create.assets,
                }
            }
            Intent::AppCall(call) => {
                if call.app.to_u64() == 0 {
                    return Err(IntentError::ZeroId("application id"));
                }
                check_references(call.args.len(), &call.accounts, &call.assets)?;
                TxKind::AppCall {
                    app: call.app,
                    on_complete: call.on_complete,
                    args: call.args.iter().map(AppArg::to_bytes).collect(),
                    accounts: call.accounts,
                    assets: call.assets,
                }
            }
        };

        Ok(Transaction {
            sender,
            fee: params.fee,
            first_valid: params.first_valid,
            last_valid: params.last_valid,
            genesis_id: params.genesis_id.clone(),
            note: None,
            group: None,
            kind,
        })
    }
}

fn non_zero_address(address: Address, field: &'static str) -> Result<(), IntentError> {
    if address.is_zero() {
        return Err(IntentError::ZeroAddress(field));
    }
    Ok(())
}

fn non_zero_asset(asset: AssetId) -> Result<(), IntentError> {
    if asset.to_u64() == 0 {
        return Err(IntentError::ZeroId("asset id"));
    }
    Ok(())
}

fn check_references(
    args: usize,
    accounts: &[Address],
    assets: &[AssetId],
) -> Result<(), IntentError> {
    if args > MAX_APP_ARGS {
        return Err(IntentError::TooManyArgs(args));
    }
    if accounts.len() > MAX_FOREIGN_ACCOUNTS || assets.len() > MAX_FOREIGN_ASSETS {
        return Err(IntentError::TooManyReferences {
            accounts: accounts.len(),
            assets: assets.len(),
        });
    }
    if assets.iter().any(|id| id.to_u64() == 0) {
        return Err(IntentError::ZeroId("foreign asset id"));
    }
    Ok(())
}
