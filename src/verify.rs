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

use asctx::{Address, AppId, AssetId};

use crate::ledger::{Ledger, LedgerError, StateValue};

/// Location of a state entry.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Display)]
pub enum StateSlot {
    #[display("global key '{key}' of application {app}")]
    Global { app: AppId, key: String },

    #[display("local key '{key}' of account {account} in application {app}")]
    Local {
        app: AppId,
        account: Address,
        key: String,
    },

    #[display("holding of asset {asset} by account {account}")]
    Holding { account: Address, asset: AssetId },
}

#[derive(Clone, Eq, PartialEq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum VerifyError {
    /// {0} is not found.
    StateNotFound(StateSlot),

    /// {slot} holds {found} value while {expected} is expected.
    TypeMismatch {
        slot: StateSlot,
        expected: &'static str,
        found: &'static str,
    },

    /// {0}
    #[from]
    Ledger(LedgerError),
}

/// Reads back application state and asset holdings from the ledger.
///
/// Absence of an entry is reported as `None`, which is distinct from an entry holding zero.
pub struct StateVerifier<'l, L: Ledger> {
    ledger: &'l L,
}

impl<'l, L: Ledger> StateVerifier<'l, L> {
    pub fn new(ledger: &'l L) -> Self { Self { ledger } }

    pub fn global(&self, app: AppId, key: &str) -> Result<Option<StateValue>, VerifyError> {
        let info = self.ledger.app_info(app)?;
        Ok(info.global.get(key).cloned())
    }

    pub fn local(
        &self,
        app: AppId,
        account: Address,
        key: &str,
    ) -> Result<Option<StateValue>, VerifyError> {
        let info = self.ledger.account_info(account)?;
        Ok(info.local.get(&app).and_then(|store| store.get(key)).cloned())
    }

    pub fn holding(&self, account: Address, asset: AssetId) -> Result<Option<u64>, VerifyError> {
        Ok(self.ledger.account_info(account)?.holding(asset))
    }

    pub fn balance(&self, account: Address) -> Result<u64, VerifyError> {
        Ok(self.ledger.account_info(account)?.amount)
    }

    pub fn require_global(&self, app: AppId, key: &str) -> Result<StateValue, VerifyError> {
        self.global(app, key)?.ok_or_else(|| {
            VerifyError::StateNotFound(StateSlot::Global {
                app,
                key: key.to_owned(),
            })
        })
    }

    pub fn require_local(
        &self,
        app: AppId,
        account: Address,
        key: &str,
    ) -> Result<StateValue, VerifyError> {
        self.local(app, account, key)?.ok_or_else(|| {
            VerifyError::StateNotFound(StateSlot::Local {
                app,
                account,
                key: key.to_owned(),
            })
        })
    }

    pub fn require_holding(&self, account: Address, asset: AssetId) -> Result<u64, VerifyError> {
        self.holding(account, asset)?
            .ok_or(VerifyError::StateNotFound(StateSlot::Holding { account, asset }))
    }

    pub fn global_uint(&self, app: AppId, key: &str) -> Result<u64, VerifyError> {
        match self.require_global(app, key)? {
            StateValue::Uint(value) => Ok(value),
            other => Err(mismatch(app, key, "uint", &other)),
        }
    }

    pub fn global_bytes(&self, app: AppId, key: &str) -> Result<Vec<u8>, VerifyError> {
        match self.require_global(app, key)? {
            StateValue::Bytes(value) => Ok(value),
            other => Err(mismatch(app, key, "bytes", &other)),
        }
    }

    /// Reads a global entry holding an account address.
    ///
    /// An empty byte string (the value before the address is assigned) is reported as a missing
    /// entry.
    pub fn global_address(&self, app: AppId, key: &str) -> Result<Address, VerifyError> {
        let bytes = self.global_bytes(app, key)?;
        if bytes.is_empty() {
            return Err(VerifyError::StateNotFound(StateSlot::Global {
                app,
                key: key.to_owned(),
            }));
        }
        let array = <[u8; 32]>::try_from(bytes.as_slice())
            .map_err(|_| mismatch(app, key, "address", &StateValue::Bytes(bytes.clone())))?;
        Ok(Address::from_byte_array(array))
    }

    /// Sums holdings of the asset across the given accounts; accounts not opted in count as zero.
    pub fn asset_supply_across(
        &self,
        asset: AssetId,
        holders: impl IntoIterator<Item = Address>,
    ) -> Result<u64, VerifyError> {
        let mut total = 0u64;
        for holder in holders {
            total += self.holding(holder, asset)?.unwrap_or_default();
        }
        Ok(total)
    }
}

fn mismatch(app: AppId, key: &str, expected: &'static str, found: &StateValue) -> VerifyError {
    VerifyError::TypeMismatch {
        slot: StateSlot::Global {
            app,
            key: key.to_owned(),
        },
        expected,
        found: found.type_name(),
    }
}
