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

//! Interface of the asset smart contracts: program names, state schemas, global state keys and
//! call methods.

use asctx::{AssetParams, StateSchema};

pub const KEY_COIN_ID: &str = "TeslaCoinID";
pub const KEY_HOLDINGS_ADDR: &str = "HoldingsAddr";
pub const KEY_BURN_ADDR: &str = "BurnAddr";
pub const KEY_PRICE: &str = "Price";

pub const METHOD_MINT: &str = "Mint";
pub const METHOD_TRANSFER: &str = "Transfer";
pub const METHOD_BURN: &str = "Burn";
pub const METHOD_SET_ACCOUNT: &str = "SetAccount";
pub const METHOD_OPT_IN: &str = "AssetOptIn";
pub const METHOD_SELL: &str = "SellTokens";
pub const METHOD_UPDATE_PRICE: &str = "UpdatePrice";

pub const MINT_TOTAL: u64 = 1_000_000;
pub const MINT_DECIMALS: u8 = 0;
pub const MINT_ASSET_NAME: &str = "Tesla";
pub const MINT_UNIT_NAME: &str = "TSLA";

pub const INITIAL_PRICE: u64 = 5_000_000;
/// Flat surcharge on top of the price of the purchased units, covering the inner transfer fee.
pub const SELL_FEE: u64 = 1000;
/// Exclusive upper bound of a single purchase.
pub const SELL_LIMIT: u64 = 1000;

/// Role of a deployed application in the asset lifecycle.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display)]
#[display(lowercase)]
pub enum Role {
    Mint,
    Holdings,
    Burn,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Mint, Role::Holdings, Role::Burn];

    pub fn program(self) -> &'static str {
        match self {
            Role::Mint => "mint_approval",
            Role::Holdings => "holdings_approval",
            Role::Burn => "burn_approval",
        }
    }

    pub fn from_program(program: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.program() == program)
    }

    pub fn schema(self) -> StateSchema {
        match self {
            Role::Mint => StateSchema::new(1, 2),
            Role::Holdings => StateSchema::new(2, 0),
            Role::Burn => StateSchema::new(1, 0),
        }
    }

    /// Name under which the mint application records the account of this role.
    pub fn account_label(self) -> Option<&'static str> {
        match self {
            Role::Mint => None,
            Role::Holdings => Some("Holdings"),
            Role::Burn => Some("Burn"),
        }
    }

    pub fn from_account_label(label: &[u8]) -> Option<Self> {
        match label {
            b"Holdings" => Some(Role::Holdings),
            b"Burn" => Some(Role::Burn),
            _ => None,
        }
    }

    /// Mint global key holding the address of this role's account.
    pub fn address_key(self) -> Option<&'static str> {
        match self {
            Role::Mint => None,
            Role::Holdings => Some(KEY_HOLDINGS_ADDR),
            Role::Burn => Some(KEY_BURN_ADDR),
        }
    }

    pub fn app_checkpoint(self) -> String { format!("{self}AppID") }

    pub fn addr_checkpoint(self) -> String { format!("{self}Addr") }

    pub fn stage_checkpoint(self) -> String { format!("{self}.stage") }
}

/// Parameters of the asset created by the `Mint` method.
pub fn minted_asset() -> AssetParams {
    AssetParams {
        total: MINT_TOTAL,
        decimals: MINT_DECIMALS,
        unit_name: MINT_UNIT_NAME.to_owned(),
        asset_name: MINT_ASSET_NAME.to_owned(),
        url: None,
        metadata_hash: None,
        default_frozen: false,
    }
}

/// Payment required by the holdings application for a purchase, or `None` on overflow.
pub fn sell_quote(amount: u64, price: u64) -> Option<u64> {
    amount.checked_mul(price)?.checked_add(SELL_FEE)
}

/// Parses a big-endian 8-byte integer argument.
pub fn parse_u64_arg(arg: &[u8]) -> Option<u64> {
    let bytes: [u8; 8] = arg.try_into().ok()?;
    Some(u64::from_be_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_names() {
        assert_eq!(Role::Mint.app_checkpoint(), "mintAppID");
        assert_eq!(Role::Holdings.addr_checkpoint(), "holdingsAddr");
        assert_eq!(Role::Burn.stage_checkpoint(), "burn.stage");
        assert_eq!(Role::from_program("holdings_approval"), Some(Role::Holdings));
        assert_eq!(Role::from_program("unknown"), None);
        assert_eq!(Role::from_account_label(b"Burn"), Some(Role::Burn));
    }

    #[test]
    fn quote() {
        assert_eq!(sell_quote(23, INITIAL_PRICE), Some(115_001_000));
        assert_eq!(sell_quote(u64::MAX, 2), None);
    }

    #[test]
    fn u64_args() {
        assert_eq!(parse_u64_arg(&1000u64.to_be_bytes()), Some(1000));
        assert_eq!(parse_u64_arg(b"1000"), None);
    }
}
