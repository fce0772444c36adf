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

//! Native implementation of the mint, holdings and burn approval programs.

use asctx::{Address, AppId, AssetId, Transaction, TxKind};

use super::exec::InnerTx;
use super::Sandbox;
use crate::contract::{
    minted_asset, parse_u64_arg, Role, INITIAL_PRICE, KEY_BURN_ADDR, KEY_COIN_ID,
    KEY_HOLDINGS_ADDR, KEY_PRICE, METHOD_BURN, METHOD_MINT, METHOD_OPT_IN, METHOD_SELL,
    METHOD_SET_ACCOUNT, METHOD_TRANSFER, METHOD_UPDATE_PRICE, SELL_FEE, SELL_LIMIT,
};
use crate::ledger::{Rejection, StateValue};

/// Application call context visible to a program.
pub(super) struct Call<'a> {
    pub app: AppId,
    pub sender: Address,
    pub args: &'a [Vec<u8>],
    pub accounts: &'a [Address],
    pub assets: &'a [AssetId],
    pub group: &'a [Transaction],
    pub index: usize,
}

impl Call<'_> {
    fn method(&self) -> Result<&str, Rejection> {
        let arg = self.args.first().ok_or_else(|| reject("method argument is missing"))?;
        std::str::from_utf8(arg).map_err(|_| reject("method name is not a valid UTF-8 string"))
    }

    fn expect_shape(&self, group_size: usize, args: usize) -> Result<(), Rejection> {
        if self.group.len() != group_size {
            return Err(reject(format!(
                "method requires a group of {group_size} transaction(s), while {} are given",
                self.group.len()
            )));
        }
        if self.args.len() != args {
            return Err(reject(format!(
                "method requires {args} argument(s), while {} are given",
                self.args.len()
            )));
        }
        Ok(())
    }

    fn amount_arg(&self) -> Result<u64, Rejection> {
        self.args
            .get(1)
            .and_then(|arg| parse_u64_arg(arg))
            .ok_or_else(|| reject("amount argument must be an 8-byte integer"))
    }

    fn first_account(&self) -> Result<Address, Rejection> {
        self.accounts
            .first()
            .copied()
            .ok_or_else(|| reject("account reference is missing"))
    }

    fn first_asset(&self) -> Result<AssetId, Rejection> {
        self.assets
            .first()
            .copied()
            .ok_or_else(|| reject("asset reference is missing"))
    }
}

fn reject(msg: impl ToString) -> Rejection { Rejection::LogicRejected(msg.to_string()) }

impl Sandbox {
    pub(super) fn run_create(
        &mut self,
        role: Role,
        app: AppId,
        assets: &[AssetId],
    ) -> Result<(), Rejection> {
        match role {
            Role::Mint => {
                self.set_global(app, KEY_COIN_ID, StateValue::Uint(0))?;
                self.set_global(app, KEY_HOLDINGS_ADDR, StateValue::Bytes(vec![]))?;
                self.set_global(app, KEY_BURN_ADDR, StateValue::Bytes(vec![]))?;
            }
            Role::Holdings | Role::Burn => {
                let asset = assets
                    .first()
                    .ok_or_else(|| reject("asset reference is missing"))?;
                self.set_global(app, KEY_COIN_ID, StateValue::Uint(asset.to_u64()))?;
                if role == Role::Holdings {
                    self.set_global(app, KEY_PRICE, StateValue::Uint(INITIAL_PRICE))?;
                }
            }
        }
        Ok(())
    }

    pub(super) fn run_call(&mut self, role: Role, call: Call) -> Result<(), Rejection> {
        let method = call.method()?;
        match (role, method) {
            (Role::Holdings, METHOD_SELL) => self.sell_tokens(&call),
            (_, method) => {
                self.require_creator(&call)?;
                match (role, method) {
                    (Role::Mint, METHOD_MINT) => self.mint(&call),
                    (Role::Mint, METHOD_TRANSFER) => self.send_minted(&call, Role::Holdings),
                    (Role::Mint, METHOD_BURN) => self.send_minted(&call, Role::Burn),
                    (Role::Mint, METHOD_SET_ACCOUNT) => self.set_account(&call),
                    (Role::Holdings | Role::Burn, METHOD_OPT_IN) => self.app_opt_in(&call),
                    (Role::Holdings, METHOD_UPDATE_PRICE) => self.update_price(&call),
                    (role, method) => {
                        Err(reject(format!("{role} application has no method '{method}'")))
                    }
                }
            }
        }
    }

    fn require_creator(&self, call: &Call) -> Result<(), Rejection> {
        let creator = self
            .apps
            .get(&call.app)
            .map(|state| state.creator)
            .ok_or(Rejection::UnknownApp(call.app))?;
        if call.sender != creator {
            return Err(Rejection::Unauthorized(call.sender));
        }
        Ok(())
    }

    fn coin_id(&self, app: AppId) -> Result<u64, Rejection> {
        self.global(app, KEY_COIN_ID)
            .and_then(StateValue::as_uint)
            .ok_or_else(|| reject("asset id is absent from the global state"))
    }

    fn require_coin(&self, call: &Call) -> Result<AssetId, Rejection> {
        let asset = call.first_asset()?;
        if asset.to_u64() != self.coin_id(call.app)? {
            return Err(reject(format!("asset {asset} is not managed by the application")));
        }
        Ok(asset)
    }

    fn mint(&mut self, call: &Call) -> Result<(), Rejection> {
        call.expect_shape(1, 1)?;
        if self.coin_id(call.app)? != 0 {
            return Err(reject("asset is already minted"));
        }
        let asset = self
            .inner_tx(call.app, InnerTx::AssetCreate(minted_asset()))?
            .ok_or_else(|| reject("asset creation produced no asset"))?;
        self.set_global(call.app, KEY_COIN_ID, StateValue::Uint(asset.to_u64()))
    }

    fn send_minted(&mut self, call: &Call, target: Role) -> Result<(), Rejection> {
        call.expect_shape(1, 2)?;
        let receiver = call.first_account()?;
        let key = target.address_key().ok_or_else(|| reject("invalid target role"))?;
        let registered = self.global(call.app, key).and_then(StateValue::as_bytes);
        if registered != Some(receiver.to_byte_array().as_slice()) {
            return Err(reject(format!("{receiver} is not the registered {target} account")));
        }
        let asset = self.require_coin(call)?;
        let amount = call.amount_arg()?;
        let available = self.holding(Address::for_app(call.app), asset).unwrap_or_default();
        if amount == 0 || amount > available {
            return Err(reject(format!("amount {amount} is outside of the range 1..={available}")));
        }
        self.inner_tx(call.app, InnerTx::AssetTransfer {
            asset,
            receiver,
            amount,
        })?;
        Ok(())
    }

    fn set_account(&mut self, call: &Call) -> Result<(), Rejection> {
        call.expect_shape(1, 2)?;
        let role = Role::from_account_label(&call.args[1])
            .ok_or_else(|| reject("account label must be either Holdings or Burn"))?;
        let account = call.first_account()?;
        let key = role.address_key().ok_or_else(|| reject("invalid account role"))?;
        self.set_global(call.app, key, StateValue::from(account))
    }

    fn app_opt_in(&mut self, call: &Call) -> Result<(), Rejection> {
        call.expect_shape(1, 1)?;
        let asset = self.require_coin(call)?;
        let app_addr = Address::for_app(call.app);
        if self.holding(app_addr, asset).is_some() {
            return Err(Rejection::AlreadyOptedIn(app_addr, asset));
        }
        self.inner_tx(call.app, InnerTx::AssetOptIn(asset))?;
        Ok(())
    }

    fn update_price(&mut self, call: &Call) -> Result<(), Rejection> {
        call.expect_shape(1, 2)?;
        let price = call.amount_arg()?;
        self.set_global(call.app, KEY_PRICE, StateValue::Uint(price))
    }

    fn sell_tokens(&mut self, call: &Call) -> Result<(), Rejection> {
        call.expect_shape(2, 2)?;
        if call.index != 1 {
            return Err(reject("sell call must follow the payment in the group"));
        }
        let app_addr = Address::for_app(call.app);
        let TxKind::Payment { receiver, amount: paid } = call.group[0].kind else {
            return Err(reject("first transaction of the group must be a payment"));
        };
        if receiver != app_addr {
            return Err(reject("payment must be made to the holdings account"));
        }
        let asset = self.require_coin(call)?;
        let amount = call.amount_arg()?;
        if amount == 0 || amount >= SELL_LIMIT {
            return Err(reject(format!("purchase amount {amount} is outside of the range 1..{SELL_LIMIT}")));
        }
        let price = self
            .global(call.app, KEY_PRICE)
            .and_then(StateValue::as_uint)
            .ok_or_else(|| reject("price is absent from the global state"))?;
        let expected = amount
            .checked_mul(price)
            .and_then(|v| v.checked_add(SELL_FEE))
            .ok_or_else(|| reject("purchase cost overflows"))?;
        if paid != expected {
            return Err(reject(format!("payment of {paid} does not match the price {expected}")));
        }
        let available = self.holding(app_addr, asset).unwrap_or_default();
        if amount > available {
            return Err(reject(format!("only {available} units are available for sale")));
        }
        self.inner_tx(call.app, InnerTx::AssetTransfer {
            asset,
            receiver: call.sender,
            amount,
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use asctx::{assign_group, AppCall, AppCreate, Intent, SignedTx, TxParams};

    use super::*;
    use crate::contract::MINT_TOTAL;
    use crate::ledger::{Ledger, TxStatus};
    use crate::signer::Signer;

    struct Env {
        sandbox: Sandbox,
        master: Address,
    }

    impl Env {
        fn new() -> Self {
            let mut sandbox = Sandbox::new("sandbox-v1");
            let master = sandbox.fund_account("master", 100_000_000);
            Env { sandbox, master }
        }

        fn params(&self) -> TxParams { self.sandbox.suggested_params().unwrap() }

        fn submit(&mut self, txs: Vec<Transaction>) -> Result<asctx::Txid, Rejection> {
            let txs = if txs.len() > 1 { assign_group(txs).unwrap().into_txs() } else { txs };
            let blobs = txs.iter().map(|tx| tx.to_unsigned()).collect::<Vec<_>>();
            let signed: Vec<SignedTx> = self.sandbox.keyring().sign(&blobs, None).unwrap();
            self.sandbox.submit(&signed).map_err(|e| e.reason)
        }

        fn create(&mut self, role: Role, assets: &[AssetId]) -> AppId {
            let mut create = AppCreate::new(self.master, role.program(), role.schema());
            for asset in assets {
                create = create.asset(*asset);
            }
            let tx = Intent::from(create).build(&self.params()).unwrap();
            let txid = self.submit(vec![tx]).unwrap();
            let TxStatus::Confirmed { created_app: Some(app), .. } = self.sandbox.tx_status(txid).unwrap() else {
                panic!("application was not created")
            };
            let fund = Intent::payment(self.master, Address::for_app(app), 1_000_000)
                .build(&self.params())
                .unwrap();
            self.submit(vec![fund]).unwrap();
            app
        }

        fn call(&mut self, call: AppCall) -> Result<asctx::Txid, Rejection> {
            let tx = Intent::from(call).build(&self.params()).unwrap();
            self.submit(vec![tx])
        }
    }

    fn minted(env: &mut Env) -> (AppId, AssetId) {
        let mint = env.create(Role::Mint, &[]);
        env.call(AppCall::new(env.master, mint).arg(METHOD_MINT)).unwrap();
        let asset = AssetId::from(env.sandbox.coin_id(mint).unwrap());
        (mint, asset)
    }

    #[test]
    fn mint_once() {
        let mut env = Env::new();
        let (mint, asset) = minted(&mut env);
        assert_eq!(env.sandbox.holding(Address::for_app(mint), asset), Some(MINT_TOTAL));
        let err = env.call(AppCall::new(env.master, mint).arg(METHOD_MINT)).unwrap_err();
        assert_eq!(err, reject("asset is already minted"));
    }

    #[test]
    fn creator_only() {
        let mut env = Env::new();
        let (mint, _) = minted(&mut env);
        let stranger = env.sandbox.fund_account("stranger", 10_000_000);
        let err = env.call(AppCall::new(stranger, mint).arg(METHOD_MINT)).unwrap_err();
        assert_eq!(err, Rejection::Unauthorized(stranger));
    }

    #[test]
    fn transfer_requires_registered_account() {
        let mut env = Env::new();
        let (mint, asset) = minted(&mut env);
        let holdings = env.create(Role::Holdings, &[asset]);
        let holdings_addr = Address::for_app(holdings);
        let call = AppCall::new(env.master, mint)
            .arg(METHOD_TRANSFER)
            .arg(1000u64)
            .account(holdings_addr)
            .asset(asset);
        assert!(matches!(env.call(call.clone()), Err(Rejection::LogicRejected(_))));

        env.call(
            AppCall::new(env.master, mint)
                .arg(METHOD_SET_ACCOUNT)
                .arg("Holdings")
                .account(holdings_addr),
        )
        .unwrap();
        assert_eq!(
            env.call(call.clone()),
            Err(Rejection::NotOptedIn(holdings_addr, asset))
        );

        env.call(AppCall::new(env.master, holdings).arg(METHOD_OPT_IN).asset(asset))
            .unwrap();
        env.call(call).unwrap();
        assert_eq!(env.sandbox.holding(holdings_addr, asset), Some(1000));
        assert_eq!(env.sandbox.holding(Address::for_app(mint), asset), Some(MINT_TOTAL - 1000));
    }

    #[test]
    fn schema_enforced() {
        let mut env = Env::new();
        let create = AppCreate::new(env.master, Role::Holdings.program(), asctx::StateSchema::new(1, 0))
            .asset(AssetId::from(1));
        let tx = Intent::from(create).build(&env.params()).unwrap();
        assert!(matches!(env.submit(vec![tx]), Err(Rejection::LogicRejected(_))));
    }

    #[test]
    fn unknown_method() {
        let mut env = Env::new();
        let (mint, _) = minted(&mut env);
        let err = env.call(AppCall::new(env.master, mint).arg("Steal")).unwrap_err();
        assert_eq!(err, reject("mint application has no method 'Steal'"));
    }
}
