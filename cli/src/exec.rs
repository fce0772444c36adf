// Command-line tool for asset smart contracts orchestration
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

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context};
use asc::txn::Address;
use asc::{
    CheckpointStore, Config, Deployment, FileCheckpoints, Keyring, Ledger, Role, Runtime, Sandbox,
    TokenSpec,
};

use crate::cmd::{Args, Cmd, DEFAULT_BUYER, DEFAULT_MASTER};

pub const LEDGER_FILE: &str = "ledger.yaml";
pub const CHECKPOINTS_FILE: &str = "checkpoints.yaml";
pub const CONFIG_FILE: &str = "config.yaml";

type CliRuntime = Runtime<Sandbox, Keyring, FileCheckpoints>;

impl Args {
    /// Expands `~` and environment variables in the data directory path.
    pub fn process(&mut self) {
        self.data_dir =
            PathBuf::from(shellexpand::tilde(&self.data_dir.display().to_string()).to_string());
    }

    pub fn network_dir(&self) -> PathBuf { self.data_dir.join(&self.network) }

    pub fn ledger_path(&self) -> PathBuf { self.network_dir().join(LEDGER_FILE) }

    pub fn checkpoints_path(&self) -> PathBuf { self.network_dir().join(CHECKPOINTS_FILE) }

    pub fn config_path(&self) -> PathBuf { self.data_dir.join(CONFIG_FILE) }

    pub fn config(&self) -> anyhow::Result<Config> {
        let path = self.config_path();
        Config::load(&path).with_context(|| format!("loading {}", path.display()))
    }

    fn load_sandbox(&self) -> anyhow::Result<Sandbox> {
        let path = self.ledger_path();
        if !path.exists() {
            bail!("network {} is not initialized; run `asc init` first", self.network);
        }
        Sandbox::load(&path).with_context(|| format!("loading ledger from {}", path.display()))
    }

    fn store_sandbox(&self, sandbox: &Sandbox) -> anyhow::Result<()> {
        let path = self.ledger_path();
        sandbox
            .store(&path)
            .with_context(|| format!("saving ledger to {}", path.display()))
    }

    fn runtime(&self) -> anyhow::Result<CliRuntime> {
        let sandbox = self.load_sandbox()?;
        let keyring = sandbox.keyring();
        let checkpoints = FileCheckpoints::load(self.checkpoints_path())
            .context("loading checkpoints")?;
        Ok(Runtime::new(sandbox, keyring, checkpoints, self.config()?))
    }

    /// Runs a workflow against the persisted ledger, saving the ledger even if the workflow fails.
    fn with_runtime<T>(
        &self,
        f: impl FnOnce(&mut CliRuntime) -> anyhow::Result<T>,
    ) -> anyhow::Result<T> {
        let mut runtime = self.runtime()?;
        let res = f(&mut runtime);
        let (sandbox, _, _) = runtime.into_parts();
        self.store_sandbox(&sandbox)?;
        res
    }

    pub fn exec(&self) -> anyhow::Result<()> {
        debug!("Executing command: {}", self.command);
        match &self.command {
            Cmd::Init { master_funds, buyer_funds } => {
                if self.ledger_path().exists() {
                    bail!("network {} is already initialized", self.network);
                }
                let config = self.config()?;
                fs::create_dir_all(self.network_dir())?;
                if !self.config_path().exists() {
                    write_yaml(&self.config_path(), &config)?;
                }
                let mut sandbox = Sandbox::new(&config.genesis_id);
                let master = sandbox.fund_account(DEFAULT_MASTER, *master_funds);
                let buyer = sandbox.fund_account(DEFAULT_BUYER, *buyer_funds);
                self.store_sandbox(&sandbox)?;
                println!("Network {} initialized in {}", self.network, self.network_dir().display());
                println!("{DEFAULT_MASTER}\t{master}");
                println!("{DEFAULT_BUYER}\t{buyer}");
            }

            Cmd::Accounts => {
                let sandbox = self.load_sandbox()?;
                for (name, address) in sandbox.account_names() {
                    let info = sandbox.account_info(address)?;
                    println!("{name:<12}\t{address}\t{:>16}", info.amount);
                }
            }

            Cmd::Fund { name, amount } => {
                let mut sandbox = self.load_sandbox()?;
                let address = sandbox.fund_account(name, *amount);
                self.store_sandbox(&sandbox)?;
                println!("{name}\t{address}\t+{amount}");
            }

            Cmd::DeployTokens { spec } => {
                let specs = match spec {
                    Some(path) => TokenSpec::load_all(path)
                        .with_context(|| format!("reading token list {}", path.display()))?,
                    None => vec![TokenSpec::default()],
                };
                self.with_runtime(|rt| {
                    let creator = self.resolve(rt, DEFAULT_MASTER)?;
                    for spec in &specs {
                        let asset = rt.deploy_token(creator, spec)?;
                        println!("{}\t{asset}", spec.name);
                    }
                    Ok(())
                })?;
            }

            Cmd::DistributeTokens { token, receiver, amount } => {
                self.with_runtime(|rt| {
                    let creator = self.resolve(rt, DEFAULT_MASTER)?;
                    let receiver = self.resolve(rt, receiver)?;
                    let confirmation = rt.distribute_token(creator, receiver, token, *amount)?;
                    println!("Distributed {amount} {token} to {receiver} in {}", confirmation.txid);
                    Ok(())
                })?;
            }

            Cmd::PurchaseNft { nft, coin, receiver, cost } => {
                self.with_runtime(|rt| {
                    let creator = self.resolve(rt, DEFAULT_MASTER)?;
                    let receiver = self.resolve(rt, receiver)?;
                    let nft_id = rt.checkpoints().asset_id(nft)?;
                    let coin_id = rt.checkpoints().asset_id(coin)?;
                    let confirmation = rt.purchase_nft(creator, receiver, nft_id, coin_id, *cost)?;
                    println!("NFT {nft} sold to {receiver} for {cost} {coin} in group {:?}", confirmation.group);
                    Ok(())
                })?;
            }

            Cmd::Mint => {
                self.with_runtime(|rt| {
                    let creator = self.resolve(rt, DEFAULT_MASTER)?;
                    let deployment = rt.deploy_all(creator)?;
                    print_deployment(&deployment);
                    Ok(())
                })?;
            }

            Cmd::Transfer { amount } => {
                self.with_runtime(|rt| {
                    let creator = self.resolve(rt, DEFAULT_MASTER)?;
                    let confirmation = rt.transfer(creator, *amount)?;
                    println!("Transferred {amount} units to holdings in {}", confirmation.txid);
                    Ok(())
                })?;
            }

            Cmd::Burn { amount } => {
                self.with_runtime(|rt| {
                    let creator = self.resolve(rt, DEFAULT_MASTER)?;
                    let confirmation = rt.burn(creator, *amount)?;
                    println!("Burned {amount} units in {}", confirmation.txid);
                    Ok(())
                })?;
            }

            Cmd::UpdatePrice { price } => {
                self.with_runtime(|rt| {
                    let creator = self.resolve(rt, DEFAULT_MASTER)?;
                    let confirmation = rt.update_price(creator, *price)?;
                    println!("Price set to {price} in {}", confirmation.txid);
                    Ok(())
                })?;
            }

            Cmd::Buy { account, amount } => {
                self.with_runtime(|rt| {
                    let buyer = self.resolve(rt, account)?;
                    let purchase = rt.buy(buyer, *amount)?;
                    if purchase.opted_in {
                        println!("Opted {account} in to the asset");
                    }
                    println!(
                        "Bought {} units at {} for {} in group {:?}",
                        purchase.amount, purchase.price, purchase.paid, purchase.confirmation.group
                    );
                    Ok(())
                })?;
            }

            Cmd::State => {
                let rt = self.runtime()?;
                let deployment = Deployment::load(rt.checkpoints())?;
                for (role, app) in [
                    (Role::Mint, deployment.mint_app),
                    (Role::Holdings, deployment.holdings_app),
                    (Role::Burn, deployment.burn_app),
                ] {
                    let info = rt.ledger().app_info(app)?;
                    println!("{role} app {app} ({}):", info.address);
                    for (key, value) in &info.global {
                        println!("  {key:<16}\t{value}");
                    }
                }
                let supply = rt.verifier().asset_supply_across(deployment.asset, deployment.holders())?;
                println!("Asset {} held by the applications: {supply}", deployment.asset);
            }

            Cmd::Balance { account } => {
                let rt = self.runtime()?;
                let address = self.resolve(&rt, account)?;
                let info = rt.ledger().account_info(address)?;
                println!("{address}");
                println!("  balance\t{} (minimum {})", info.amount, info.min_balance);
                for holding in &info.assets {
                    println!("  asset {}\t{}", holding.asset, holding.amount);
                }
            }

            Cmd::Checkpoints => {
                let checkpoints = FileCheckpoints::load(self.checkpoints_path())?;
                for (key, checkpoint) in checkpoints.entries() {
                    println!(
                        "{key:<16}\t{:<8}\t{}\tround {}\t{}",
                        checkpoint.value.kind(),
                        checkpoint.value,
                        checkpoint.round,
                        checkpoint.timestamp
                    );
                }
            }
        }
        Ok(())
    }

    /// Resolves an account given either by its name or by its address.
    fn resolve(&self, rt: &CliRuntime, account: &str) -> anyhow::Result<Address> {
        if let Some(address) = rt.ledger().named_address(account) {
            return Ok(address);
        }
        account
            .parse::<Address>()
            .map_err(|_| anyhow!("unknown account {account} on network {}", self.network))
    }
}

fn write_yaml(path: &Path, value: &impl serde::Serialize) -> anyhow::Result<()> {
    let file = fs::File::create(path)?;
    serde_yaml::to_writer(file, value)?;
    Ok(())
}

fn print_deployment(deployment: &Deployment) {
    println!("mint\tapp {}\t{}", deployment.mint_app, deployment.mint_addr);
    println!("holdings\tapp {}\t{}", deployment.holdings_app, deployment.holdings_addr);
    println!("burn\tapp {}\t{}", deployment.burn_app, deployment.burn_addr);
    println!("asset\t{}", deployment.asset);
}
