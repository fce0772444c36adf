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

use std::path::PathBuf;

use asc::{DEFAULT_BURN, DEFAULT_DISTRIBUTION, DEFAULT_PRICE, DEFAULT_TOKEN, DEFAULT_TRANSFER, NFT_COST};
use clap::ValueHint;

pub const ASC_DATA_DIR_ENV: &str = "ASC_DATA_DIR";
pub const ASC_NETWORK_ENV: &str = "ASC_NETWORK";

#[cfg(any(target_os = "linux", target_os = "freebsd", target_os = "openbsd", target_os = "netbsd"))]
pub const ASC_DATA_DIR: &str = "~/.asc";
#[cfg(target_os = "macos")]
pub const ASC_DATA_DIR: &str = "~/Library/Application Support/Asset Smart Contracts";
#[cfg(target_os = "windows")]
pub const ASC_DATA_DIR: &str = "~\\AppData\\Local\\Asset Smart Contracts";
#[cfg(target_os = "ios")]
pub const ASC_DATA_DIR: &str = "~/Documents";
#[cfg(target_os = "android")]
pub const ASC_DATA_DIR: &str = ".";

pub const DEFAULT_MASTER: &str = "master";
pub const DEFAULT_BUYER: &str = "buyer";

#[derive(Parser)]
#[derive(Clone, Eq, PartialEq, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Set verbosity level
    ///
    /// Can be used multiple times to increase verbosity.
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Location of the data directory
    #[clap(
        short,
        long,
        global = true,
        default_value = ASC_DATA_DIR,
        env = ASC_DATA_DIR_ENV,
        value_hint = ValueHint::DirPath
    )]
    pub data_dir: PathBuf,

    /// Name of the local network to use
    #[clap(short, long, global = true, default_value = "devnet", env = ASC_NETWORK_ENV)]
    pub network: String,

    /// Command to execute
    #[clap(subcommand)]
    pub command: Cmd,
}

#[derive(Subcommand, Clone, Eq, PartialEq, Debug, Display)]
#[display(lowercase)]
pub enum Cmd {
    /// Initialize a local network with funded master and buyer accounts
    Init {
        /// Initial funds of the master account, in micro-units
        #[clap(long, default_value = "1000000000")]
        master_funds: u64,

        /// Initial funds of the buyer account, in micro-units
        #[clap(long, default_value = "1000000000")]
        buyer_funds: u64,
    },

    /// List named accounts of the network with their balances
    Accounts,

    /// Dispense funds to a named account, creating it if necessary
    Fund {
        /// Account name
        name: String,

        /// Amount to dispense, in micro-units
        amount: u64,
    },

    /// Deploy standalone tokens
    #[display("deploy-tokens")]
    DeployTokens {
        /// YAML file with a list of token definitions
        #[clap(value_hint = ValueHint::FilePath)]
        spec: Option<PathBuf>,
    },

    /// Opt an account in to a deployed token and send it some units
    DistributeTokens {
        /// Token name under which it was deployed
        #[clap(short, long, default_value = DEFAULT_TOKEN)]
        token: String,

        /// Receiving account name or address
        #[clap(short, long, default_value = DEFAULT_BUYER)]
        receiver: String,

        /// Number of units to send
        #[clap(default_value_t = DEFAULT_DISTRIBUTION)]
        amount: u64,
    },

    /// Swap a single NFT for units of a fungible token in one atomic group
    PurchaseNft {
        /// Token name of the NFT
        nft: String,

        /// Token name of the fungible token used for the payment
        #[clap(short, long, default_value = DEFAULT_TOKEN)]
        coin: String,

        /// Receiving account name or address
        #[clap(short, long, default_value = DEFAULT_BUYER)]
        receiver: String,

        /// Price of the NFT in units of the fungible token
        #[clap(long, default_value_t = NFT_COST)]
        cost: u64,
    },

    /// Deploy, fund and link the mint, holdings and burn applications and mint the asset
    Mint,

    /// Transfer minted units to the holdings account
    Transfer {
        #[clap(default_value_t = DEFAULT_TRANSFER)]
        amount: u64,
    },

    /// Move minted units to the burn account
    Burn {
        #[clap(default_value_t = DEFAULT_BURN)]
        amount: u64,
    },

    /// Update the price of a single unit in the holdings application
    UpdatePrice {
        #[clap(default_value_t = DEFAULT_PRICE)]
        price: u64,
    },

    /// Buy units of the asset from the holdings application
    Buy {
        /// Buying account name or address
        #[clap(short, long, default_value = DEFAULT_BUYER)]
        account: String,

        /// Number of units to buy
        amount: u64,
    },

    /// Print global state of the deployed applications
    State,

    /// Print balance and asset holdings of an account
    Balance {
        /// Account name or address
        #[clap(default_value = DEFAULT_MASTER)]
        account: String,
    },

    /// List recorded checkpoints
    Checkpoints,
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::*;

    #[test]
    fn command_definition() { Args::command().debug_assert(); }

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["asc", "buy", "23"]).unwrap();
        assert_eq!(args.network, "devnet");
        assert_eq!(args.verbose, 0);
        assert_eq!(args.command, Cmd::Buy {
            account: DEFAULT_BUYER.to_string(),
            amount: 23
        });

        let args = Args::try_parse_from(["asc", "-vv", "update-price"]).unwrap();
        assert_eq!(args.verbose, 2);
        assert_eq!(args.command, Cmd::UpdatePrice { price: DEFAULT_PRICE });
    }
}
