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

use std::str::FromStr;

use asctx::{Address, AppCall, AppCreate, AppId, AssetId, Intent};

use super::Runtime;
use crate::checkpoint::{CheckpointStore, CheckpointValue};
use crate::contract::{Role, KEY_COIN_ID, METHOD_MINT, METHOD_OPT_IN, METHOD_SET_ACCOUNT};
use crate::ledger::{Ledger, StateValue};
use crate::signer::Signer;
use crate::WorkflowError;

pub const ASSET_CHECKPOINT: &str = "assetID";

/// Progress of an application through its deployment.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Display)]
#[display(lowercase)]
pub enum DeployStage {
    #[default]
    Undeployed,
    Deployed,
    Funded,
    /// Mint: asset minted; holdings and burn: account registered in the mint application.
    Linked,
    OptedIn,
}

impl FromStr for DeployStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "undeployed" => Ok(DeployStage::Undeployed),
            "deployed" => Ok(DeployStage::Deployed),
            "funded" => Ok(DeployStage::Funded),
            "linked" => Ok(DeployStage::Linked),
            "optedin" => Ok(DeployStage::OptedIn),
            other => Err(other.to_owned()),
        }
    }
}

impl DeployStage {
    /// Final stage of the deployment for the given role.
    pub fn complete(role: Role) -> Self {
        match role {
            Role::Mint => DeployStage::Linked,
            Role::Holdings | Role::Burn => DeployStage::OptedIn,
        }
    }
}

/// Identifiers of the deployed applications and the minted asset.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Deployment {
    pub mint_app: AppId,
    pub mint_addr: Address,
    pub asset: AssetId,
    pub holdings_app: AppId,
    pub holdings_addr: Address,
    pub burn_app: AppId,
    pub burn_addr: Address,
}

impl Deployment {
    pub fn load(checkpoints: &impl CheckpointStore) -> Result<Self, WorkflowError> {
        Ok(Deployment {
            mint_app: checkpoints.app_id(&Role::Mint.app_checkpoint())?,
            mint_addr: checkpoints.address(&Role::Mint.addr_checkpoint())?,
            asset: checkpoints.asset_id(ASSET_CHECKPOINT)?,
            holdings_app: checkpoints.app_id(&Role::Holdings.app_checkpoint())?,
            holdings_addr: checkpoints.address(&Role::Holdings.addr_checkpoint())?,
            burn_app: checkpoints.app_id(&Role::Burn.app_checkpoint())?,
            burn_addr: checkpoints.address(&Role::Burn.addr_checkpoint())?,
        })
    }

    pub fn holders(&self) -> [Address; 3] { [self.mint_addr, self.holdings_addr, self.burn_addr] }
}

impl<L: Ledger, S: Signer, C: CheckpointStore> Runtime<L, S, C> {
    pub fn stage(&self, role: Role) -> Result<DeployStage, WorkflowError> {
        let key = role.stage_checkpoint();
        match self.checkpoints.text(&key)? {
            None => Ok(DeployStage::Undeployed),
            Some(stage) => DeployStage::from_str(stage)
                .map_err(|stage| WorkflowError::UnknownStage { key, stage }),
        }
    }

    fn advance(&mut self, role: Role, stage: DeployStage, round: u64) -> Result<(), WorkflowError> {
        info!("{role} application reached stage {stage}");
        self.record(&role.stage_checkpoint(), CheckpointValue::Text(stage.to_string()), round)
    }

    /// Deploys the mint, holdings and burn applications, mints the asset and wires the
    /// applications together.
    pub fn deploy_all(&mut self, creator: Address) -> Result<Deployment, WorkflowError> {
        for role in Role::ALL {
            self.deploy(role, creator)?;
        }
        Deployment::load(&self.checkpoints)
    }

    /// Runs the deployment of a single application, skipping already completed stages.
    pub fn deploy(&mut self, role: Role, creator: Address) -> Result<DeployStage, WorkflowError> {
        let complete = DeployStage::complete(role);
        let mut stage = self.stage(role)?;
        if stage >= complete {
            warn!("{role} application is already deployed, skipping");
            return Ok(stage);
        }
        if stage > DeployStage::Undeployed {
            warn!("{role} application is at stage {stage}, resuming deployment");
        }
        while stage < complete {
            stage = match stage {
                DeployStage::Undeployed => self.create_app(role, creator)?,
                DeployStage::Deployed => self.fund_app(role, creator)?,
                DeployStage::Funded if role == Role::Mint => self.mint(creator)?,
                DeployStage::Funded => self.link(role, creator)?,
                DeployStage::Linked => self.opt_in_app(role, creator)?,
                DeployStage::OptedIn => break,
            };
        }
        Ok(stage)
    }

    fn create_app(&mut self, role: Role, creator: Address) -> Result<DeployStage, WorkflowError> {
        let mut create = AppCreate::new(creator, role.program(), role.schema());
        if role != Role::Mint {
            create = create.asset(self.checkpoints.asset_id(ASSET_CHECKPOINT)?);
        }
        let confirmation = self.send(vec![create.into()], &format!("deploy {role} application"))?;
        let app = confirmation
            .created_app
            .ok_or(WorkflowError::NotCreated("application"))?;
        let addr = self.ledger.app_info(app)?.address;
        let round = confirmation.round;
        self.record(&role.app_checkpoint(), CheckpointValue::App(app), round)?;
        self.record(&role.addr_checkpoint(), CheckpointValue::Address(addr), round)?;
        self.advance(role, DeployStage::Deployed, round)?;
        Ok(DeployStage::Deployed)
    }

    fn fund_app(&mut self, role: Role, creator: Address) -> Result<DeployStage, WorkflowError> {
        let addr = self.checkpoints.address(&role.addr_checkpoint())?;
        let payment = Intent::payment(creator, addr, self.config.app_funding);
        let confirmation = self.send(vec![payment], &format!("fund {role} application"))?;
        self.advance(role, DeployStage::Funded, confirmation.round)?;
        Ok(DeployStage::Funded)
    }

    fn mint(&mut self, creator: Address) -> Result<DeployStage, WorkflowError> {
        let app = self.checkpoints.app_id(&Role::Mint.app_checkpoint())?;
        let minted = self.verifier().global_uint(app, KEY_COIN_ID)?;
        let round = if minted != 0 {
            warn!("Asset {minted} is already minted by application {app}, skipping");
            self.ledger.last_round()?
        } else {
            let call = AppCall::new(creator, app).arg(METHOD_MINT);
            self.send(vec![call.into()], "mint asset")?.round
        };
        let asset = AssetId::from(self.verifier().global_uint(app, KEY_COIN_ID)?);
        if asset.to_u64() == 0 {
            return Err(WorkflowError::NotCreated("asset"));
        }
        self.record(ASSET_CHECKPOINT, CheckpointValue::Asset(asset), round)?;
        self.advance(Role::Mint, DeployStage::Linked, round)?;
        Ok(DeployStage::Linked)
    }

    fn link(&mut self, role: Role, creator: Address) -> Result<DeployStage, WorkflowError> {
        let mint = self.checkpoints.app_id(&Role::Mint.app_checkpoint())?;
        let addr = self.checkpoints.address(&role.addr_checkpoint())?;
        let (Some(label), Some(key)) = (role.account_label(), role.address_key()) else {
            return Err(WorkflowError::UnknownStage {
                key: role.stage_checkpoint(),
                stage: DeployStage::Funded.to_string(),
            });
        };
        let round = if self.verifier().global(mint, key)? == Some(StateValue::from(addr)) {
            warn!("{role} account {addr} is already registered in the mint application, skipping");
            self.ledger.last_round()?
        } else {
            let call = AppCall::new(creator, mint)
                .arg(METHOD_SET_ACCOUNT)
                .arg(label)
                .account(addr);
            self.send(vec![call.into()], &format!("register {role} account"))?.round
        };
        self.advance(role, DeployStage::Linked, round)?;
        Ok(DeployStage::Linked)
    }

    fn opt_in_app(&mut self, role: Role, creator: Address) -> Result<DeployStage, WorkflowError> {
        let app = self.checkpoints.app_id(&role.app_checkpoint())?;
        let addr = self.checkpoints.address(&role.addr_checkpoint())?;
        let asset = self.checkpoints.asset_id(ASSET_CHECKPOINT)?;
        let round = if self.verifier().holding(addr, asset)?.is_some() {
            warn!("{role} application is already opted in to asset {asset}, skipping");
            self.ledger.last_round()?
        } else {
            let call = AppCall::new(creator, app).arg(METHOD_OPT_IN).asset(asset);
            self.send(vec![call.into()], &format!("opt {role} application in"))?.round
        };
        self.advance(role, DeployStage::OptedIn, round)?;
        Ok(DeployStage::OptedIn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_names() {
        for stage in [
            DeployStage::Undeployed,
            DeployStage::Deployed,
            DeployStage::Funded,
            DeployStage::Linked,
            DeployStage::OptedIn,
        ] {
            assert_eq!(DeployStage::from_str(&stage.to_string()), Ok(stage));
        }
        assert!(DeployStage::Funded < DeployStage::Linked);
        assert_eq!(DeployStage::complete(Role::Mint), DeployStage::Linked);
        assert_eq!(DeployStage::complete(Role::Burn), DeployStage::OptedIn);
    }
}
