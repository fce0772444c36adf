use std::ops::{Deref, DerefMut};

use asc::contract::{sell_quote, Role, MINT_TOTAL};
use asc::txn::{Address, AssetId};
use asc::{
    CheckpointStore, CheckpointValue, Config, DeployStage, Deployment, Keyring, Ledger,
    MemCheckpoints, Purchase, Rejection, Runtime, Sandbox, WorkflowError,
};

use crate::utils::{Holder, BUYER_FUNDS, MASTER_FUNDS};

pub type SandboxRuntime = Runtime<Sandbox, Keyring, MemCheckpoints>;

pub struct TestRuntime {
    rt: SandboxRuntime,
    pub master: Address,
    pub buyer: Address,
}

impl Deref for TestRuntime {
    type Target = SandboxRuntime;
    fn deref(&self) -> &Self::Target { &self.rt }
}
impl DerefMut for TestRuntime {
    fn deref_mut(&mut self) -> &mut Self::Target { &mut self.rt }
}

impl TestRuntime {
    pub fn new() -> Self { Self::with(Config::default(), MASTER_FUNDS) }

    pub fn with(config: Config, master_funds: u64) -> Self {
        let mut sandbox = Sandbox::new(&config.genesis_id);
        let master = sandbox.fund_account("master", master_funds);
        let buyer = sandbox.fund_account("buyer", BUYER_FUNDS);
        let keyring = sandbox.keyring();
        let rt = Runtime::new(sandbox, keyring, MemCheckpoints::new(), config);
        Self { rt, master, buyer }
    }

    /// Runtime with all three applications deployed, funded, linked and opted in.
    pub fn deployed() -> Self {
        let mut me = Self::new();
        let master = me.master;
        me.deploy_all(master).unwrap();
        me
    }

    /// Moves the recorded deployment stage of an application back, leaving the ledger intact.
    pub fn rewind_stage(&mut self, role: Role, stage: DeployStage) {
        let key = role.stage_checkpoint();
        self.checkpoints_mut()
            .put(&key, CheckpointValue::Text(stage.to_string()), 0)
            .unwrap();
    }

    pub fn deployment(&self) -> Deployment { Deployment::load(self.checkpoints()).unwrap() }

    pub fn asset(&self) -> AssetId { self.deployment().asset }

    pub fn address_of(&self, holder: Holder) -> Address {
        let deployment = self.deployment();
        match holder {
            Holder::Mint => deployment.mint_addr,
            Holder::Holdings => deployment.holdings_addr,
            Holder::Burn => deployment.burn_addr,
            Holder::Master => self.master,
            Holder::Buyer => self.buyer,
        }
    }

    pub fn holding(&self, holder: Holder) -> Option<u64> {
        self.verifier()
            .holding(self.address_of(holder), self.asset())
            .unwrap()
    }

    pub fn balance(&self, account: Address) -> u64 { self.verifier().balance(account).unwrap() }

    pub fn round(&self) -> u64 { self.ledger().last_round().unwrap() }

    pub fn price(&self) -> u64 {
        self.verifier()
            .global_uint(self.deployment().holdings_app, "Price")
            .unwrap()
    }

    pub fn transfer_to_holdings(&mut self, amount: u64) {
        let master = self.master;
        self.transfer(master, amount).unwrap();
    }

    pub fn buy_as_buyer(&mut self, amount: u64) -> Purchase {
        let buyer = self.buyer;
        self.buy(buyer, amount).unwrap()
    }

    pub fn quote(&self, amount: u64) -> u64 { sell_quote(amount, self.price()).unwrap() }

    /// Asserts holdings of the minted asset by every known account.
    pub fn check_holdings(&self, expected: &[(Holder, Option<u64>)]) {
        for (holder, amount) in expected {
            assert_eq!(self.holding(*holder), *amount, "holding of {holder}");
        }
    }

    /// Asserts that the minted supply is fully accounted for across all holders.
    pub fn check_conservation(&self) {
        let holders = Holder::ALL.map(|holder| self.address_of(holder));
        let total = self
            .verifier()
            .asset_supply_across(self.asset(), holders)
            .unwrap();
        assert_eq!(total, MINT_TOTAL);
    }
}

/// Extracts the ledger rejection reason from a failed workflow.
pub fn rejection(err: WorkflowError) -> Rejection {
    match err {
        WorkflowError::Submission(err) => err.reason,
        other => panic!("ledger rejection expected, got {other}"),
    }
}
