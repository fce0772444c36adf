mod utils;

use asc::contract::{MINT_TOTAL, METHOD_MINT, METHOD_OPT_IN, METHOD_SELL, METHOD_TRANSFER};
use asc::txn::{
    assign_group, AppCall, GroupError, Intent, IntentError, SignedTx, Txid, TxParams, UnsignedTx,
};
use asc::{
    AccountInfo, AppInfo, AssetInfo, CheckpointStore, Config, Keyring, Ledger, LedgerError,
    MemCheckpoints, RejectingSigner, Rejection, Runtime, Sandbox, Signer, SignerError,
    SubmissionError, TxStatus, WorkflowError,
};
use rstest::rstest;

use crate::utils::runtime::{rejection, TestRuntime};
use crate::utils::{Holder, MASTER_FUNDS};

#[test]
fn second_opt_in_rejected() {
    let mut rt = TestRuntime::deployed();
    let (buyer, asset) = (rt.buyer, rt.asset());
    rt.send(vec![Intent::opt_in(buyer, asset)], "opt in").unwrap();
    let err = rt
        .send(vec![Intent::opt_in(buyer, asset)], "opt in again")
        .unwrap_err();
    assert_eq!(rejection(err), Rejection::AlreadyOptedIn(buyer, asset));
}

#[test]
fn second_app_opt_in_rejected() {
    let mut rt = TestRuntime::deployed();
    let master = rt.master;
    let deployment = rt.deployment();
    let call = AppCall::new(master, deployment.holdings_app)
        .arg(METHOD_OPT_IN)
        .asset(deployment.asset);
    let err = rt.send(vec![call.into()], "opt in again").unwrap_err();
    assert_eq!(
        rejection(err),
        Rejection::AlreadyOptedIn(deployment.holdings_addr, deployment.asset)
    );
}

#[test]
fn double_mint_rejected() {
    let mut rt = TestRuntime::deployed();
    let master = rt.master;
    let call = AppCall::new(master, rt.deployment().mint_app).arg(METHOD_MINT);
    let err = rt.send(vec![call.into()], "mint again").unwrap_err();
    assert!(matches!(rejection(err), Rejection::LogicRejected(_)));
    rt.check_conservation();
}

#[rstest]
#[case(1)]
#[case(23)]
#[case(999)]
fn ungrouped_sell_rejected(#[case] amount: u64) {
    let mut rt = TestRuntime::deployed();
    rt.transfer_to_holdings(1000);
    let (buyer, asset) = (rt.buyer, rt.asset());
    rt.send(vec![Intent::opt_in(buyer, asset)], "opt in").unwrap();

    let call = AppCall::new(buyer, rt.deployment().holdings_app)
        .arg(METHOD_SELL)
        .arg(amount)
        .asset(asset);
    let err = rt.send(vec![call.into()], "sell without payment").unwrap_err();
    assert!(matches!(rejection(err), Rejection::LogicRejected(_)));
    rt.check_holdings(&[(Holder::Buyer, Some(0)), (Holder::Holdings, Some(1000))]);
}

#[test]
fn reordered_sell_group_rejected() {
    let mut rt = TestRuntime::deployed();
    rt.transfer_to_holdings(1000);
    let (buyer, asset) = (rt.buyer, rt.asset());
    rt.send(vec![Intent::opt_in(buyer, asset)], "opt in").unwrap();
    let deployment = rt.deployment();
    let payment = rt.quote(10);
    let call = AppCall::new(buyer, deployment.holdings_app)
        .arg(METHOD_SELL)
        .arg(10u64)
        .asset(asset);
    let pay = Intent::payment(buyer, deployment.holdings_addr, payment);
    let err = rt.send(vec![call.into(), pay], "call before payment").unwrap_err();
    assert!(matches!(rejection(err), Rejection::LogicRejected(_)));
}

#[rstest]
#[case(0)]
#[case(1000)]
#[case(5000)]
fn purchase_amount_refused_locally(#[case] amount: u64) {
    let mut rt = TestRuntime::deployed();
    rt.transfer_to_holdings(1000);
    let round = rt.round();
    let buyer = rt.buyer;
    let err = rt.buy(buyer, amount).unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::Intent(IntentError::AmountOutOfRange { max: 1000, .. })
    ));
    assert_eq!(rt.round(), round);
    rt.check_holdings(&[(Holder::Buyer, None)]);
}

#[test]
fn zero_purchase_rejected_by_ledger() {
    let mut rt = TestRuntime::deployed();
    rt.transfer_to_holdings(1000);
    let (buyer, asset) = (rt.buyer, rt.asset());
    rt.send(vec![Intent::opt_in(buyer, asset)], "opt in").unwrap();
    let payment = rt.quote(0);
    let err = rt.sell_group(buyer, 0, payment).unwrap_err();
    assert!(matches!(rejection(err), Rejection::LogicRejected(_)));
}

#[rstest]
#[case(10, 0)]
#[case(10, 1)]
#[case(10, 1000)]
fn underpayment_rejected(#[case] amount: u64, #[case] shortfall: u64) {
    let mut rt = TestRuntime::deployed();
    rt.transfer_to_holdings(1000);
    let (buyer, asset) = (rt.buyer, rt.asset());
    rt.send(vec![Intent::opt_in(buyer, asset)], "opt in").unwrap();

    let quote = rt.quote(amount);
    // the quote includes the flat fee, so any payment below it must fail
    let err = rt
        .sell_group(buyer, amount, quote - shortfall - 1)
        .unwrap_err();
    assert!(matches!(rejection(err), Rejection::LogicRejected(_)));
    rt.check_holdings(&[(Holder::Buyer, Some(0)), (Holder::Holdings, Some(1000))]);

    rt.sell_group(buyer, amount, quote).unwrap();
    rt.check_holdings(&[(Holder::Buyer, Some(amount)), (Holder::Holdings, Some(1000 - amount))]);
}

#[test]
fn purchase_above_stock_rejected() {
    let mut rt = TestRuntime::deployed();
    rt.transfer_to_holdings(10);
    let buyer = rt.buyer;
    let err = rt.buy(buyer, 11).unwrap_err();
    assert!(matches!(rejection(err), Rejection::LogicRejected(_)));
    // opt-in happened before the failed group and is not rolled back
    rt.check_holdings(&[(Holder::Buyer, Some(0)), (Holder::Holdings, Some(10))]);
}

#[test]
fn transfer_above_supply_rejected() {
    let mut rt = TestRuntime::deployed();
    let master = rt.master;
    let err = rt.transfer(master, MINT_TOTAL + 1).unwrap_err();
    assert!(matches!(rejection(err), Rejection::LogicRejected(_)));
    let err = rt.transfer(master, 0).unwrap_err();
    assert!(matches!(rejection(err), Rejection::LogicRejected(_)));

    rt.transfer(master, MINT_TOTAL).unwrap();
    rt.check_holdings(&[(Holder::Mint, Some(0)), (Holder::Holdings, Some(MINT_TOTAL))]);
    let err = rt.burn(master, 1).unwrap_err();
    assert!(matches!(rejection(err), Rejection::LogicRejected(_)));
}

#[test]
fn burn_of_exact_supply() {
    let mut rt = TestRuntime::deployed();
    let master = rt.master;
    let err = rt.burn(master, MINT_TOTAL + 1).unwrap_err();
    assert!(matches!(rejection(err), Rejection::LogicRejected(_)));
    rt.burn(master, MINT_TOTAL).unwrap();
    rt.check_holdings(&[(Holder::Mint, Some(0)), (Holder::Burn, Some(MINT_TOTAL))]);
    rt.check_conservation();
}

#[test]
fn non_creator_rejected() {
    let mut rt = TestRuntime::deployed();
    let buyer = rt.buyer;
    let err = rt.transfer(buyer, 10).unwrap_err();
    assert_eq!(rejection(err), Rejection::Unauthorized(buyer));
    let err = rt.burn(buyer, 10).unwrap_err();
    assert_eq!(rejection(err), Rejection::Unauthorized(buyer));
    let err = rt.update_price(buyer, 1).unwrap_err();
    assert_eq!(rejection(err), Rejection::Unauthorized(buyer));
    let call = AppCall::new(buyer, rt.deployment().mint_app).arg(METHOD_MINT);
    let err = rt.send(vec![call.into()], "mint by stranger").unwrap_err();
    assert_eq!(rejection(err), Rejection::Unauthorized(buyer));
}

#[test]
fn transfer_to_unregistered_account_rejected() {
    let mut rt = TestRuntime::deployed();
    let master = rt.master;
    let deployment = rt.deployment();
    for receiver in [deployment.burn_addr, rt.buyer] {
        let call = AppCall::new(master, deployment.mint_app)
            .arg(METHOD_TRANSFER)
            .arg(10u64)
            .account(receiver)
            .asset(deployment.asset);
        let err = rt.send(vec![call.into()], "transfer elsewhere").unwrap_err();
        assert!(matches!(rejection(err), Rejection::LogicRejected(_)));
    }
    rt.check_holdings(&[(Holder::Mint, Some(MINT_TOTAL)), (Holder::Burn, Some(0))]);
}

#[test]
fn regrouping_rejected() {
    let rt = TestRuntime::new();
    let params = rt.params().unwrap();
    let txs = vec![
        Intent::payment(rt.master, rt.buyer, 1).build(&params).unwrap(),
        Intent::payment(rt.buyer, rt.master, 1).build(&params).unwrap(),
    ];
    let group = assign_group(txs).unwrap();
    let first = group.txs()[0].txid();
    assert_eq!(assign_group(group.into_txs()), Err(GroupError::AlreadyGrouped(first)));
}

#[test]
fn signer_rejection_halts_before_submission() {
    let mut sandbox = Sandbox::new("sandbox-v1");
    let master = sandbox.fund_account("master", MASTER_FUNDS);
    let mut rt = Runtime::new(sandbox, RejectingSigner, MemCheckpoints::new(), Config::default());
    let err = rt.deploy_all(master).unwrap_err();
    assert!(matches!(err, WorkflowError::Signer(SignerError::UserRejected)));
    assert_eq!(rt.ledger().last_round().unwrap(), 0);
    assert!(rt.checkpoints().entries().is_empty());
    assert_eq!(rt.ledger().account_info(master).unwrap().amount, MASTER_FUNDS);
}

/// Signer dropping the last transaction of every request.
struct TruncatingSigner(Keyring);

impl Signer for TruncatingSigner {
    fn sign(
        &mut self,
        txs: &[UnsignedTx],
        description: Option<&str>,
    ) -> Result<Vec<SignedTx>, SignerError> {
        let mut signed = self.0.sign(txs, description)?;
        signed.pop();
        Ok(signed)
    }
}

#[test]
fn signer_mismatch_detected() {
    let mut sandbox = Sandbox::new("sandbox-v1");
    let master = sandbox.fund_account("master", MASTER_FUNDS);
    let signer = TruncatingSigner(sandbox.keyring());
    let mut rt = Runtime::new(sandbox, signer, MemCheckpoints::new(), Config::default());
    let err = rt.deploy_all(master).unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::Signer(SignerError::Mismatch {
            requested: 1,
            returned: 0
        })
    ));
}

/// Ledger accepting transactions which never get confirmed.
struct StalledLedger(Sandbox);

impl Ledger for StalledLedger {
    fn suggested_params(&self) -> Result<TxParams, LedgerError> { self.0.suggested_params() }
    fn last_round(&self) -> Result<u64, LedgerError> { self.0.last_round() }
    fn wait_for_round(&mut self, round: u64) -> Result<u64, LedgerError> {
        self.0.wait_for_round(round)
    }
    fn account_info(&self, address: asc::txn::Address) -> Result<AccountInfo, LedgerError> {
        self.0.account_info(address)
    }
    fn app_info(&self, app: asc::txn::AppId) -> Result<AppInfo, LedgerError> {
        self.0.app_info(app)
    }
    fn asset_info(&self, asset: asc::txn::AssetId) -> Result<AssetInfo, LedgerError> {
        self.0.asset_info(asset)
    }
    fn submit(&mut self, txs: &[SignedTx]) -> Result<Txid, SubmissionError> {
        let first = txs[0].decode().expect("valid encoding");
        Ok(first.txn.txid())
    }
    fn tx_status(&self, _: Txid) -> Result<TxStatus, LedgerError> { Ok(TxStatus::Pending) }
}

#[test]
fn confirmation_timeout() {
    let mut sandbox = Sandbox::new("sandbox-v1");
    let master = sandbox.fund_account("master", MASTER_FUNDS);
    let keyring = sandbox.keyring();
    let config = Config {
        confirm_rounds: 3,
        ..Config::default()
    };
    let mut rt = Runtime::new(StalledLedger(sandbox), keyring, MemCheckpoints::new(), config);
    let err = rt.deploy_all(master).unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::Ledger(LedgerError::ConfirmationTimeout { rounds: 3, .. })
    ));
    assert_eq!(rt.ledger().last_round().unwrap(), 3);
    assert!(rt.checkpoints().entries().is_empty());
}
