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

use asctx::{AppId, AssetId, Group, GroupId, Txid};

use crate::ledger::{Ledger, LedgerError, SubmissionError, TxStatus};
use crate::signer::{Signer, SignerError};

#[derive(Clone, Eq, PartialEq, Debug, Display, Error, From)]
#[display(inner)]
pub enum SubmitError {
    #[from]
    Signer(SignerError),

    #[from]
    Submission(SubmissionError),

    #[from]
    Ledger(LedgerError),
}

/// Outcome of a committed group.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Confirmation {
    pub txid: Txid,
    pub txids: Vec<Txid>,
    pub group: Option<GroupId>,
    pub round: u64,
    pub created_app: Option<AppId>,
    pub created_asset: Option<AssetId>,
}

/// Drives a group through signing, submission and confirmation.
pub struct Submitter<'a, L: Ledger, S: Signer> {
    ledger: &'a mut L,
    signer: &'a mut S,
    confirm_rounds: u64,
}

impl<'a, L: Ledger, S: Signer> Submitter<'a, L, S> {
    pub fn new(ledger: &'a mut L, signer: &'a mut S, confirm_rounds: u64) -> Self {
        Self {
            ledger,
            signer,
            confirm_rounds,
        }
    }

    /// Signs the group, submits it and waits until the ledger commits it.
    ///
    /// The number of rounds to wait is bounded; the wait is the only point where the workflow may
    /// time out.
    pub fn send(
        &mut self,
        group: Group,
        description: Option<&str>,
    ) -> Result<Confirmation, SubmitError> {
        let group_id = group.txs().first().and_then(|tx| tx.group);
        let txids = group.txids();
        let blobs = group.txs().iter().map(|tx| tx.to_unsigned()).collect::<Vec<_>>();
        for tx in group.txs() {
            trace!("Submitting {tx}");
        }

        let signed = self.signer.sign(&blobs, description)?;
        if signed.len() != blobs.len() {
            return Err(SignerError::Mismatch {
                requested: blobs.len(),
                returned: signed.len(),
            }
            .into());
        }
        for (index, (blob, txid)) in signed.iter().zip(&txids).enumerate() {
            let matches = blob
                .decode()
                .map(|signed| signed.txn.txid() == *txid)
                .unwrap_or(false);
            if !matches {
                warn!("Signer returned transaction #{index} different from the requested one");
                return Err(SignerError::Mismatch {
                    requested: blobs.len(),
                    returned: signed.len(),
                }
                .into());
            }
        }

        let txid = self.ledger.submit(&signed)?;
        debug!(
            "Submitted group of {} transaction(s) {}, waiting for confirmation",
            txids.len(),
            group_id.map(|id| id.to_string()).unwrap_or_else(|| txid.to_string())
        );
        let round = self.wait_confirmation(txid)?;

        let mut created_app = None;
        let mut created_asset = None;
        for id in &txids {
            if let TxStatus::Confirmed {
                created_app: app,
                created_asset: asset,
                ..
            } = self.ledger.tx_status(*id)?
            {
                created_app = created_app.or(app);
                created_asset = created_asset.or(asset);
            }
        }

        Ok(Confirmation {
            txid,
            txids,
            group: group_id,
            round,
            created_app,
            created_asset,
        })
    }

    fn wait_confirmation(&mut self, txid: Txid) -> Result<u64, LedgerError> {
        let start = self.ledger.last_round()?;
        let mut round = start;
        loop {
            match self.ledger.tx_status(txid)? {
                TxStatus::Confirmed { round, .. } => {
                    debug!("Transaction {txid} confirmed in round {round}");
                    return Ok(round);
                }
                TxStatus::Pending | TxStatus::Unknown if round - start >= self.confirm_rounds => {
                    return Err(LedgerError::ConfirmationTimeout {
                        txid,
                        rounds: self.confirm_rounds,
                    });
                }
                TxStatus::Pending | TxStatus::Unknown => {
                    round = self.ledger.wait_for_round(round + 1)?.max(round + 1);
                }
            }
        }
    }
}
