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

use asctx::{GroupError, IntentError};

use crate::checkpoint::CheckpointError;
use crate::ledger::{LedgerError, SubmissionError};
use crate::signer::SignerError;
use crate::submit::SubmitError;
use crate::verify::VerifyError;

/// Failure of a workflow step; the workflow halts at the first one without rollback.
#[derive(Debug, Display, Error, From)]
#[display(inner)]
pub enum WorkflowError {
    #[from]
    Intent(IntentError),

    #[from]
    Group(GroupError),

    #[from]
    Signer(SignerError),

    #[from]
    Submission(SubmissionError),

    #[from]
    Ledger(LedgerError),

    #[from]
    Verify(VerifyError),

    #[from]
    Checkpoint(CheckpointError),

    #[display("checkpoint '{key}' contains unknown stage '{stage}'")]
    UnknownStage { key: String, stage: String },

    #[display("ledger didn't report {0} created by a confirmed transaction")]
    NotCreated(&'static str),
}

impl From<SubmitError> for WorkflowError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Signer(e) => WorkflowError::Signer(e),
            SubmitError::Submission(e) => WorkflowError::Submission(e),
            SubmitError::Ledger(e) => WorkflowError::Ledger(e),
        }
    }
}

impl WorkflowError {
    /// Returns the ledger rejection, if the workflow failed because of one.
    pub fn submission(&self) -> Option<&SubmissionError> {
        match self {
            WorkflowError::Submission(err) => Some(err),
            _ => None,
        }
    }
}
