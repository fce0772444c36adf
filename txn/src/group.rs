// Transaction construction library for asset smart contracts
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

use crate::{tagged_hash, GroupId, Transaction, Txid, MAX_GROUP_SIZE};

#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum GroupError {
    /// transaction {0} already belongs to an atomic group.
    AlreadyGrouped(Txid),

    /// atomic group must contain at least one transaction.
    Empty,

    /// atomic group contains {0} transactions, while at most 16 are allowed.
    TooLarge(usize),

    /// transaction #{0} does not carry the identifier of its atomic group.
    Mismatch(usize),
}

/// Ordered list of transactions sharing a single group identifier.
#[derive(Getters, Clone, Eq, PartialEq, Debug)]
pub struct Group {
    #[getter(as_copy)]
    id: GroupId,
    txs: Vec<Transaction>,
}

/// Computes group identifier committing to the ordered list of transaction ids.
pub fn group_id<'a>(txids: impl IntoIterator<Item = &'a Txid>) -> GroupId {
    let txids = txids.into_iter().map(Txid::to_byte_array).collect::<Vec<_>>();
    GroupId::from_byte_array(tagged_hash(b"TG", txids.iter().map(<[u8; 32]>::as_slice)))
}

/// Assigns a common group identifier to an ordered list of unsigned transactions.
///
/// The group id is computed over the ids of the transactions before they get annotated, so the
/// ledger can re-derive it by clearing the group field of each member.
pub fn assign_group(txs: Vec<Transaction>) -> Result<Group, GroupError> {
    if txs.is_empty() {
        return Err(GroupError::Empty);
    }
    if txs.len() > MAX_GROUP_SIZE {
        return Err(GroupError::TooLarge(txs.len()));
    }
    if let Some(tx) = txs.iter().find(|tx| tx.group.is_some()) {
        return Err(GroupError::AlreadyGrouped(tx.txid()));
    }
    let txids = txs.iter().map(Transaction::txid).collect::<Vec<_>>();
    let id = group_id(&txids);
    let txs = txs
        .into_iter()
        .map(|mut tx| {
            tx.group = Some(id);
            tx
        })
        .collect();
    Ok(Group { id, txs })
}

impl Group {
    /// Wraps a single transaction which is submitted without a group id.
    pub fn single(tx: Transaction) -> Result<Self, GroupError> {
        let mut group = assign_group(vec![tx])?;
        group.txs[0].group = None;
        Ok(group)
    }

    /// Validates that the list of transactions forms a correctly constructed atomic group.
    ///
    /// A single transaction without group id is a valid singleton.
    pub fn verify(txs: &[Transaction]) -> Result<Option<GroupId>, GroupError> {
        match txs {
            [] => return Err(GroupError::Empty),
            [tx] if tx.group.is_none() => return Ok(None),
            _ if txs.len() > MAX_GROUP_SIZE => return Err(GroupError::TooLarge(txs.len())),
            _ => {}
        }
        let txids = txs
            .iter()
            .map(|tx| {
                let mut tx = tx.clone();
                tx.group = None;
                tx.txid()
            })
            .collect::<Vec<_>>();
        let id = group_id(&txids);
        if let Some(pos) = txs.iter().position(|tx| tx.group != Some(id)) {
            return Err(GroupError::Mismatch(pos));
        }
        Ok(Some(id))
    }

    pub fn len(&self) -> usize { self.txs.len() }

    pub fn is_empty(&self) -> bool { self.txs.is_empty() }

    pub fn txids(&self) -> Vec<Txid> { self.txs.iter().map(Transaction::txid).collect() }

    pub fn into_txs(self) -> Vec<Transaction> { self.txs }
}
