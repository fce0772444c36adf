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

use std::collections::BTreeMap;

use asctx::{Address, DecodeError, SignedTx, SigningKey, UnsignedTx};

#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum SignerError {
    /// signing request was rejected by the user.
    UserRejected,

    /// signer is not available: {0}.
    Unavailable(String),

    /// transaction #{0} of the signing request is malformed: {1}
    Malformed(usize, DecodeError),

    /// signer doesn't control account {0}.
    UnknownAccount(Address),

    /// signer returned {returned} signed transactions for {requested} requested.
    Mismatch { requested: usize, returned: usize },
}

/// Wallet-like component authorizing transactions on behalf of the accounts it controls.
pub trait Signer {
    /// Signs encoded transactions, returning signed blobs in the same order.
    ///
    /// The description is a human-readable explanation of the request which interactive signers
    /// present to the user.
    fn sign(
        &mut self,
        txs: &[UnsignedTx],
        description: Option<&str>,
    ) -> Result<Vec<SignedTx>, SignerError>;
}

/// Local key store signing with in-memory keys.
#[derive(Clone, Debug, Default)]
pub struct Keyring {
    keys: BTreeMap<Address, SigningKey>,
}

impl Keyring {
    pub fn new() -> Self { Self::default() }

    pub fn with(keys: impl IntoIterator<Item = SigningKey>) -> Self {
        let mut me = Self::new();
        for key in keys {
            me.insert(key);
        }
        me
    }

    pub fn insert(&mut self, key: SigningKey) -> Address {
        let address = key.address();
        self.keys.insert(address, key);
        address
    }

    pub fn contains(&self, address: Address) -> bool { self.keys.contains_key(&address) }

    pub fn addresses(&self) -> impl Iterator<Item = Address> + '_ { self.keys.keys().copied() }

    pub fn extend(&mut self, other: Keyring) { self.keys.extend(other.keys); }
}

impl Signer for Keyring {
    fn sign(
        &mut self,
        txs: &[UnsignedTx],
        description: Option<&str>,
    ) -> Result<Vec<SignedTx>, SignerError> {
        if let Some(description) = description {
            debug!("Signing {} transaction(s): {description}", txs.len());
        }
        txs.iter()
            .enumerate()
            .map(|(index, blob)| {
                let tx = blob
                    .decode()
                    .map_err(|e| SignerError::Malformed(index, e))?;
                let key = self
                    .keys
                    .get(&tx.sender)
                    .ok_or(SignerError::UnknownAccount(tx.sender))?;
                let sig = key.sign(tx.txid());
                trace!("Signed transaction {} from {}", tx.txid(), tx.sender);
                Ok(SignedTx::new(tx, sig))
            })
            .collect()
    }
}

/// Signer refusing every request, modelling a user declining in the wallet.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct RejectingSigner;

impl Signer for RejectingSigner {
    fn sign(&mut self, _: &[UnsignedTx], _: Option<&str>) -> Result<Vec<SignedTx>, SignerError> {
        Err(SignerError::UserRejected)
    }
}

#[cfg(test)]
mod tests {
    use asctx::{Intent, TxParams, MIN_FEE};

    use super::*;

    fn unsigned(sender: Address) -> UnsignedTx {
        let params = TxParams {
            fee: MIN_FEE,
            min_fee: MIN_FEE,
            first_valid: 1,
            last_valid: 100,
            genesis_id: s!("sandbox-v1"),
        };
        Intent::payment(sender, Address::from_byte_array([9; 32]), 10)
            .build(&params)
            .unwrap()
            .to_unsigned()
    }

    #[test]
    fn signs_in_order() {
        let alice = SigningKey::from_seed("alice");
        let bob = SigningKey::from_seed("bob");
        let mut keyring = Keyring::with([alice.clone(), bob.clone()]);
        let blobs = [unsigned(alice.address()), unsigned(bob.address())];
        let signed = keyring.sign(&blobs, Some("test")).unwrap();
        assert_eq!(signed.len(), 2);
        let first = signed[0].decode().unwrap();
        let second = signed[1].decode().unwrap();
        assert_eq!(first.txn.sender, alice.address());
        assert!(alice.verify(first.txn.txid(), first.sig));
        assert!(bob.verify(second.txn.txid(), second.sig));
    }

    #[test]
    fn unknown_account() {
        let mut keyring = Keyring::new();
        let addr = SigningKey::from_seed("stranger").address();
        assert_eq!(keyring.sign(&[unsigned(addr)], None), Err(SignerError::UnknownAccount(addr)));
    }

    #[test]
    fn malformed_request() {
        let alice = SigningKey::from_seed("alice");
        let mut keyring = Keyring::with([alice.clone()]);
        let blobs = [unsigned(alice.address()), UnsignedTx::from_bytes(vec![0xFF, 0xFF])];
        let err = keyring.sign(&blobs, None).unwrap_err();
        assert!(matches!(err, SignerError::Malformed(1, _)), "unexpected error {err}");
    }

    #[test]
    fn rejecting() {
        let blob = unsigned(SigningKey::from_seed("alice").address());
        assert_eq!(RejectingSigner.sign(&[blob], None), Err(SignerError::UserRejected));
    }
}
