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

use amplify::{ByteArray, Bytes32};
use serde::{Deserialize, Serialize};

use crate::{tagged_hash, Address, Signature, Txid};

/// Secret key material controlling a single account.
///
/// Authorization is modeled as a keyed digest over the transaction id: the account address is
/// derived from the secret and the signature commits to both the secret and the signed txid.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[derive(Serialize, Deserialize)]
#[serde(crate = "serde_crate")]
pub struct SigningKey {
    #[serde(with = "secret_hex")]
    secret: Bytes32,
}

impl SigningKey {
    pub fn from_secret(secret: [u8; 32]) -> Self { Self { secret: Bytes32::from_byte_array(secret) } }

    /// Derives key deterministically from an arbitrary seed phrase or account name.
    pub fn from_seed(seed: &str) -> Self { Self::from_secret(tagged_hash(b"SEED", [seed.as_bytes()])) }

    pub fn address(&self) -> Address {
        Address::from_byte_array(tagged_hash(b"ADDR", [self.secret.to_byte_array().as_slice()]))
    }

    pub fn sign(&self, txid: Txid) -> Signature {
        let data = self.authorization(txid);
        Signature::from_byte_array(data)
    }

    /// Checks a signature produced by the key for the given transaction.
    pub fn verify(&self, txid: Txid, sig: Signature) -> bool { self.sign(txid) == sig }

    fn authorization(&self, txid: Txid) -> [u8; 32] {
        tagged_hash(b"SIG", [
            self.secret.to_byte_array().as_slice(),
            txid.to_byte_array().as_slice(),
        ])
    }
}

mod secret_hex {
    use std::str::FromStr;

    use amplify::Bytes32;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(secret: &Bytes32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(secret)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes32, D::Error> {
        let s = String::deserialize(deserializer)?;
        Bytes32::from_str(&s).map_err(|e| D::Error::custom(format!("{e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_keys() {
        let a = SigningKey::from_seed("master");
        let b = SigningKey::from_seed("master");
        let c = SigningKey::from_seed("buyer");
        assert_eq!(a.address(), b.address());
        assert_ne!(a.address(), c.address());
    }

    #[test]
    fn signature_binds_key_and_txid() {
        let key = SigningKey::from_seed("master");
        let other = SigningKey::from_seed("buyer");
        let txid = Txid::from_byte_array([7u8; 32]);
        let sig = key.sign(txid);
        assert!(key.verify(txid, sig));
        assert!(!other.verify(txid, sig));
        assert!(!key.verify(Txid::from_byte_array([8u8; 32]), sig));
    }
}
