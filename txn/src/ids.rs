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

use core::str::FromStr;

use amplify::{ByteArray, Bytes32};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

/// Computes domain-separated SHA256 digest over a sequence of byte slices.
pub fn tagged_hash<'a>(tag: &[u8], data: impl IntoIterator<Item = &'a [u8]>) -> [u8; 32] {
    let mut engine = Sha256::new_with_prefix(tag);
    for chunk in data {
        engine.update(chunk);
    }
    engine.finalize().into()
}

macro_rules! impl_hash_serde {
    ($ty:ty) => {
        impl serde::Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                <$ty>::from_str(&s).map_err(|e| D::Error::custom(format!("{e}")))
            }
        }
    };
}

/// Account address on the ledger.
///
/// Both externally owned accounts and application accounts use the same 32-byte address space;
/// application accounts are derived from the application id with [`Address::for_app`].
#[derive(Wrapper, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, From)]
#[wrapper(Deref, Display, FromStr)]
pub struct Address(
    #[from]
    #[from([u8; 32])]
    Bytes32,
);

impl Address {
    pub fn zero() -> Self { Self::from_byte_array([0u8; 32]) }

    pub fn from_byte_array(bytes: [u8; 32]) -> Self { Self(Bytes32::from_byte_array(bytes)) }

    pub fn to_byte_array(&self) -> [u8; 32] { self.0.to_byte_array() }

    /// Address of the account controlled by an application.
    pub fn for_app(app: AppId) -> Self {
        Self::from_byte_array(tagged_hash(b"appID", [app.to_u64().to_be_bytes().as_slice()]))
    }

    pub fn is_zero(&self) -> bool { self.to_byte_array() == [0u8; 32] }
}

impl_hash_serde!(Address);

/// Transaction identifier.
#[derive(Wrapper, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, From)]
#[wrapper(Deref, Display, FromStr)]
pub struct Txid(
    #[from]
    #[from([u8; 32])]
    Bytes32,
);

impl Txid {
    pub fn from_byte_array(bytes: [u8; 32]) -> Self { Self(Bytes32::from_byte_array(bytes)) }
    pub fn to_byte_array(&self) -> [u8; 32] { self.0.to_byte_array() }
}

impl_hash_serde!(Txid);

/// Identifier shared by all transactions of an atomic group.
#[derive(Wrapper, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, From)]
#[wrapper(Deref, Display, FromStr)]
pub struct GroupId(
    #[from]
    #[from([u8; 32])]
    Bytes32,
);

impl GroupId {
    pub fn from_byte_array(bytes: [u8; 32]) -> Self { Self(Bytes32::from_byte_array(bytes)) }
    pub fn to_byte_array(&self) -> [u8; 32] { self.0.to_byte_array() }
}

impl_hash_serde!(GroupId);

/// Authorization tag attached to a transaction by a signer.
#[derive(Wrapper, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, From)]
#[wrapper(Deref, Display, FromStr)]
pub struct Signature(
    #[from]
    #[from([u8; 32])]
    Bytes32,
);

impl Signature {
    pub fn from_byte_array(bytes: [u8; 32]) -> Self { Self(Bytes32::from_byte_array(bytes)) }
}

impl_hash_serde!(Signature);

/// Application (smart contract instance) identifier.
#[derive(Wrapper, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, From)]
#[wrapper(Deref, Display, FromStr)]
#[derive(Serialize, Deserialize)]
#[serde(crate = "serde_crate", transparent)]
pub struct AppId(#[from] u64);

impl AppId {
    #[inline]
    pub const fn to_u64(self) -> u64 { self.0 }
}

/// Asset identifier.
#[derive(Wrapper, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, From)]
#[wrapper(Deref, Display, FromStr)]
#[derive(Serialize, Deserialize)]
#[serde(crate = "serde_crate", transparent)]
pub struct AssetId(#[from] u64);

impl AssetId {
    #[inline]
    pub const fn to_u64(self) -> u64 { self.0 }
}
