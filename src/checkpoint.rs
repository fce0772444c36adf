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

//! Persisted outputs of deployment steps, read back by later workflows.

use std::fs;
use std::path::{Path, PathBuf};

use asctx::{Address, AppId, AssetId};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum CheckpointError {
    /// unable to access checkpoint file: {0}
    #[from]
    Io(std::io::Error),

    /// checkpoint file is corrupted: {0}
    #[from]
    Yaml(serde_yaml::Error),

    /// checkpoint '{0}' is not found; run the workflow which creates it first.
    Missing(String),

    /// checkpoint '{key}' holds {found} while {expected} is expected.
    WrongType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

#[derive(Clone, Eq, PartialEq, Debug, Display)]
#[derive(Serialize, Deserialize)]
#[serde(crate = "serde_crate", rename_all = "camelCase")]
pub enum CheckpointValue {
    #[display("app {0}")]
    App(AppId),
    #[display("asset {0}")]
    Asset(AssetId),
    #[display("{0}")]
    Address(Address),
    #[display("{0}")]
    Uint(u64),
    #[display("{0}")]
    Text(String),
}

impl CheckpointValue {
    pub fn kind(&self) -> &'static str {
        match self {
            CheckpointValue::App(_) => "app",
            CheckpointValue::Asset(_) => "asset",
            CheckpointValue::Address(_) => "address",
            CheckpointValue::Uint(_) => "uint",
            CheckpointValue::Text(_) => "text",
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
#[derive(Serialize, Deserialize)]
#[serde(crate = "serde_crate", rename_all = "camelCase")]
pub struct Checkpoint {
    pub value: CheckpointValue,
    pub round: u64,
    pub timestamp: DateTime<Utc>,
}

/// Storage of checkpoints, injected into the workflows.
pub trait CheckpointStore {
    fn get(&self, key: &str) -> Option<&Checkpoint>;

    fn put(&mut self, key: &str, value: CheckpointValue, round: u64) -> Result<(), CheckpointError>;

    fn entries(&self) -> Vec<(&str, &Checkpoint)>;

    fn value(&self, key: &str) -> Option<&CheckpointValue> { self.get(key).map(|c| &c.value) }

    fn require(&self, key: &str) -> Result<&CheckpointValue, CheckpointError> {
        self.value(key)
            .ok_or_else(|| CheckpointError::Missing(key.to_owned()))
    }

    fn app_id(&self, key: &str) -> Result<AppId, CheckpointError> {
        match self.require(key)? {
            CheckpointValue::App(id) => Ok(*id),
            other => Err(wrong_type(key, "app", other)),
        }
    }

    fn asset_id(&self, key: &str) -> Result<AssetId, CheckpointError> {
        match self.require(key)? {
            CheckpointValue::Asset(id) => Ok(*id),
            other => Err(wrong_type(key, "asset", other)),
        }
    }

    fn address(&self, key: &str) -> Result<Address, CheckpointError> {
        match self.require(key)? {
            CheckpointValue::Address(addr) => Ok(*addr),
            other => Err(wrong_type(key, "address", other)),
        }
    }

    fn text(&self, key: &str) -> Result<Option<&str>, CheckpointError> {
        match self.value(key) {
            None => Ok(None),
            Some(CheckpointValue::Text(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(wrong_type(key, "text", other)),
        }
    }
}

fn wrong_type(key: &str, expected: &'static str, found: &CheckpointValue) -> CheckpointError {
    CheckpointError::WrongType {
        key: key.to_owned(),
        expected,
        found: found.kind(),
    }
}

/// In-memory checkpoint store.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct MemCheckpoints(IndexMap<String, Checkpoint>);

impl MemCheckpoints {
    pub fn new() -> Self { Self::default() }
}

impl CheckpointStore for MemCheckpoints {
    fn get(&self, key: &str) -> Option<&Checkpoint> { self.0.get(key) }

    fn put(&mut self, key: &str, value: CheckpointValue, round: u64) -> Result<(), CheckpointError> {
        self.0.insert(key.to_owned(), Checkpoint {
            value,
            round,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    fn entries(&self) -> Vec<(&str, &Checkpoint)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v)).collect()
    }
}

/// Checkpoint store persisted as a YAML file, rewritten on every update.
#[derive(Clone, Debug)]
pub struct FileCheckpoints {
    path: PathBuf,
    cache: MemCheckpoints,
}

impl FileCheckpoints {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CheckpointError> {
        let path = path.as_ref().to_path_buf();
        let cache = if path.exists() {
            let file = fs::File::open(&path)?;
            MemCheckpoints(serde_yaml::from_reader(file)?)
        } else {
            MemCheckpoints::new()
        };
        debug!("Loaded {} checkpoint(s) from {}", cache.0.len(), path.display());
        Ok(Self { path, cache })
    }

    pub fn path(&self) -> &Path { &self.path }

    /// File receiving the new content before it replaces the checkpoint file.
    pub fn staging_path(&self) -> PathBuf { self.path.with_extension("yaml.tmp") }

    fn store(&self) -> Result<(), CheckpointError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let staging = self.staging_path();
        let file = fs::File::create(&staging)?;
        serde_yaml::to_writer(&file, &self.cache.0)?;
        file.sync_all()?;
        fs::rename(staging, &self.path)?;
        Ok(())
    }
}

impl CheckpointStore for FileCheckpoints {
    fn get(&self, key: &str) -> Option<&Checkpoint> { self.cache.get(key) }

    fn put(&mut self, key: &str, value: CheckpointValue, round: u64) -> Result<(), CheckpointError> {
        trace!("Recording checkpoint {key} = {value} at round {round}");
        self.cache.put(key, value, round)?;
        self.store()
    }

    fn entries(&self) -> Vec<(&str, &Checkpoint)> { self.cache.entries() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_access() {
        let mut store = MemCheckpoints::new();
        store.put("mintAppID", CheckpointValue::App(AppId::from(1)), 3).unwrap();
        store.put("assetID", CheckpointValue::Asset(AssetId::from(2)), 4).unwrap();
        assert_eq!(store.app_id("mintAppID").unwrap(), AppId::from(1));
        assert_eq!(store.asset_id("assetID").unwrap(), AssetId::from(2));
        assert_eq!(store.get("assetID").unwrap().round, 4);
        assert!(matches!(store.app_id("holdingsAppID"), Err(CheckpointError::Missing(key)) if key == "holdingsAppID"));
        assert!(matches!(
            store.address("assetID"),
            Err(CheckpointError::WrongType { expected: "address", found: "asset", .. })
        ));
        assert_eq!(store.text("mint.stage").unwrap(), None);
        let keys = store.entries().into_iter().map(|(k, _)| k).collect::<Vec<_>>();
        assert_eq!(keys, vec!["mintAppID", "assetID"]);
    }

    #[test]
    fn file_persistence() {
        let dir = std::env::temp_dir().join(format!("asc-checkpoints-{}", std::process::id()));
        let path = dir.join("checkpoints.yaml");
        let _ = fs::remove_file(&path);

        let mut store = FileCheckpoints::load(&path).unwrap();
        let addr = Address::from_byte_array([0xAB; 32]);
        store.put("holdingsAddr", CheckpointValue::Address(addr), 7).unwrap();
        store.put("mint.stage", CheckpointValue::Text(s!("funded")), 8).unwrap();

        let reloaded = FileCheckpoints::load(&path).unwrap();
        assert_eq!(reloaded.address("holdingsAddr").unwrap(), addr);
        assert_eq!(reloaded.text("mint.stage").unwrap(), Some("funded"));
        assert_eq!(reloaded.get("mint.stage").unwrap().round, 8);
        assert!(!store.staging_path().exists());

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn interrupted_write_keeps_checkpoints() {
        let dir = std::env::temp_dir().join(format!("asc-staging-{}", std::process::id()));
        let path = dir.join("checkpoints.yaml");
        let _ = fs::remove_dir_all(&dir);

        let mut store = FileCheckpoints::load(&path).unwrap();
        store.put("mintAppID", CheckpointValue::App(AppId::from(1)), 2).unwrap();

        // leftover of a write which never reached the rename
        fs::write(store.staging_path(), b"mintAppID: {value: [").unwrap();
        let reloaded = FileCheckpoints::load(&path).unwrap();
        assert_eq!(reloaded.app_id("mintAppID").unwrap(), AppId::from(1));

        store.put("assetID", CheckpointValue::Asset(AssetId::from(2)), 3).unwrap();
        assert!(!store.staging_path().exists());
        let reloaded = FileCheckpoints::load(&path).unwrap();
        assert_eq!(reloaded.app_id("mintAppID").unwrap(), AppId::from(1));
        assert_eq!(reloaded.asset_id("assetID").unwrap(), AssetId::from(2));

        fs::remove_dir_all(dir).unwrap();
    }
}
