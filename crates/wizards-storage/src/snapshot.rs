//! JSON snapshot fixtures for the in-memory backend.
//!
//! A [`Snapshot`] is the file format the CLI and tests use to carry a
//! whole store around: the persisted nodes plus the language catalog, as
//! one JSON document. It is fixture tooling, not a storage engine --
//! real persistence stays behind [`EntityStore`](crate::EntityStore).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use wizards_core::{LanguageInfo, TreeNode};

use crate::error::StorageError;
use crate::memory::{InMemoryStore, StaticLanguageCatalog};

/// Serializable image of a store and its language catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Persisted nodes, sorted by ID.
    #[serde(default)]
    pub nodes: Vec<TreeNode>,
    /// Languages offered to editing clients.
    #[serde(default)]
    pub languages: Vec<LanguageInfo>,
}

impl Snapshot {
    /// Reads a snapshot from a JSON file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Writes the snapshot to a JSON file, pretty-printed.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), StorageError> {
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw)?;
        Ok(())
    }

    /// Materializes the snapshot into live backends.
    pub fn into_store(self) -> (InMemoryStore, StaticLanguageCatalog) {
        (
            InMemoryStore::from_nodes(self.nodes),
            StaticLanguageCatalog::new(self.languages),
        )
    }

    /// Captures a store (and language list) back into snapshot form.
    pub fn from_store(store: InMemoryStore, languages: Vec<LanguageInfo>) -> Self {
        Snapshot {
            nodes: store.into_nodes(),
            languages,
        }
    }
}
