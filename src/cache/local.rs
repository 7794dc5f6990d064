//! Device-local cache
//!
//! A synchronous string-keyed store plus the recipe cache stage built on it.
//! The recipe lives in one slot as `{recipe, date}`; the bare freshness tag is
//! mirrored into a second slot.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::model::Recipe;

/// Slot holding the serialized recipe entry
pub const RECIPE_SLOT: &str = "dailyRecipe";

/// Slot holding the freshness tag of the cached recipe
pub const TAG_SLOT: &str = "dailyRecipeDate";

#[derive(Debug, Error)]
pub enum LocalStoreError {
    #[error("failed to access local store {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("local store {path:?} is not a string map: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize local cache entry: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Synchronous, process-local key-value store
pub trait LocalStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError>;
    fn remove(&self, key: &str) -> Result<(), LocalStoreError>;
}

/// Key-value store persisted as one JSON object file
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: io::Error) -> LocalStoreError {
        LocalStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn load(&self) -> Result<BTreeMap<String, String>, LocalStoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let bytes = fs::read(&self.path).map_err(|e| self.io_err(e))?;
        serde_json::from_slice(&bytes).map_err(|source| LocalStoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Load for a write; an unreadable file is replaced rather than blocking writes
    fn load_for_write(&self) -> Result<BTreeMap<String, String>, LocalStoreError> {
        match self.load() {
            Err(LocalStoreError::Corrupt { path, source }) => {
                warn!(path = ?path, error = %source, "discarding corrupt local store");
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn save(&self, slots: &BTreeMap<String, String>) -> Result<(), LocalStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }

        let tmp = self.path.with_extension("tmp");
        let json = serde_json::to_string_pretty(slots)?;
        let mut file = fs::File::create(&tmp).map_err(|e| self.io_err(e))?;
        file.write_all(json.as_bytes())
            .and_then(|_| file.write_all(b"\n"))
            .and_then(|_| file.sync_all())
            .map_err(|e| self.io_err(e))?;

        fs::rename(&tmp, &self.path).map_err(|e| self.io_err(e))
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError> {
        let mut slots = self.load_for_write()?;
        slots.insert(key.to_string(), value.to_string());
        self.save(&slots)
    }

    fn remove(&self, key: &str) -> Result<(), LocalStoreError> {
        let mut slots = self.load_for_write()?;
        if slots.remove(key).is_some() {
            self.save(&slots)?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct EntryRef<'a> {
    recipe: &'a Recipe,
    date: &'a str,
}

#[derive(Deserialize)]
struct StoredEntry {
    recipe: Value,
    #[serde(default)]
    date: Option<String>,
}

/// Decoded view of whatever the local cache currently holds
#[derive(Debug, Clone, Serialize)]
pub struct LocalEntry {
    pub tag: Option<String>,
    pub recipe: Option<Recipe>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
}

/// The local cache stage of the pipeline
#[derive(Clone)]
pub struct LocalCache {
    store: Arc<dyn LocalStore>,
}

impl LocalCache {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    /// Today's recipe if the stored entry is decodable, valid and tagged
    /// exactly with `freshness_tag`. Every other case is a miss.
    pub fn read(&self, freshness_tag: &str) -> Option<Recipe> {
        let entry = self.entry();
        if let Some(problem) = &entry.problem {
            warn!(problem = %problem, "ignoring local cache entry");
            return None;
        }
        let recipe = entry.recipe?;

        match entry.tag.as_deref() {
            Some(tag) if tag == freshness_tag => Some(recipe),
            stale => {
                debug!(cached = ?stale, today = %freshness_tag, "local cache entry is stale");
                None
            }
        }
    }

    /// Overwrite the entry with `recipe` tagged `freshness_tag`.
    /// Failures are logged and swallowed.
    pub fn write(&self, recipe: &Recipe, freshness_tag: &str) {
        if let Err(e) = self.try_write(recipe, freshness_tag) {
            warn!(error = %e, "failed to persist recipe locally");
        }
    }

    fn try_write(&self, recipe: &Recipe, freshness_tag: &str) -> Result<(), LocalStoreError> {
        let blob = serde_json::to_string(&EntryRef {
            recipe,
            date: freshness_tag,
        })?;
        self.store.set(RECIPE_SLOT, &blob)?;
        self.store.set(TAG_SLOT, freshness_tag)?;
        debug!(tag = %freshness_tag, "recipe persisted locally");
        Ok(())
    }

    /// Inspect the stored entry without judging freshness
    pub fn entry(&self) -> LocalEntry {
        let mut entry = LocalEntry {
            tag: None,
            recipe: None,
            problem: None,
        };

        let blob = match self.store.get(RECIPE_SLOT) {
            Ok(Some(blob)) => blob,
            Ok(None) => return entry,
            Err(e) => {
                entry.problem = Some(e.to_string());
                return entry;
            }
        };

        let stored: StoredEntry = match serde_json::from_str(&blob) {
            Ok(stored) => stored,
            Err(e) => {
                entry.problem = Some(format!("undecodable entry: {}", e));
                return entry;
            }
        };

        // Entries written without an embedded tag rely on the separate slot
        entry.tag = match stored.date {
            Some(tag) => Some(tag),
            None => self.store.get(TAG_SLOT).ok().flatten(),
        };

        match Recipe::from_value(stored.recipe) {
            Ok(recipe) => entry.recipe = Some(recipe),
            Err(e) => entry.problem = Some(e.to_string()),
        }
        entry
    }

    /// Remove both slots
    pub fn clear(&self) -> Result<(), LocalStoreError> {
        self.store.remove(RECIPE_SLOT)?;
        self.store.remove(TAG_SLOT)
    }
}
