//! In-memory collaborators for pipeline tests

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use parking_lot::Mutex;
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::cache::local::{LocalStore, LocalStoreError};
use crate::cache::shared::{SharedStore, SharedStoreError};
use crate::core::date::Clock;
use crate::core::model::Recipe;
use crate::generate::parse::parse_generated;
use crate::generate::{GenerateError, RecipeGenerator};

/// A clock pinned to one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

pub fn clock_at(rfc3339: &str) -> FixedClock {
    let instant: DateTime<FixedOffset> =
        DateTime::parse_from_rfc3339(rfc3339).expect("valid test instant");
    FixedClock(instant)
}

/// In-memory local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<BTreeMap<String, String>>,
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError> {
        Ok(self.slots.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError> {
        self.slots.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), LocalStoreError> {
        self.slots.lock().remove(key);
        Ok(())
    }
}

/// Local store that reads as empty and refuses every write
#[derive(Debug, Default)]
pub struct ReadOnlyStore {
    writes: AtomicUsize,
}

impl ReadOnlyStore {
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn disk_full() -> LocalStoreError {
        LocalStoreError::Io {
            path: PathBuf::from(".receita/storage.json"),
            source: io::Error::other("disk full"),
        }
    }
}

impl LocalStore for ReadOnlyStore {
    fn get(&self, _key: &str) -> Result<Option<String>, LocalStoreError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), LocalStoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(Self::disk_full())
    }

    fn remove(&self, _key: &str) -> Result<(), LocalStoreError> {
        Err(Self::disk_full())
    }
}

/// Last-write-wins table keyed by date
#[derive(Default)]
pub struct MemorySharedStore {
    rows: Mutex<HashMap<String, Value>>,
    last: Mutex<Option<Value>>,
    fetches: AtomicUsize,
    upserts: AtomicUsize,
    failing: bool,
}

impl MemorySharedStore {
    /// A store whose every request fails
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub fn put(&self, date_key: &str, value: Value) {
        self.rows.lock().insert(date_key.to_string(), value);
    }

    pub fn get(&self, date_key: &str) -> Option<Value> {
        self.rows.lock().get(date_key).cloned()
    }

    pub fn last_written(&self) -> Option<Value> {
        self.last.lock().clone()
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn upserts(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    fn unavailable() -> SharedStoreError {
        SharedStoreError::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: "down".to_string(),
        }
    }
}

#[async_trait]
impl SharedStore for MemorySharedStore {
    async fn fetch(&self, date_key: &str) -> Result<Option<Value>, SharedStoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self.failing {
            return Err(Self::unavailable());
        }
        Ok(self.get(date_key))
    }

    async fn upsert(&self, date_key: &str, recipe: &Recipe) -> Result<(), SharedStoreError> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self.failing {
            return Err(Self::unavailable());
        }
        let value = serde_json::to_value(recipe).expect("recipe serializes");
        self.rows.lock().insert(date_key.to_string(), value.clone());
        *self.last.lock() = Some(value);
        Ok(())
    }
}

enum Script {
    Recipe(Recipe),
    Text(String),
    Stall(Duration),
}

/// Generator that replays a fixed answer and counts calls
pub struct ScriptedGenerator {
    script: Script,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn returning(recipe: Recipe) -> Self {
        Self::with(Script::Recipe(recipe))
    }

    /// Raw service text, parsed the way the real client parses it
    pub fn text(text: &str) -> Self {
        Self::with(Script::Text(text.to_string()))
    }

    pub fn stalling(delay: Duration) -> Self {
        Self::with(Script::Stall(delay))
    }

    fn with(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecipeGenerator for ScriptedGenerator {
    async fn generate(&self) -> Result<Recipe, GenerateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        match &self.script {
            Script::Recipe(recipe) => Ok(recipe.clone()),
            Script::Text(text) => parse_generated(text),
            Script::Stall(delay) => {
                tokio::time::sleep(*delay).await;
                Err(GenerateError::Empty)
            }
        }
    }
}
