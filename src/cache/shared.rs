//! Shared cache
//!
//! One recipe per `date_key`, visible to every device. Writers race freely:
//! the store upserts on the `date` column and the last write observed wins,
//! which is acceptable because every writer for a date produces an equally
//! good recipe.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::core::config::SharedStoreConfig;
use crate::core::model::Recipe;
use crate::core::util::snippet;

#[derive(Debug, Error)]
pub enum SharedStoreError {
    #[error("shared store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("shared store returned HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("shared store credentials are not valid header values")]
    InvalidCredentials,
}

/// Row layout of the shared table
#[derive(Debug, Serialize)]
struct UpsertRow<'a> {
    date: &'a str,
    recipe_data: &'a Recipe,
}

/// Network key-value store keyed by calendar date
#[async_trait]
pub trait SharedStore: Send + Sync {
    /// Point lookup; `Ok(None)` when no row exists for the date
    async fn fetch(&self, date_key: &str) -> Result<Option<Value>, SharedStoreError>;

    /// Insert or overwrite the row for the date
    async fn upsert(&self, date_key: &str, recipe: &Recipe) -> Result<(), SharedStoreError>;
}

/// PostgREST (Supabase) table adapter
#[derive(Debug, Clone)]
pub struct SupabaseStore {
    http: Client,
    table_url: String,
}

impl SupabaseStore {
    pub fn new(config: &SharedStoreConfig) -> Result<Self, SharedStoreError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| SharedStoreError::InvalidCredentials)?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| SharedStoreError::InvalidCredentials)?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            http,
            table_url: table_url(config),
        })
    }
}

fn table_url(config: &SharedStoreConfig) -> String {
    format!(
        "{}/rest/v1/{}",
        config.url.as_str().trim_end_matches('/'),
        config.table
    )
}

async fn check_status(res: reqwest::Response) -> Result<reqwest::Response, SharedStoreError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    Err(SharedStoreError::Status {
        status,
        body: snippet(&body),
    })
}

#[async_trait]
impl SharedStore for SupabaseStore {
    async fn fetch(&self, date_key: &str) -> Result<Option<Value>, SharedStoreError> {
        let date_filter = format!("eq.{}", date_key);
        let res = self
            .http
            .get(&self.table_url)
            .query(&[
                ("select", "recipe_data"),
                ("date", date_filter.as_str()),
                ("limit", "1"),
            ])
            .send()
            .await?;

        let rows: Vec<RecipeRow> = check_status(res).await?.json().await?;
        Ok(rows.into_iter().next().map(|row| row.recipe_data))
    }

    async fn upsert(&self, date_key: &str, recipe: &Recipe) -> Result<(), SharedStoreError> {
        let record = UpsertRow {
            date: date_key,
            recipe_data: recipe,
        };

        let res = self
            .http
            .post(&self.table_url)
            .query(&[("on_conflict", "date")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&record)
            .send()
            .await?;

        check_status(res).await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct RecipeRow {
    recipe_data: Value,
}

/// Result of a shared lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SharedLookup {
    Hit(Recipe),
    Miss,
    /// No store configured
    Unavailable,
}

/// The shared cache stage of the pipeline
#[derive(Clone, Default)]
pub struct SharedCache {
    store: Option<Arc<dyn SharedStore>>,
}

impl SharedCache {
    pub fn new(store: Arc<dyn SharedStore>) -> Self {
        Self { store: Some(store) }
    }

    /// A cache with no store behind it; every read is `Unavailable`
    pub fn disabled() -> Self {
        Self { store: None }
    }

    pub fn is_available(&self) -> bool {
        self.store.is_some()
    }

    /// Look up the recipe for `date_key`. Store errors and malformed rows are misses.
    pub async fn read(&self, date_key: &str) -> SharedLookup {
        let Some(store) = &self.store else {
            return SharedLookup::Unavailable;
        };

        match store.fetch(date_key).await {
            Ok(Some(value)) => match Recipe::from_value(value) {
                Ok(recipe) => SharedLookup::Hit(recipe),
                Err(e) => {
                    warn!(date_key = %date_key, error = %e, "ignoring malformed shared recipe");
                    SharedLookup::Miss
                }
            },
            Ok(None) => {
                debug!(date_key = %date_key, "no shared recipe for today");
                SharedLookup::Miss
            }
            Err(e) => {
                warn!(date_key = %date_key, error = %e, "shared cache lookup failed");
                SharedLookup::Miss
            }
        }
    }

    /// Upsert the recipe for `date_key`. Failures are logged and swallowed.
    pub async fn write(&self, date_key: &str, recipe: &Recipe) {
        let Some(store) = &self.store else {
            return;
        };

        match store.upsert(date_key, recipe).await {
            Ok(()) => info!(date_key = %date_key, "published recipe to shared cache"),
            Err(e) => warn!(date_key = %date_key, error = %e, "failed to publish recipe"),
        }
    }

    /// Run [`SharedCache::write`] in the background
    pub fn publish(&self, date_key: &str, recipe: &Recipe) -> Option<JoinHandle<()>> {
        if !self.is_available() {
            return None;
        }
        let cache = self.clone();
        let date_key = date_key.to_string();
        let recipe = recipe.clone();
        Some(tokio::spawn(async move {
            cache.write(&date_key, &recipe).await;
        }))
    }
}
