//! Runtime configuration
//!
//! Built once at startup from CLI flags and environment variables, then handed
//! to the pipeline. A collaborator whose credentials are missing is `None`
//! and its stage is skipped entirely.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::core::date::DateStyle;
use crate::core::util::non_empty;

/// Default PostgREST table holding one recipe per day
pub const DEFAULT_TABLE: &str = "daily_recipes";

/// Default generative model
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default Generative Language API base
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default bound on one generation call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid shared store URL {url:?}: {source}")]
    InvalidSharedUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid generator endpoint {url:?}: {source}")]
    InvalidEndpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("timeout must be greater than zero")]
    ZeroTimeout,
}

/// Shared store (Supabase/PostgREST) connection settings
#[derive(Debug, Clone)]
pub struct SharedStoreConfig {
    pub url: Url,
    pub api_key: String,
    pub table: String,
}

impl SharedStoreConfig {
    /// Returns `Ok(None)` unless both the URL and the key are present and non-empty.
    pub fn from_parts(
        url: Option<String>,
        api_key: Option<String>,
        table: Option<String>,
    ) -> Result<Option<Self>, ConfigError> {
        let (Some(url), Some(api_key)) = (non_empty(url), non_empty(api_key)) else {
            return Ok(None);
        };
        let parsed = Url::parse(url.trim_end_matches('/'))
            .map_err(|source| ConfigError::InvalidSharedUrl { url, source })?;

        Ok(Some(Self {
            url: parsed,
            api_key,
            table: non_empty(table).unwrap_or_else(|| DEFAULT_TABLE.to_string()),
        }))
    }
}

/// Generation service settings
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: Url,
    pub timeout: Duration,
}

impl GeneratorConfig {
    /// Returns `Ok(None)` unless the API key is present and non-empty.
    pub fn from_parts(
        api_key: Option<String>,
        model: Option<String>,
        endpoint: Option<String>,
        timeout: Duration,
    ) -> Result<Option<Self>, ConfigError> {
        let Some(api_key) = non_empty(api_key) else {
            return Ok(None);
        };
        if timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        let endpoint = non_empty(endpoint).unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let endpoint = Url::parse(endpoint.trim_end_matches('/'))
            .map_err(|source| ConfigError::InvalidEndpoint {
                url: endpoint.clone(),
                source,
            })?;

        Ok(Some(Self {
            api_key,
            model: non_empty(model).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            endpoint,
            timeout,
        }))
    }
}

/// Everything a resolution needs to know about its environment
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the device-local store
    pub cache_dir: PathBuf,
    pub date_style: DateStyle,
    pub shared: Option<SharedStoreConfig>,
    pub generator: Option<GeneratorConfig>,
}
