//! Daily recipe resolution
//!
//! One resolution walks the stages in order and stops at the first hit:
//!
//! ```text
//! Idle -> CheckingLocal -> (Resolved | CheckingShared) -> (Resolved | Generating) -> (Resolved | Failed)
//! ```
//!
//! Only a generation failure is visible to the caller, as a resolution
//! without a recipe. Cache misses, unconfigured collaborators and failed
//! best-effort writes are absorbed here.

pub mod view;

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::cache::local::{FileStore, LocalCache};
use crate::cache::shared::{SharedCache, SharedLookup, SupabaseStore};
use crate::core::config::{Config, DEFAULT_TIMEOUT};
use crate::core::date::{Clock, DateStyle, SystemClock, Today};
use crate::core::model::{Recipe, Source};
use crate::core::paths::storage_path;
use crate::generate::gemini::GeminiClient;
use crate::generate::{GenerateError, RecipeGenerator};

/// Where a resolution currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveState {
    Idle,
    CheckingLocal,
    CheckingShared,
    Generating,
    Resolved(Source),
    Failed,
}

/// Outcome of one resolution
#[derive(Debug)]
pub struct Resolution {
    pub today: Today,
    pub state: ResolveState,
    pub recipe: Option<Recipe>,
    /// Why generation failed, when it did
    pub failure: Option<String>,
    publish: Option<JoinHandle<()>>,
}

impl Resolution {
    pub fn source(&self) -> Source {
        match self.state {
            ResolveState::Resolved(source) => source,
            _ => Source::None,
        }
    }

    /// Wait for the background publish, if any. The recipe does not depend on it.
    pub async fn settle(&mut self) {
        if let Some(handle) = self.publish.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "shared cache publish task did not complete");
            }
        }
    }
}

/// Runs the local → shared → generate pipeline
pub struct RecipeResolver {
    clock: Arc<dyn Clock>,
    style: DateStyle,
    local: LocalCache,
    shared: SharedCache,
    generator: Option<Arc<dyn RecipeGenerator>>,
    timeout: Duration,
}

impl RecipeResolver {
    pub fn new(
        local: LocalCache,
        shared: SharedCache,
        generator: Option<Arc<dyn RecipeGenerator>>,
    ) -> Self {
        Self {
            clock: Arc::new(SystemClock),
            style: DateStyle::default(),
            local,
            shared,
            generator,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Wire the real collaborators described by `config`
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let local = LocalCache::new(Arc::new(FileStore::new(storage_path(&config.cache_dir))));

        let shared = match &config.shared {
            Some(cfg) => SharedCache::new(Arc::new(SupabaseStore::new(cfg)?)),
            None => SharedCache::disabled(),
        };

        let generator: Option<Arc<dyn RecipeGenerator>> = match &config.generator {
            Some(cfg) => Some(Arc::new(GeminiClient::new(cfg)?)),
            None => None,
        };

        let timeout = config
            .generator
            .as_ref()
            .map(|g| g.timeout)
            .unwrap_or(DEFAULT_TIMEOUT);

        Ok(Self::new(local, shared, generator)
            .with_style(config.date_style)
            .with_timeout(timeout))
    }

    #[cfg(test)]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_style(mut self, style: DateStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Today's keys, from a single reading of the clock
    pub fn today(&self) -> Today {
        Today::at(self.clock.now(), self.style)
    }

    /// Run one resolution to a terminal state
    pub async fn resolve(&self) -> Resolution {
        let today = self.today();
        let mut state = ResolveState::Idle;
        debug!(date_key = %today.date_key, tag = %today.freshness_tag, "resolving daily recipe");

        advance(&mut state, ResolveState::CheckingLocal);
        if let Some(recipe) = self.local.read(&today.freshness_tag) {
            advance(&mut state, ResolveState::Resolved(Source::Local));
            return Resolution {
                today,
                state,
                recipe: Some(recipe),
                failure: None,
                publish: None,
            };
        }

        advance(&mut state, ResolveState::CheckingShared);
        match self.shared.read(&today.date_key).await {
            SharedLookup::Hit(recipe) => {
                self.local.write(&recipe, &today.freshness_tag);
                advance(&mut state, ResolveState::Resolved(Source::Shared));
                return Resolution {
                    today,
                    state,
                    recipe: Some(recipe),
                    failure: None,
                    publish: None,
                };
            }
            SharedLookup::Miss => {}
            SharedLookup::Unavailable => debug!("shared cache not configured"),
        }

        advance(&mut state, ResolveState::Generating);
        match self.generate().await {
            Ok(recipe) => {
                info!(title = %recipe.title, "generated today's recipe");
                self.local.write(&recipe, &today.freshness_tag);
                let publish = self.shared.publish(&today.date_key, &recipe);
                advance(&mut state, ResolveState::Resolved(Source::Generated));
                Resolution {
                    today,
                    state,
                    recipe: Some(recipe),
                    failure: None,
                    publish,
                }
            }
            Err(e) => {
                error!(error = %e, "no recipe available today");
                advance(&mut state, ResolveState::Failed);
                Resolution {
                    today,
                    state,
                    recipe: None,
                    failure: Some(e.to_string()),
                    publish: None,
                }
            }
        }
    }

    async fn generate(&self) -> Result<Recipe, GenerateError> {
        let generator = self.generator.as_ref().ok_or(GenerateError::NotConfigured)?;
        tokio::time::timeout(self.timeout, generator.generate())
            .await
            .map_err(|_| GenerateError::Timeout(self.timeout))?
    }
}

fn advance(state: &mut ResolveState, next: ResolveState) {
    debug!(from = ?state, to = ?next, "resolution state");
    *state = next;
}

#[cfg(test)]
pub(crate) mod fakes;
