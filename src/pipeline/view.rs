//! What the UI observes: an in-flight flag and the resolved recipe

use tokio::sync::watch;
use tracing::info;

use crate::core::model::RecipeView;
use crate::pipeline::{RecipeResolver, Resolution};

/// Snapshot published to subscribers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeState {
    pub loading: bool,
    pub recipe: Option<RecipeView>,
}

/// Owns the resolver; the UI only ever sees [`RecipeState`]
pub struct DailyRecipe {
    resolver: RecipeResolver,
    state: watch::Sender<RecipeState>,
}

impl DailyRecipe {
    pub fn new(resolver: RecipeResolver) -> Self {
        let (state, _) = watch::channel(RecipeState::default());
        Self { resolver, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<RecipeState> {
        self.state.subscribe()
    }

    /// Resolve once and publish the outcome
    pub async fn load(&self) -> Resolution {
        self.state.send_modify(|s| s.loading = true);
        info!("loading today's recipe");

        let resolution = self.resolver.resolve().await;

        let recipe = resolution.recipe.as_ref().map(RecipeView::from);
        self.state.send_replace(RecipeState {
            loading: false,
            recipe,
        });
        resolution
    }
}
