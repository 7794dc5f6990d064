//! Today flow - Resolve and render the daily recipe

use anyhow::Result;
use std::io;

use crate::core::config::Config;
use crate::core::model::{RecipeReport, ReportError};
use crate::core::render::{RenderConfig, Renderer};
use crate::pipeline::view::DailyRecipe;
use crate::pipeline::RecipeResolver;

/// Run the today command
pub async fn run_today(config: &Config, render_config: RenderConfig) -> Result<()> {
    let daily = DailyRecipe::new(RecipeResolver::from_config(config)?);
    let state = daily.subscribe();
    let mut resolution = daily.load().await;

    let state = state.borrow().clone();
    let mut errors = Vec::new();
    if state.recipe.is_none() {
        let mut message = "no recipe available today".to_string();
        if let Some(reason) = &resolution.failure {
            message = format!("{}: {}", message, reason);
        }
        errors.push(ReportError::new("NO_RECIPE", message));
    }

    let report = RecipeReport {
        date_key: resolution.today.date_key.clone(),
        freshness_tag: resolution.today.freshness_tag.clone(),
        source: resolution.source(),
        recipe: state.recipe,
        errors,
    };

    Renderer::with_config(render_config).render_to(&report, io::stdout().lock())?;

    // keep the process alive until the shared publish has landed
    resolution.settle().await;
    Ok(())
}
