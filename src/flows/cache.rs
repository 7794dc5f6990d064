//! Cache flows - Inspect or reset the device-local cache

use anyhow::{Context, Result};
use serde::Serialize;
use std::io;
use std::sync::Arc;

use crate::cache::local::{FileStore, LocalCache};
use crate::core::config::Config;
use crate::core::date::{Clock, SystemClock, Today};
use crate::core::model::RecipeView;
use crate::core::paths::storage_path;
use crate::core::render::{recipe_markdown, RenderConfig, Renderer, ToMarkdown};

/// What `cache show` reports
#[derive(Debug, Clone, Serialize)]
pub struct CacheReport {
    pub path: String,
    pub today_tag: String,
    pub tag: Option<String>,
    pub fresh: bool,
    pub recipe: Option<RecipeView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
}

impl ToMarkdown for CacheReport {
    fn to_markdown(&self) -> String {
        let mut output = format!("## Local cache\n\n- path: `{}`\n", self.path);
        output.push_str(&format!(
            "- tag: {}\n",
            self.tag.as_deref().unwrap_or("(none)")
        ));
        output.push_str(&format!(
            "- fresh today ({}): {}\n",
            self.today_tag,
            if self.fresh { "yes" } else { "no" }
        ));
        if let Some(problem) = &self.problem {
            output.push_str(&format!("- problem: {}\n", problem));
        }
        if let Some(recipe) = &self.recipe {
            output.push('\n');
            output.push_str(&recipe_markdown(recipe));
        }
        output
    }
}

/// Build the cache report without touching the network
pub fn inspect(config: &Config, today: &Today) -> CacheReport {
    let store = FileStore::new(storage_path(&config.cache_dir));
    let path = store.path().to_string_lossy().to_string();
    let entry = LocalCache::new(Arc::new(store)).entry();

    let fresh = entry.recipe.is_some()
        && entry.problem.is_none()
        && entry.tag.as_deref() == Some(today.freshness_tag.as_str());

    CacheReport {
        path,
        today_tag: today.freshness_tag.clone(),
        tag: entry.tag,
        fresh,
        recipe: entry.recipe.as_ref().map(RecipeView::from),
        problem: entry.problem,
    }
}

/// Run `cache show`
pub fn run_show(config: &Config, render_config: RenderConfig) -> Result<()> {
    let today = Today::at(SystemClock.now(), config.date_style);
    let report = inspect(config, &today);
    Renderer::with_config(render_config).render_to(&report, io::stdout().lock())?;
    Ok(())
}

/// Run `cache clear`
pub fn run_clear(config: &Config) -> Result<()> {
    let store = FileStore::new(storage_path(&config.cache_dir));
    LocalCache::new(Arc::new(store))
        .clear()
        .context("Failed to clear local cache")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::date::DateStyle;
    use crate::core::model::sample_recipe;
    use tempfile::tempdir;

    fn config(dir: &std::path::Path) -> Config {
        Config {
            cache_dir: dir.to_path_buf(),
            date_style: DateStyle::PtBr,
            shared: None,
            generator: None,
        }
    }

    fn today() -> Today {
        Today {
            date_key: "2026-10-19".to_string(),
            freshness_tag: "19/10/2026".to_string(),
        }
    }

    #[test]
    fn test_inspect_empty() {
        let temp = tempdir().unwrap();
        let report = inspect(&config(temp.path()), &today());
        assert!(!report.fresh);
        assert!(report.recipe.is_none());
        assert!(report.tag.is_none());
    }

    #[test]
    fn test_inspect_fresh_then_clear() {
        let temp = tempdir().unwrap();
        let cfg = config(temp.path());
        let store = FileStore::new(storage_path(&cfg.cache_dir));
        LocalCache::new(Arc::new(store)).write(&sample_recipe(), "19/10/2026");

        let report = inspect(&cfg, &today());
        assert!(report.fresh);
        assert_eq!(report.recipe.unwrap().title, "Espeto de Frutas");

        run_clear(&cfg).unwrap();
        assert!(inspect(&cfg, &today()).recipe.is_none());
    }

    #[test]
    fn test_inspect_stale() {
        let temp = tempdir().unwrap();
        let cfg = config(temp.path());
        let store = FileStore::new(storage_path(&cfg.cache_dir));
        LocalCache::new(Arc::new(store)).write(&sample_recipe(), "18/10/2026");

        let report = inspect(&cfg, &today());
        assert!(!report.fresh);
        assert_eq!(report.tag.as_deref(), Some("18/10/2026"));
    }
}
