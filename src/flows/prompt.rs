//! Prompt flow - Show what the generator is asked for

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use std::io;

use crate::core::render::{RenderConfig, Renderer, ToMarkdown};
use crate::generate::prompt::{response_schema, RECIPE_PROMPT};

#[derive(Debug, Clone, Serialize)]
pub struct PromptReport {
    pub prompt: &'static str,
    pub response_schema: Value,
}

impl ToMarkdown for PromptReport {
    fn to_markdown(&self) -> String {
        let schema = serde_json::to_string_pretty(&self.response_schema).unwrap_or_default();
        format!(
            "## Prompt\n\n{}\n\n## Response schema\n\n```json\n{}\n```\n",
            self.prompt, schema
        )
    }
}

/// Run the prompt command
pub fn run_prompt(render_config: RenderConfig) -> Result<()> {
    let report = PromptReport {
        prompt: RECIPE_PROMPT,
        response_schema: response_schema(),
    };
    Renderer::with_config(render_config).render_to(&report, io::stdout().lock())?;
    Ok(())
}
