//! Renderer module
//!
//! Renders command reports to different output formats: jsonl, json, md

use colored::Colorize;
use serde::Serialize;
use std::io::Write;

use crate::core::model::{RecipeReport, RecipeView, Source};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Jsonl,
    Json,
    Markdown,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jsonl" => Ok(OutputFormat::Jsonl),
            "json" => Ok(OutputFormat::Json),
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Render configuration combining format and options
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl RenderConfig {
    /// Create a new render config with pretty option
    pub fn with_pretty(format: OutputFormat, pretty: bool) -> Self {
        Self { format, pretty }
    }
}

/// Human-readable rendering of a report
pub trait ToMarkdown {
    fn to_markdown(&self) -> String;
}

/// Renderer for command reports
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    /// Create a new renderer with render config
    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render a report to a string
    pub fn render<T: Serialize + ToMarkdown>(&self, report: &T) -> String {
        match self.config.format {
            OutputFormat::Jsonl => self.render_jsonl(report),
            OutputFormat::Json => self.render_json(report),
            OutputFormat::Markdown => report.to_markdown(),
        }
    }

    /// Render to a writer
    pub fn render_to<T: Serialize + ToMarkdown, W: Write>(
        &self,
        report: &T,
        mut writer: W,
    ) -> std::io::Result<()> {
        let output = self.render(report);
        writeln!(writer, "{}", output)
    }

    /// One JSON object on a single line
    fn render_jsonl<T: Serialize>(&self, report: &T) -> String {
        if self.config.pretty {
            serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
        } else {
            serde_json::to_string(report).unwrap_or_else(|_| "{}".to_string())
        }
    }

    /// A single-element JSON array
    fn render_json<T: Serialize>(&self, report: &T) -> String {
        let items = [report];
        if self.config.pretty {
            serde_json::to_string_pretty(&items).unwrap_or_else(|_| "[]".to_string())
        } else {
            serde_json::to_string(&items).unwrap_or_else(|_| "[]".to_string())
        }
    }
}

/// Markdown body for one recipe
pub fn recipe_markdown(recipe: &RecipeView) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", recipe.title.bold()));
    if !recipe.description.is_empty() {
        output.push_str(&format!("{}\n\n", recipe.description));
    }

    output.push_str("## Ingredientes\n\n");
    for item in &recipe.ingredients {
        output.push_str(&format!("- {}\n", item));
    }
    output.push('\n');

    output.push_str("## Modo de preparo\n\n");
    for (i, step) in recipe.instructions.iter().enumerate() {
        output.push_str(&format!("{}. {}\n", i + 1, step));
    }
    output.push('\n');

    if !recipe.benefits.is_empty() {
        output.push_str("## Benefícios\n\n");
        for benefit in &recipe.benefits {
            output.push_str(&format!("- {}\n", benefit));
        }
        output.push('\n');
    }

    if !recipe.quick_tip.is_empty() {
        output.push_str(&format!("> 💡 {}\n", recipe.quick_tip.italic()));
    }

    output
}

impl ToMarkdown for RecipeReport {
    fn to_markdown(&self) -> String {
        let mut output = String::new();

        if !self.errors.is_empty() {
            output.push_str("## Errors\n\n");
            for error in &self.errors {
                output.push_str(&format!("- **{}**: {}\n", error.code.red(), error.message));
            }
            output.push('\n');
        }

        match &self.recipe {
            Some(recipe) => {
                output.push_str(&recipe_markdown(recipe));
                let source = match self.source {
                    Source::Local => "cache local",
                    Source::Shared => "cache compartilhado",
                    Source::Generated => "gerada hoje",
                    Source::None => "indisponível",
                };
                output.push_str(&format!(
                    "\n_{} · {}_\n",
                    self.freshness_tag,
                    source.dimmed()
                ));
            }
            None => {
                output.push_str(&format!(
                    "Nenhuma receita disponível hoje ({}).\n",
                    self.freshness_tag
                ));
            }
        }

        output
    }
}
