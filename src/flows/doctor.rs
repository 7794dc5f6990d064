//! Doctor - Configuration checking

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io;

use crate::core::config::Config;
use crate::core::date::{Clock, SystemClock, Today};
use crate::core::paths::storage_path;
use crate::core::render::{RenderConfig, Renderer, ToMarkdown};

/// Status of one collaborator
#[derive(Debug, Clone, Serialize)]
pub struct CollaboratorStatus {
    pub name: String,
    pub configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub notes: String,
}

/// What `doctor` reports
#[derive(Debug, Clone, Serialize)]
pub struct DoctorReport {
    pub storage: String,
    pub date_style: String,
    pub today: Today,
    pub collaborators: Vec<CollaboratorStatus>,
}

impl ToMarkdown for DoctorReport {
    fn to_markdown(&self) -> String {
        let mut output = String::from("## Doctor\n\n");
        output.push_str(&format!("- local store: `{}`\n", self.storage));
        output.push_str(&format!(
            "- today: {} (shared key) / {} (local tag, {})\n\n",
            self.today.date_key, self.today.freshness_tag, self.date_style
        ));
        for c in &self.collaborators {
            let mark = if c.configured {
                "✓".green()
            } else {
                "✗".yellow()
            };
            output.push_str(&format!("- {} {}", mark, c.name));
            if let Some(detail) = &c.detail {
                output.push_str(&format!(" ({})", detail));
            }
            output.push_str(&format!("\n  Note: {}\n", c.notes));
        }
        output
    }
}

/// Check which collaborators are configured
pub fn check_config(config: &Config) -> Vec<CollaboratorStatus> {
    vec![
        CollaboratorStatus {
            name: "shared-cache".to_string(),
            configured: config.shared.is_some(),
            detail: config
                .shared
                .as_ref()
                .map(|s| format!("{} table {}", s.url, s.table)),
            notes: "Set SUPABASE_URL and SUPABASE_ANON_KEY to share one recipe per day"
                .to_string(),
        },
        CollaboratorStatus {
            name: "generator".to_string(),
            configured: config.generator.is_some(),
            detail: config
                .generator
                .as_ref()
                .map(|g| format!("{} timeout {}s", g.model, g.timeout.as_secs())),
            notes: "Set GEMINI_API_KEY to generate recipes when both caches miss".to_string(),
        },
    ]
}

/// Run the doctor command
pub fn run_doctor(config: &Config, render_config: RenderConfig) -> Result<()> {
    let report = DoctorReport {
        storage: storage_path(&config.cache_dir)
            .to_string_lossy()
            .to_string(),
        date_style: config.date_style.to_string(),
        today: Today::at(SystemClock.now(), config.date_style),
        collaborators: check_config(config),
    };

    Renderer::with_config(render_config).render_to(&report, io::stdout().lock())?;

    if report.collaborators.iter().all(|c| !c.configured) {
        eprintln!("\n⚠️  Nothing configured: only locally cached recipes can be shown.");
    }

    Ok(())
}
