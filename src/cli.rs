//! CLI module - Command-line interface definitions and handlers

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::core::config::{Config, GeneratorConfig, SharedStoreConfig};
use crate::core::date::DateStyle;
use crate::core::paths::cache_dir;
use crate::core::render::{OutputFormat, RenderConfig};

/// receita - today's healthy snack recipe, cached locally and shared across devices.
#[derive(Parser, Debug)]
#[command(name = "receita")]
#[command(
    author,
    version,
    about,
    long_about = r#"receita resolves one snack recipe per calendar day.

Resolution order:
1. the device-local cache under ROOT/.receita (no network at all)
2. the shared cache, keyed by the UTC date (when SUPABASE_* is set)
3. the generator (when GEMINI_API_KEY is set), whose result is cached
   locally and published to the shared cache

Output formats:
- jsonl: one JSON object on one line (default)
- json: a single JSON array
- md: human-friendly Markdown

Examples:
    receita today
    receita today --format md
    receita cache show
    receita doctor
"#
)]
pub struct Cli {
    /// Root directory of this device's local storage.
    #[arg(
        long,
        global = true,
        default_value = ".",
        value_name = "ROOT",
        long_help = "Root directory of this device's local storage (defaults to the current\n\
directory). The local cache is kept in ROOT/.receita/storage.json."
    )]
    pub root: PathBuf,

    /// Output format (jsonl/json/md).
    #[arg(long, global = true, default_value = "jsonl", value_name = "FORMAT")]
    pub format: String,

    /// Disable colored output (when applicable).
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (errors only on stderr).
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug diagnostics on stderr).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Pretty-print JSON/JSONL output with indentation.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Shared store (Supabase) project URL.
    #[arg(long, global = true, env = "SUPABASE_URL", value_name = "URL")]
    pub supabase_url: Option<String>,

    /// Shared store API key.
    #[arg(
        long,
        global = true,
        env = "SUPABASE_ANON_KEY",
        hide_env_values = true,
        value_name = "KEY"
    )]
    pub supabase_key: Option<String>,

    /// Shared store table holding one row per date.
    #[arg(long, global = true, env = "RECIPE_TABLE", value_name = "TABLE")]
    pub table: Option<String>,

    /// Generation service API key.
    #[arg(
        long,
        global = true,
        env = "GEMINI_API_KEY",
        hide_env_values = true,
        value_name = "KEY"
    )]
    pub gemini_key: Option<String>,

    /// Generative model name.
    #[arg(long, global = true, env = "GEMINI_MODEL", value_name = "MODEL")]
    pub model: Option<String>,

    /// Generation API base URL.
    #[arg(long, global = true, env = "GEMINI_ENDPOINT", value_name = "URL", hide = true)]
    pub endpoint: Option<String>,

    /// Seconds to wait for the generator before giving up.
    #[arg(
        long,
        global = true,
        env = "RECIPE_TIMEOUT_SECS",
        default_value = "30",
        value_name = "SECS"
    )]
    pub timeout_secs: u64,

    /// How the local freshness tag is rendered (auto/pt-BR/en-US/iso).
    #[arg(
        long,
        global = true,
        env = "RECIPE_DATE_STYLE",
        default_value = "auto",
        value_name = "STYLE",
        long_help = "How the local cache's freshness tag is rendered.\n\n\
Supported values:\n\
- auto (default): follow the system locale\n\
- pt-BR: 19/10/2026\n\
- en-US: 10/19/2026\n\
- iso: 2026-10-19\n\n\
Changing the style makes an existing local entry stale."
    )]
    pub date_style: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show today's recipe, resolving it if needed.
    #[command(
        long_about = "Resolve today's recipe through the local cache, the shared cache and\n\
the generator, in that order, stopping at the first hit.\n\n\
When nothing can produce a recipe the report carries a NO_RECIPE error and\n\
no recipe; the command still succeeds.\n\n\
Examples:\n\
  receita today\n\
  receita today --format md\n"
    )]
    Today,

    /// Inspect or reset the local cache.
    Cache {
        #[command(subcommand)]
        action: CacheCommands,
    },

    /// Print the prompt and response schema sent to the generator.
    Prompt,

    /// Check which collaborators are configured.
    Doctor,
}

#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Show the cached entry and whether it is fresh today.
    Show,

    /// Remove the cached entry.
    Clear,
}

impl Cli {
    /// Configuration for commands that only touch this device; collaborators stay unset
    pub fn local_config(&self) -> Result<Config> {
        let root = self.root.canonicalize().unwrap_or_else(|_| self.root.clone());
        let date_style: DateStyle = self
            .date_style
            .parse()
            .map_err(anyhow::Error::msg)
            .context("Invalid --date-style")?;

        Ok(Config {
            cache_dir: cache_dir(&root),
            date_style,
            shared: None,
            generator: None,
        })
    }

    /// Full runtime configuration, including the shared store and generator
    pub fn config(&self) -> Result<Config> {
        let mut config = self.local_config()?;
        config.shared = SharedStoreConfig::from_parts(
            self.supabase_url.clone(),
            self.supabase_key.clone(),
            self.table.clone(),
        )?;
        config.generator = GeneratorConfig::from_parts(
            self.gemini_key.clone(),
            self.model.clone(),
            self.endpoint.clone(),
            Duration::from_secs(self.timeout_secs),
        )?;
        Ok(config)
    }
}

/// Install the stderr log subscriber
pub fn init_logging(cli: &Cli) {
    let default_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = if cli.verbose || cli.quiet {
        EnvFilter::new(format!("receita={}", default_level))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("receita={}", default_level)))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .with_target(false)
        .try_init();
}

/// Run the CLI with parsed arguments
pub async fn run(cli: Cli) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    let format: OutputFormat = cli.format.parse().unwrap_or_default();
    let render_config = RenderConfig::with_pretty(format, cli.pretty);

    match &cli.command {
        Commands::Today => crate::flows::today::run_today(&cli.config()?, render_config).await,

        Commands::Cache { action } => {
            let config = cli.local_config()?;
            match action {
                CacheCommands::Show => crate::flows::cache::run_show(&config, render_config),
                CacheCommands::Clear => crate::flows::cache::run_clear(&config),
            }
        }

        Commands::Prompt => crate::flows::prompt::run_prompt(render_config),

        Commands::Doctor => crate::flows::doctor::run_doctor(&cli.config()?, render_config),
    }
}
