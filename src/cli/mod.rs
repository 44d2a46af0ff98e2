//! CLI command definitions and handlers

mod analyze;
mod cache;
mod card;

use crate::config::{load_analyzer_config, AnalyzerConfig};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Draftmeta - 17lands-driven Limited meta analysis
#[derive(Parser, Debug)]
#[command(name = "draftmeta")]
#[command(
    version,
    about = "Limited draft meta analysis from 17lands data: card grades, sleepers and traps, archetypes, format speed",
    after_help = "\
Examples:
  draftmeta analyze FDN                          Analyze Foundations Premier Draft
  draftmeta analyze FDN -f QuickDraft --no-llm   Quick Draft, no LLM sections
  draftmeta analyze FDN --report html -o out     Save an HTML draft guide to out/
  draftmeta card FDN \"Llanowar Elves\"            Look up one card
  draftmeta cache clear                          Drop cached API responses"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Analyzer config file (default: ./draftmeta.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full meta analysis for a set
    Analyze {
        /// Set code, e.g. FDN
        set: String,

        /// 17lands event format
        #[arg(long, short = 'f', default_value = "PremierDraft")]
        format: String,

        /// Skip LLM-written sections
        #[arg(long)]
        no_llm: bool,

        /// Skip trophy deck statistics
        #[arg(long)]
        no_trophy: bool,

        /// Ignore saved trophy statistics and fetch them again
        #[arg(long, conflicts_with = "no_trophy")]
        refresh_trophy: bool,

        /// Report format: text, json, markdown (or md), html
        #[arg(long, short = 'r', default_value = "text", value_parser = ["text", "json", "markdown", "md", "html"])]
        report: String,

        /// Directory for saved reports (the JSON snapshot is always saved alongside)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Show scores and archetype performance for one card
    Card {
        /// Set code, e.g. FDN
        set: String,

        /// Card name (case-insensitive)
        name: String,

        /// 17lands event format
        #[arg(long, short = 'f', default_value = "PremierDraft")]
        format: String,
    },

    /// Inspect or clear the on-disk caches
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Show version info
    Version,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheAction {
    /// Entry counts and size of the response cache
    Stats,
    /// Delete cached responses and trophy statistics
    Clear,
}

/// `--config` when given, otherwise `draftmeta.toml` in the working directory
fn load_config(explicit: Option<&Path>) -> Result<AnalyzerConfig> {
    match explicit {
        Some(path) => AnalyzerConfig::from_file(path),
        None => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            Ok(load_analyzer_config(&cwd))
        }
    }
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze {
            set,
            format,
            no_llm,
            no_trophy,
            refresh_trophy,
            report,
            output,
        } => {
            let options = crate::pipeline::AnalysisOptions {
                no_llm,
                no_trophy,
                refresh_trophy,
            };
            analyze::run(
                config,
                &set.to_uppercase(),
                &format,
                options,
                &report,
                output.as_deref(),
            )
        }

        Commands::Card { set, name, format } => {
            card::run(config, &set.to_uppercase(), &format, &name)
        }

        Commands::Cache { action } => match action {
            CacheAction::Stats => cache::stats(&config),
            CacheAction::Clear => cache::clear(&config),
        },

        Commands::Version => {
            println!("draftmeta {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
