//! Output reporters for meta snapshots
//!
//! Supports multiple output formats:
//! - `text` - Terminal output with colors
//! - `json` - The full snapshot as pretty-printed JSON
//! - `markdown` - GitHub-flavored Markdown meta report
//! - `html` - Standalone HTML draft guide

mod html;
mod json;
mod markdown;
mod text;

pub use json::write_snapshot;

use crate::models::MetaSnapshot;
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Markdown,
    Html,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "html" => Ok(OutputFormat::Html),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(anyhow!(
                "Unknown format '{}'. Valid formats: text, json, markdown, html",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Html => write!(f, "html"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// Render a snapshot in the named format
pub fn report(snapshot: &MetaSnapshot, format: &str) -> Result<String> {
    let fmt = OutputFormat::from_str(format)?;
    report_with_format(snapshot, fmt)
}

/// Render a snapshot using an OutputFormat enum
pub fn report_with_format(snapshot: &MetaSnapshot, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(snapshot),
        OutputFormat::Json => json::render(snapshot),
        OutputFormat::Html => html::render(snapshot),
        OutputFormat::Markdown => markdown::render(snapshot),
    }
}

/// File name for a saved report, dated by the snapshot timestamp
pub fn report_file_name(snapshot: &MetaSnapshot, format: OutputFormat) -> String {
    let stem = format!(
        "{}_{}_{}",
        snapshot.expansion,
        snapshot.format,
        snapshot.timestamp.format("%Y%m%d")
    );
    match format {
        OutputFormat::Text => format!("{}_meta.txt", stem),
        OutputFormat::Json => format!("{}_meta.json", stem),
        OutputFormat::Markdown => format!("{}_meta_report.md", stem),
        OutputFormat::Html => format!("{}_draft_guide.html", stem),
    }
}

/// Render and write a report into `dir`, creating it if needed
pub fn write_report(snapshot: &MetaSnapshot, format: OutputFormat, dir: &Path) -> Result<PathBuf> {
    let content = report_with_format(snapshot, format)?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    let path = dir.join(report_file_name(snapshot, format));
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write report {}", path.display()))?;
    info!("{} report saved to {}", format, path.display());
    Ok(path)
}

/// Percent with `decimals` places, `0.5512` -> `55.12%`
pub(crate) fn pct(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value * 100.0)
}

/// `1234567` -> `1,234,567`
pub(crate) fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
