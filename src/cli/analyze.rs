//! `draftmeta analyze` - full pipeline with spinner progress

use crate::ai::TextGenerator;
use crate::config::{AnalyzerConfig, UserConfig};
use crate::pipeline::{AnalysisOptions, MetaAnalyzer, ProgressSink};
use crate::reporters::{report_with_format, write_report, write_snapshot, OutputFormat};
use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::warn;

/// Pipeline progress on a terminal spinner
pub(super) struct SpinnerProgress {
    bar: ProgressBar,
}

impl SpinnerProgress {
    pub(super) fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(create_spinner_style());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }
}

impl ProgressSink for SpinnerProgress {
    fn step(&mut self, step: usize, total: usize, message: &str) {
        self.bar.set_message(format!("[{}/{}] {}", step, total, message));
    }

    fn finish(&mut self) {
        self.bar.finish_and_clear();
    }
}

fn create_spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg}")
        .map(|s| s.tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "))
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// LLM client from the user's keys; `None` (with a notice) when unavailable
fn build_generator(config: &AnalyzerConfig) -> Option<Box<dyn TextGenerator>> {
    let user = match UserConfig::load() {
        Ok(user) => user,
        Err(e) => {
            warn!("Failed to load user config: {:#}", e);
            return None;
        }
    };
    match user.ai_client(config.llm.ai_config()) {
        Ok(client) => Some(Box::new(client)),
        Err(e) => {
            eprintln!("{}LLM sections skipped: {}", style("⚠️  ").yellow(), e);
            None
        }
    }
}

pub(super) fn run(
    config: AnalyzerConfig,
    set: &str,
    format: &str,
    options: AnalysisOptions,
    report: &str,
    output: Option<&Path>,
) -> Result<()> {
    let report_format = OutputFormat::from_str(report)?;
    let start = Instant::now();

    let generator = if options.no_llm {
        None
    } else {
        build_generator(&config)
    };
    let mut analyzer = MetaAnalyzer::from_config(config);
    if let Some(generator) = generator {
        analyzer = analyzer.with_generator(generator);
    }

    let mut progress = SpinnerProgress::new();
    let result = analyzer.analyze(set, format, &options, &mut progress);
    if result.is_err() {
        progress.finish();
    }
    let snapshot = result?;

    let Some(dir) = output else {
        println!("{}", report_with_format(&snapshot, report_format)?);
        return Ok(());
    };

    println!("{}", report_with_format(&snapshot, OutputFormat::Text)?);

    let mut saved = Vec::new();
    if !matches!(report_format, OutputFormat::Text | OutputFormat::Json) {
        saved.push(write_report(&snapshot, report_format, dir)?);
    }
    saved.push(write_snapshot(&snapshot, dir)?);

    for path in &saved {
        println!("{}Saved {}", style("✓ ").green(), path.display());
    }
    println!(
        "{}",
        style(format!("Done in {:.1}s", start.elapsed().as_secs_f64())).dim()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_progress_message() {
        let mut progress = SpinnerProgress {
            bar: ProgressBar::hidden(),
        };
        progress.step(3, 10, "Scoring cards");
        assert_eq!(progress.bar.message(), "[3/10] Scoring cards");
        progress.finish();
        assert!(progress.bar.is_finished());
    }
}
