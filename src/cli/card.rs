//! `draftmeta card` - one card's scores and archetype performance

use crate::analysis::CardEvaluator;
use crate::config::AnalyzerConfig;
use crate::models::{Card, Grade, MetaSnapshot};
use crate::pipeline::{AnalysisOptions, MetaAnalyzer, ProgressSink};
use anyhow::{bail, Result};
use console::style;

use super::analyze::SpinnerProgress;

const MAX_SUGGESTIONS: usize = 5;
const BAR_FLOOR: f64 = 0.40;

pub(super) fn run(config: AnalyzerConfig, set: &str, format: &str, name: &str) -> Result<()> {
    let mut analyzer = MetaAnalyzer::from_config(config);
    let mut progress = SpinnerProgress::new();
    let result = analyzer.analyze(set, format, &AnalysisOptions::quick(), &mut progress);
    if result.is_err() {
        progress.finish();
    }
    let snapshot = result?;

    let evaluator = CardEvaluator::new(&snapshot);
    match evaluator.card(name) {
        Some(card) => {
            println!("{}", render_card(card));
            Ok(())
        }
        None => {
            let similar = suggestions(&snapshot, name);
            if similar.is_empty() {
                bail!("Card '{}' not found in {} {}", name, set, format);
            }
            println!("{}", style(format!("Card '{}' not found.", name)).yellow());
            println!("Did you mean:");
            for candidate in similar {
                println!("  - {}", candidate);
            }
            bail!("Card '{}' not found in {} {}", name, set, format)
        }
    }
}

/// Names containing `query`, case-insensitive
fn suggestions<'a>(snapshot: &'a MetaSnapshot, query: &str) -> Vec<&'a str> {
    let query = query.to_lowercase();
    snapshot
        .all_cards
        .iter()
        .map(Card::name)
        .filter(|n| n.to_lowercase().contains(&query))
        .take(MAX_SUGGESTIONS)
        .collect()
}

fn styled_grade(grade: Grade) -> String {
    let text = style(grade.as_str()).bold();
    match grade {
        Grade::APlus | Grade::A => text.green(),
        Grade::BPlus | Grade::B => text.cyan(),
        Grade::CPlus | Grade::C => text.yellow(),
        Grade::D | Grade::F => text.red(),
        Grade::NotAvailable => text.dim(),
    }
    .to_string()
}

fn opt_pct(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.1}%", v * 100.0))
        .unwrap_or_else(|| "N/A".to_string())
}

fn bar(win_rate: f64) -> String {
    let len = ((win_rate - BAR_FLOOR) * 100.0).max(0.0) as usize;
    "█".repeat(len)
}

fn render_card(card: &Card) -> String {
    let stats = &card.stats;
    let mut lines = vec![
        String::new(),
        format!(
            "{} {}",
            style(card.name()).bold(),
            style(format!("({}, {})", card.colors(), card.rarity())).dim()
        ),
        style("──────────────────────────────────────").dim().to_string(),
        format!("  Grade:          {}", styled_grade(card.grade)),
        format!("  Composite:      {:.1}", card.composite_score),
        format!("  GIH WR:         {}", opt_pct(stats.gih_wr)),
        format!("  Adjusted WR:    {}", opt_pct(stats.gih_wr.map(|_| card.adjusted_gih_wr))),
        format!("  Games (GIH):    {}", stats.gih_games),
        format!("  ALSA:           {:.2}", stats.alsa),
        format!(
            "  IWD:            {}",
            stats
                .iwd()
                .map(|v| format!("{:+.1}%p", v * 100.0))
                .unwrap_or_else(|| "N/A".to_string())
        ),
        format!("  Stability:      {:.1}", card.stability_score()),
        format!(
            "  Classification: {} ({:+.2})",
            card.irregularity, card.irregularity_z
        ),
    ];

    if let Some(meta) = &card.metadata {
        if let Some(type_line) = &meta.type_line {
            lines.push(format!("  Type:           {}", type_line));
        }
        if let Some(cost) = &meta.mana_cost {
            lines.push(format!("  Cost:           {}", cost));
        }
    }

    if !stats.archetype_wrs.is_empty() {
        lines.push(String::new());
        lines.push(style("Archetype performance").bold().to_string());
        let mut by_wr: Vec<(&String, &f64)> = stats.archetype_wrs.iter().collect();
        by_wr.sort_by(|a, b| b.1.total_cmp(a.1));
        for (pair, wr) in by_wr {
            let games = stats.archetype_games.get(pair).copied().unwrap_or(0);
            lines.push(format!(
                "  {:<3} {:>6}  {} {}",
                pair,
                format!("{:.1}%", wr * 100.0),
                style(bar(*wr)).green(),
                style(format!("({} games)", games)).dim()
            ));
        }
    }

    lines.join("\n")
}
