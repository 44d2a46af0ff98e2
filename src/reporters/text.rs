//! Text (terminal) reporter with colors and formatting

use super::{pct, thousands};
use crate::models::{Card, Grade, MetaSnapshot};
use anyhow::Result;

const TOP_CARDS: usize = 15;
const MAX_IRREGULAR: usize = 8;

/// Grade colors (ANSI escape codes)
fn grade_color(grade: Grade) -> &'static str {
    match grade {
        Grade::APlus | Grade::A => "\x1b[32m", // Green
        Grade::BPlus | Grade::B => "\x1b[92m", // Light green
        Grade::CPlus | Grade::C => "\x1b[33m", // Yellow
        Grade::D => "\x1b[91m",                // Light red
        Grade::F => "\x1b[31m",                // Red
        Grade::NotAvailable => "\x1b[90m",     // Gray
    }
}

/// Reset ANSI color
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RULE: &str = "──────────────────────────────────────";

/// Render snapshot as formatted terminal output
pub fn render(snapshot: &MetaSnapshot) -> Result<String> {
    let mut out = String::new();

    // Header
    out.push_str(&format!(
        "\n{BOLD}{} {} Meta Analysis{RESET}\n",
        snapshot.expansion, snapshot.format
    ));
    out.push_str(&format!("{DIM}{RULE}{RESET}\n"));
    out.push_str(&format!(
        "Cards: {}  Games: {}  Sleepers: {}  Traps: {}  No data: {}\n",
        snapshot.total_cards,
        thousands(snapshot.total_games_analyzed),
        snapshot.sleeper_cards.len(),
        snapshot.trap_cards.len(),
        snapshot.no_data_cards.len()
    ));
    out.push_str(&format!(
        "{DIM}Generated {}{RESET}\n\n",
        snapshot.timestamp.format("%Y-%m-%d %H:%M")
    ));

    // Colors on one line each
    out.push_str(&format!("{BOLD}COLORS{RESET}\n"));
    for color in snapshot.top_colors() {
        out.push_str(&format!(
            "  {:>2}. {}  {}  {DIM}{} playables  top: {}{RESET}\n",
            color.rank,
            color.color,
            format_score(color.strength_score),
            color.playable_count,
            color.top_commons.first().map(String::as_str).unwrap_or("-")
        ));
    }
    out.push('\n');

    if !snapshot.archetypes.is_empty() {
        out.push_str(&format!("{BOLD}ARCHETYPES{RESET}\n"));
        for arch in snapshot.top_archetypes().into_iter().take(10) {
            let label = format!("{} ({})", arch.guild_name(), arch.colors());
            out.push_str(&format!(
                "  {:>2}. {:<20} {}  {DIM}share {}  lift {:+.2}%p{RESET}\n",
                arch.rank,
                label,
                pct(arch.win_rate(), 2),
                pct(arch.meta_share, 1),
                arch.synergy_lift * 100.0
            ));
            for variant in arch.variants.iter().take(2) {
                out.push_str(&format!(
                    "      {DIM}+{} {} ({:+.1}%p){RESET}\n",
                    variant.added_color,
                    pct(variant.win_rate, 1),
                    variant.win_rate_delta * 100.0
                ));
            }
        }
        out.push('\n');
    }

    if let Some(speed) = &snapshot.format_speed {
        out.push_str(&format!("{BOLD}FORMAT{RESET}\n"));
        out.push_str(&format!(
            "  Speed: {BOLD}{}{RESET}  tempo {:.3}  aggro {:+.2}%p\n",
            speed.speed_label,
            speed.tempo_ratio,
            speed.aggro_advantage * 100.0
        ));
        if let Some(length) = speed.average_game_length {
            out.push_str(&format!("  Avg game length: {:.1} turns\n", length));
        }
        for conflict in &speed.conflicts {
            out.push_str(&format!("  \x1b[33m! {}{RESET}\n", conflict));
        }
        if let Some(splash) = &snapshot.splash_indicator {
            out.push_str(&format!(
                "  Splash: {BOLD}{}{RESET}  {} dual lands, {} fixers\n",
                splash.splash_label, splash.dual_land_count, splash.mana_fixer_count
            ));
        }
        out.push('\n');
    }

    // Top cards as table
    let top = snapshot.top_cards(TOP_CARDS);
    if !top.is_empty() {
        out.push_str(&format!("{BOLD}TOP CARDS{RESET}\n"));
        out.push_str(&format!(
            "{DIM}  #   GR   SCORE  GIH WR   CARD{RESET}\n"
        ));
        for (i, card) in top.iter().enumerate() {
            out.push_str(&format_card_row(i + 1, card));
        }
        out.push('\n');
    }

    render_irregular(&mut out, "SLEEPERS", "\x1b[32m", &snapshot.sleeper_cards);
    render_irregular(&mut out, "TRAPS", "\x1b[31m", &snapshot.trap_cards);

    if let Some(overview) = &snapshot.llm.format_overview {
        out.push_str(&format!("{BOLD}OVERVIEW{RESET}\n{}\n\n", overview));
    }
    if let Some(tips) = &snapshot.llm.strategy_tips {
        out.push_str(&format!("{BOLD}STRATEGY TIPS{RESET}\n{}\n\n", tips));
    }

    if snapshot.llm.is_empty() {
        out.push_str(&format!(
            "{DIM}Run with --report markdown or html for the full guide.{RESET}\n"
        ));
    }

    Ok(out)
}

fn render_irregular(out: &mut String, title: &str, color: &str, cards: &[Card]) {
    if cards.is_empty() {
        return;
    }
    out.push_str(&format!("{BOLD}{title}{RESET} ({})\n", cards.len()));
    for card in cards.iter().take(MAX_IRREGULAR) {
        out.push_str(&format!(
            "  {color}{:+.2}{RESET}  {:<28} {DIM}{} {}{RESET}\n",
            card.irregularity_z,
            truncate(card.name(), 28),
            card.colors(),
            card.stats.gih_wr.map(|wr| pct(wr, 1)).unwrap_or_else(|| "-".into())
        ));
    }
    out.push('\n');
}

fn format_card_row(rank: usize, card: &Card) -> String {
    let grade_c = grade_color(card.grade);
    let wr = card
        .stats
        .gih_wr
        .map(|wr| pct(wr, 2))
        .unwrap_or_else(|| "-".into());
    format!(
        "  {DIM}{:>3}{RESET}  {grade_c}{:<3}{RESET}  {:>5.1}  {:>7}  {} {DIM}{}{RESET}\n",
        rank,
        card.grade,
        card.composite_score,
        wr,
        card.name(),
        card.colors()
    )
}

/// Truncate on char boundaries; card names can be non-ASCII
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let head: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", head)
}

fn format_score(score: f64) -> String {
    let color = if score >= 60.0 {
        "\x1b[32m"
    } else if score >= 45.0 {
        "\x1b[33m"
    } else {
        "\x1b[31m"
    };
    format!("{color}{:>5.1}{RESET}", score)
}
