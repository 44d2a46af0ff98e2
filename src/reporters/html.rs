//! HTML reporter with embedded styles
//!
//! Generates a standalone draft guide that can be viewed in any browser.
//! Includes:
//! - Headline numbers and format characteristics
//! - Color strength bars and archetype table with top cards per archetype
//! - Grade tier list, sleepers and traps
//! - LLM sections when present
//! - Responsive design for mobile and desktop

use super::{pct, thousands};
use crate::models::{Archetype, Card, Grade, MetaSnapshot};
use anyhow::Result;

const TIER_ORDER: [Grade; 8] = [
    Grade::APlus,
    Grade::A,
    Grade::BPlus,
    Grade::B,
    Grade::CPlus,
    Grade::C,
    Grade::D,
    Grade::F,
];
const ARCHETYPE_CARDS: usize = 8;
const MAX_IRREGULAR: usize = 10;

/// Render snapshot as standalone HTML
pub fn render(snapshot: &MetaSnapshot) -> Result<String> {
    let mut html = String::new();

    // DOCTYPE and head
    html.push_str(&render_head(snapshot));

    // Body
    html.push_str("<body>\n<div class=\"container\">\n");
    html.push_str(&render_header(snapshot));
    html.push_str("<div class=\"content\">\n");

    html.push_str(&render_stats(snapshot));
    html.push_str(&render_format(snapshot));
    html.push_str(&render_colors(snapshot));
    html.push_str(&render_archetypes(snapshot));
    html.push_str(&render_tiers(snapshot));
    html.push_str(&render_irregular(
        "💎 Sleepers",
        "sleeper",
        &snapshot.sleeper_cards,
    ));
    html.push_str(&render_irregular("⚠️ Traps", "trap", &snapshot.trap_cards));
    html.push_str(&render_llm(snapshot));

    html.push_str("</div>\n"); // content
    html.push_str(&render_footer());
    html.push_str("</div>\n</body>\n</html>");

    Ok(html)
}

fn render_head(snapshot: &MetaSnapshot) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="ko">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} {} Draft Guide</title>
    <style>
{CSS}
    </style>
</head>
"#,
        html_escape(&snapshot.expansion),
        html_escape(&snapshot.format)
    )
}

fn render_header(snapshot: &MetaSnapshot) -> String {
    format!(
        r#"<div class="header">
    <h1>{} {} Draft Guide</h1>
    <p class="timestamp">Generated {}</p>
</div>
"#,
        html_escape(&snapshot.expansion),
        html_escape(&snapshot.format),
        snapshot.timestamp.format("%Y-%m-%d %H:%M")
    )
}

fn render_stats(snapshot: &MetaSnapshot) -> String {
    let items = [
        ("Cards", snapshot.total_cards.to_string()),
        ("Games", thousands(snapshot.total_games_analyzed)),
        ("Sleepers", snapshot.sleeper_cards.len().to_string()),
        ("Traps", snapshot.trap_cards.len().to_string()),
    ];
    let mut html = String::from("<div class=\"section\">\n<div class=\"stats-grid\">\n");
    for (label, value) in items {
        html.push_str(&format!(
            "    <div class=\"stat-item\"><div class=\"stat-value\">{}</div><div class=\"stat-label\">{}</div></div>\n",
            value, label
        ));
    }
    html.push_str("</div>\n</div>\n");
    html
}

fn render_format(snapshot: &MetaSnapshot) -> String {
    let mut cards = String::new();
    if let Some(speed) = &snapshot.format_speed {
        let mut details = format!(
            "Tempo ratio {:.3} · 저마나 우위 {:+.2}%p",
            speed.tempo_ratio,
            speed.aggro_advantage * 100.0
        );
        if let Some(length) = speed.average_game_length {
            details.push_str(&format!(" · 평균 {:.1}턴", length));
        }
        cards.push_str(&format!(
            r#"        <div class="metric-card">
            <h3>속도</h3>
            <div class="metric-value">{}</div>
            <p class="muted">{}</p>
            <p>{}</p>
{}        </div>
"#,
            speed.speed_label,
            html_escape(&details),
            html_escape(&speed.recommendation),
            speed
                .conflicts
                .iter()
                .map(|c| format!("            <p class=\"conflict\">{}</p>\n", html_escape(c)))
                .collect::<String>()
        ));
    }
    if let Some(splash) = &snapshot.splash_indicator {
        cards.push_str(&format!(
            r#"        <div class="metric-card">
            <h3>스플래시</h3>
            <div class="metric-value">{}</div>
            <p class="muted">듀얼 랜드 {}장 · 픽서 {}장 · ALSA {:.2}</p>
            <p>{}</p>
        </div>
"#,
            splash.splash_label,
            splash.dual_land_count,
            splash.mana_fixer_count,
            splash.dual_land_alsa,
            html_escape(&splash.recommendation)
        ));
    }
    if cards.is_empty() {
        return String::new();
    }
    format!(
        "<div class=\"section\">\n    <h2 class=\"section-title\">📈 포맷 특성</h2>\n    <div class=\"metrics-grid\">\n{}    </div>\n</div>\n",
        cards
    )
}

fn render_colors(snapshot: &MetaSnapshot) -> String {
    let mut html = String::from(
        "<div class=\"section\">\n    <h2 class=\"section-title\">🎨 Colors</h2>\n    <div class=\"metrics-grid\">\n",
    );
    for color in snapshot.top_colors() {
        html.push_str(&format!(
            r#"        <div class="metric-card">
            <h3>#{} {} {}</h3>
            <div class="metric-value">{:.1}</div>
            <div class="metric-bar">
                <div class="metric-bar-fill {}" style="width: {:.0}%"></div>
            </div>
            <p class="muted">{} playables · {}</p>
        </div>
"#,
            color.rank,
            color_icon(&color.color),
            html_escape(&color.color),
            color.strength_score,
            bar_class(color.strength_score),
            color.strength_score.clamp(0.0, 100.0),
            color.playable_count,
            html_escape(&color.top_commons.iter().take(3).cloned().collect::<Vec<_>>().join(", "))
        ));
    }
    html.push_str("    </div>\n</div>\n");
    html
}

fn render_archetypes(snapshot: &MetaSnapshot) -> String {
    if snapshot.archetypes.is_empty() {
        return String::new();
    }
    let mut html = String::from(
        r#"<div class="section">
    <h2 class="section-title">🏛️ Archetypes</h2>
    <table>
        <tr><th>#</th><th>Archetype</th><th>Win Rate</th><th>Share</th><th>Signpost</th><th>Top Cards</th></tr>
"#,
    );
    for arch in snapshot.top_archetypes() {
        let top: Vec<String> = archetype_cards(snapshot, arch)
            .iter()
            .take(ARCHETYPE_CARDS)
            .map(|c| html_escape(c.name()))
            .collect();
        html.push_str(&format!(
            "        <tr><td>{}</td><td>{} ({})</td><td>{}</td><td>{}</td><td>{}</td><td class=\"muted\">{}</td></tr>\n",
            arch.rank,
            html_escape(arch.guild_name()),
            html_escape(arch.colors()),
            pct(arch.win_rate(), 2),
            pct(arch.meta_share, 1),
            html_escape(arch.signpost_uncommon.as_deref().unwrap_or("-")),
            top.join(", ")
        ));
    }
    html.push_str("    </table>\n</div>\n");
    html
}

/// Cards castable in the archetype, best archetype win rate first.
/// Cards without an archetype measurement fall back to their GIH WR.
fn archetype_cards<'a>(snapshot: &'a MetaSnapshot, arch: &Archetype) -> Vec<&'a Card> {
    let colors = arch.colors();
    let mut cards: Vec<(&Card, f64)> = snapshot
        .all_cards
        .iter()
        .filter(|c| c.colors().chars().all(|ch| colors.contains(ch)))
        .filter_map(|c| {
            let wr = c.archetype_wr(colors).or(c.stats.gih_wr)?;
            Some((c, wr))
        })
        .collect();
    cards.sort_by(|a, b| b.1.total_cmp(&a.1));
    cards.into_iter().map(|(c, _)| c).collect()
}

fn render_tiers(snapshot: &MetaSnapshot) -> String {
    let mut html = String::from(
        "<div class=\"section\">\n    <h2 class=\"section-title\">🏆 Tier List</h2>\n",
    );
    for grade in TIER_ORDER {
        let mut cards: Vec<&Card> = snapshot
            .all_cards
            .iter()
            .filter(|c| c.grade == grade)
            .collect();
        if cards.is_empty() {
            continue;
        }
        cards.sort_by(|a, b| b.composite_score.total_cmp(&a.composite_score));
        html.push_str(&format!(
            "    <div class=\"tier\"><span class=\"grade-badge grade-{}\">{}</span>",
            grade_class(grade),
            grade
        ));
        for card in cards {
            html.push_str(&format!(" {}", card_chip(card)));
        }
        html.push_str("</div>\n");
    }
    html.push_str("</div>\n");
    html
}

fn render_irregular(title: &str, class: &str, cards: &[Card]) -> String {
    if cards.is_empty() {
        return String::new();
    }
    let mut html = format!(
        "<div class=\"section\">\n    <h2 class=\"section-title\">{}</h2>\n    <table>\n        <tr><th>Card</th><th>Colors</th><th>Grade</th><th>GIH WR</th><th>Z</th></tr>\n",
        title
    );
    for card in cards.iter().take(MAX_IRREGULAR) {
        html.push_str(&format!(
            "        <tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:+.2}</td></tr>\n",
            class,
            card_chip(card),
            html_escape(card.colors()),
            card.grade,
            card.stats.gih_wr.map(|wr| pct(wr, 2)).unwrap_or_else(|| "-".into()),
            card.irregularity_z
        ));
    }
    html.push_str("    </table>\n</div>\n");
    html
}

fn render_llm(snapshot: &MetaSnapshot) -> String {
    let llm = &snapshot.llm;
    let sections = [
        ("🤖 Format Overview", &llm.format_overview),
        ("🧭 Format Characteristics", &llm.format_characteristics),
        ("🎨 Color Strategy", &llm.color_strategy),
        ("🏛️ Archetype Deep Dive", &llm.archetype_deep_dive),
        ("📝 Strategy Tips", &llm.strategy_tips),
    ];
    let mut html = String::new();
    for (title, body) in sections {
        let Some(body) = body else {
            continue;
        };
        let paragraphs: String = body
            .split("\n\n")
            .filter(|p| !p.trim().is_empty())
            .map(|p| format!("        <p>{}</p>\n", html_escape(p.trim()).replace('\n', "<br>")))
            .collect();
        html.push_str(&format!(
            "<div class=\"section llm\">\n    <h2 class=\"section-title\">{}</h2>\n{}</div>\n",
            title, paragraphs
        ));
    }
    html
}

fn render_footer() -> String {
    r#"<div class="footer">
    <p>Generated by draftmeta · data from 17lands and Scryfall</p>
</div>
"#
    .to_string()
}

fn card_chip(card: &Card) -> String {
    let name = html_escape(card.name());
    match card.metadata.as_ref().and_then(|m| m.scryfall_uri.as_deref()) {
        Some(uri) => format!("<a class=\"card\" href=\"{}\">{}</a>", html_escape(uri), name),
        None => format!("<span class=\"card\">{}</span>", name),
    }
}

fn color_icon(color: &str) -> &'static str {
    match color {
        "W" => "☀️",
        "U" => "💧",
        "B" => "💀",
        "R" => "🔥",
        "G" => "🌲",
        _ => "",
    }
}

fn grade_class(grade: Grade) -> &'static str {
    match grade {
        Grade::APlus => "aplus",
        Grade::A => "a",
        Grade::BPlus => "bplus",
        Grade::B => "b",
        Grade::CPlus => "cplus",
        Grade::C => "c",
        Grade::D => "d",
        Grade::F => "f",
        Grade::NotAvailable => "na",
    }
}

fn bar_class(score: f64) -> &'static str {
    if score >= 60.0 {
        "bar-good"
    } else if score >= 45.0 {
        "bar-moderate"
    } else {
        "bar-poor"
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

// Embedded CSS
const CSS: &str = r#"
:root {
    --primary-color: #b45309;
    --background-color: #1a1a2e;
    --text-color: #1e293b;
    --card-background: white;
    --border-color: #e2e8f0;
}

* { margin: 0; padding: 0; box-sizing: border-box; }

body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    line-height: 1.6;
    color: var(--text-color);
    background: var(--background-color);
    padding: 2rem;
}

.container {
    max-width: 1200px;
    margin: 0 auto;
    background: var(--card-background);
    border-radius: 12px;
    overflow: hidden;
}

.header {
    background: linear-gradient(135deg, #b45309 0%, #7c2d12 100%);
    color: white;
    padding: 3rem 2rem;
    text-align: center;
}

.header h1 { font-size: 2.5rem; margin-bottom: 0.5rem; }
.header .timestamp { opacity: 0.9; font-size: 0.95rem; }

.content { padding: 2rem; }

.section { margin-bottom: 2rem; }
.section-title {
    font-size: 1.5rem;
    margin-bottom: 1rem;
    padding-bottom: 0.5rem;
    border-bottom: 2px solid var(--border-color);
}

.metrics-grid, .stats-grid {
    display: grid;
    grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
    gap: 1rem;
}

.metric-card, .stat-item {
    border: 1px solid var(--border-color);
    border-radius: 8px;
    padding: 1.5rem;
}

.metric-card h3 {
    font-size: 0.875rem;
    color: #64748b;
    margin-bottom: 0.5rem;
}

.metric-value, .stat-value { font-size: 2rem; font-weight: bold; margin-bottom: 0.5rem; }
.stat-item { text-align: center; }
.stat-label { font-size: 0.875rem; color: #64748b; }
.muted { color: #64748b; font-size: 0.875rem; }
.conflict { color: #b45309; font-size: 0.875rem; }

.metric-bar { height: 8px; background: #e2e8f0; border-radius: 4px; overflow: hidden; }
.metric-bar-fill { height: 100%; border-radius: 4px; }
.bar-good { background: #10b981; }
.bar-moderate { background: #f59e0b; }
.bar-poor { background: #ef4444; }

table { width: 100%; border-collapse: collapse; }
th, td { text-align: left; padding: 0.5rem; border-bottom: 1px solid var(--border-color); }
tr.sleeper td:last-child { color: #059669; font-weight: 600; }
tr.trap td:last-child { color: #dc2626; font-weight: 600; }

.tier { padding: 0.5rem 0; border-bottom: 1px solid var(--border-color); }
.grade-badge {
    display: inline-block;
    min-width: 2.5rem;
    text-align: center;
    border-radius: 6px;
    color: white;
    font-weight: bold;
    margin-right: 0.5rem;
}
.grade-aplus, .grade-a { background: #10b981; }
.grade-bplus, .grade-b { background: #22c55e; }
.grade-cplus, .grade-c { background: #eab308; }
.grade-d { background: #f97316; }
.grade-f { background: #ef4444; }

.card { color: var(--primary-color); text-decoration: none; margin-right: 0.5rem; }
.card:hover { text-decoration: underline; }

.llm p { margin-bottom: 0.75rem; }

.footer {
    text-align: center;
    padding: 2rem;
    color: #64748b;
    border-top: 1px solid var(--border-color);
}

@media (max-width: 768px) {
    body { padding: 1rem; }
    .header { padding: 2rem 1rem; }
    .header h1 { font-size: 1.75rem; }
}

@media print {
    body { padding: 0; background: white; }
    .tier { page-break-inside: avoid; }
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_snapshot;

    #[test]
    fn test_html_render_structure() {
        let html = render(&test_snapshot()).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.ends_with("</html>"));
        assert!(html.contains("FDN PremierDraft Draft Guide"));
        assert!(html.contains("🏆 Tier List"));
        assert!(html.contains("grade-bplus"));
        assert!(html.contains("Selesnya (WG)"));
        assert!(html.contains("<p>Green is open.</p>"));
    }

    #[test]
    fn test_html_escapes_card_names() {
        let html = render(&test_snapshot()).unwrap();
        assert!(html.contains("Shiny &lt;Bait&gt;"));
        assert!(!html.contains("Shiny <Bait>"));
    }

    #[test]
    fn test_archetype_cards_filter_colors() {
        let snapshot = test_snapshot();
        let arch = &snapshot.archetypes[0];
        let names: Vec<&str> = archetype_cards(&snapshot, arch)
            .iter()
            .map(|c| c.name())
            .collect();
        // Red trap and the no-data card stay out of a WG list
        assert_eq!(names, vec!["Hidden Gem", "Plain Bear"]);
    }

    #[test]
    fn test_no_data_cards_not_in_tiers() {
        let snapshot = test_snapshot();
        let html = render_tiers(&snapshot);
        assert!(!html.contains("Unseen"));
        assert!(!html.contains("grade-na"));
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<a href=\"x\">'&'</a>"), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }
}
