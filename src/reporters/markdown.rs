//! Markdown reporter for GitHub-flavored Markdown output
//!
//! The full meta report: color and archetype rankings, format speed and
//! splash, top cards, sleepers and traps, per-color breakdown, the LLM
//! sections when present, and a card image gallery.

use super::{pct, thousands};
use crate::models::{Card, LlmSections, MetaSnapshot};
use anyhow::Result;

const TOP_CARDS: usize = 20;
const MAX_IRREGULAR: usize = 10;
const MAX_ARCHETYPES: usize = 10;
const MAX_IMAGES: usize = 12;

/// Render snapshot as GitHub-flavored Markdown
pub fn render(snapshot: &MetaSnapshot) -> Result<String> {
    let mut md = String::new();

    md.push_str(&render_header(snapshot));
    md.push_str("\n---\n\n");

    md.push_str(&render_color_rankings(snapshot));
    md.push_str("\n---\n\n");

    md.push_str(&render_archetypes(snapshot));
    md.push_str("\n---\n\n");

    let format = render_format(snapshot);
    if !format.is_empty() {
        md.push_str(&format);
        md.push_str("\n---\n\n");
    }

    md.push_str(&render_top_cards(snapshot));
    md.push_str("\n---\n\n");

    md.push_str(&render_irregular(
        "## 💎 Sleeper Cards (Undervalued)",
        "Cards performing better than their pick rate suggests:",
        "*No significant sleepers detected.*",
        &snapshot.sleeper_cards,
    ));
    md.push_str("\n---\n\n");

    md.push_str(&render_irregular(
        "## ⚠️ Trap Cards (Overvalued)",
        "Cards performing worse than their pick rate suggests:",
        "*No significant traps detected.*",
        &snapshot.trap_cards,
    ));
    md.push_str("\n---\n\n");

    md.push_str(&render_color_breakdown(snapshot));
    md.push_str("\n---\n\n");

    let llm = render_llm(&snapshot.llm);
    if !llm.is_empty() {
        md.push_str(&llm);
        md.push_str("---\n\n");
    }

    md.push_str(&render_images(snapshot));
    md.push_str("\n---\n\n");

    md.push_str("*Report generated by draftmeta*\n");
    Ok(md)
}

fn render_header(snapshot: &MetaSnapshot) -> String {
    format!(
        r#"# {} {} Meta Analysis

**Generated**: {}
**Total Cards**: {}
**Total Games Analyzed**: {}
"#,
        snapshot.expansion,
        snapshot.format,
        snapshot.timestamp.format("%Y-%m-%d %H:%M"),
        snapshot.total_cards,
        thousands(snapshot.total_games_analyzed)
    )
}

fn render_color_rankings(snapshot: &MetaSnapshot) -> String {
    let mut md = String::from(
        r#"## 🎨 Color Rankings

| Rank | Color | Strength | Top Common | Top Uncommon | Playables |
|------|-------|----------|------------|--------------|-----------|
"#,
    );
    for c in snapshot.top_colors() {
        md.push_str(&format!(
            "| {} | {} | {:.1} | {} | {} | {} |\n",
            c.rank,
            c.color,
            c.strength_score,
            first_or_dash(&c.top_commons),
            first_or_dash(&c.top_uncommons),
            c.playable_count
        ));
    }
    md
}

fn render_archetypes(snapshot: &MetaSnapshot) -> String {
    let mut md = String::from(
        r#"## 🏛️ Archetype Rankings (Two-Color)

| Rank | Archetype | Win Rate | Strength | Synergy Lift | Key Common | Signpost |
|------|-----------|----------|----------|--------------|------------|----------|
"#,
    );
    let archetypes = snapshot.top_archetypes();
    for a in archetypes.iter().take(MAX_ARCHETYPES) {
        md.push_str(&format!(
            "| {} | {} ({}) | {} | {:.1} | {:.2}%p | {} | {} |\n",
            a.rank,
            a.guild_name(),
            a.colors(),
            pct(a.win_rate(), 2),
            a.strength_score,
            a.synergy_lift * 100.0,
            first_or_dash(&a.key_commons),
            a.signpost_uncommon.as_deref().unwrap_or("-")
        ));
    }

    let with_variants: Vec<_> = archetypes.iter().filter(|a| !a.variants.is_empty()).collect();
    if !with_variants.is_empty() {
        md.push_str("\n**Splash variants**:\n\n");
        for a in with_variants {
            let variants: Vec<String> = a
                .variants
                .iter()
                .map(|v| {
                    format!(
                        "+{} {} ({:+.1}%p)",
                        v.added_color,
                        pct(v.win_rate, 1),
                        v.win_rate_delta * 100.0
                    )
                })
                .collect();
            md.push_str(&format!("- {}: {}\n", a.guild_name(), variants.join(", ")));
        }
    }
    md
}

fn render_format(snapshot: &MetaSnapshot) -> String {
    let mut md = String::new();
    if let Some(speed) = &snapshot.format_speed {
        md.push_str("## 📈 포맷 특성\n\n### 속도\n");
        md.push_str(&format!("- **속도 등급**: {}\n", speed.speed_label));
        if let Some(length) = speed.average_game_length {
            md.push_str(&format!("- **평균 게임 길이**: {:.2}턴\n", length));
        }
        if let Some(wr) = speed.win_rate_on_play {
            md.push_str(&format!("- **선공 승률**: {}\n", pct(wr, 2)));
        }
        md.push_str(&format!("- **Tempo Ratio (OH/GD)**: {:.4}\n", speed.tempo_ratio));
        md.push_str(&format!(
            "- **저마나 우위**: {:.2}%p\n",
            speed.aggro_advantage * 100.0
        ));
        if !speed.speed_interpretation.is_empty() {
            md.push_str(&format!("- **해석**: {}\n", speed.speed_interpretation));
        }
        md.push_str(&format!("- **추천 전략**: {}\n\n", speed.recommendation));

        md.push_str("| 지표 | 값 |\n|------|-----|\n");
        md.push_str(&format!("| 평균 OH WR | {} |\n", pct(speed.avg_oh_wr, 2)));
        md.push_str(&format!("| 평균 GD WR | {} |\n", pct(speed.avg_gd_wr, 2)));
        md.push_str(&format!("| 저마나(CMC≤2) WR | {} |\n", pct(speed.low_cmc_wr, 2)));
        md.push_str(&format!("| 고마나(CMC≥5) WR | {} |\n", pct(speed.high_cmc_wr, 2)));

        if !speed.conflicts.is_empty() {
            md.push_str("\n**⚠️ 지표 충돌**:\n");
            for conflict in &speed.conflicts {
                md.push_str(&format!("- {}\n", conflict));
            }
        }
        md.push('\n');
    }

    if let Some(splash) = &snapshot.splash_indicator {
        md.push_str("### 스플래시 분석\n");
        md.push_str(&format!("- **스플래시 선호도**: {}\n", splash.splash_label));
        md.push_str(&format!("- **듀얼 랜드 ALSA**: {:.2}\n", splash.dual_land_alsa));
        md.push_str(&format!(
            "- **듀얼 랜드 픽률**: {}\n",
            pct(splash.dual_land_pick_rate, 1)
        ));
        md.push_str(&format!(
            "- **마나 픽서 WR 프리미엄**: {:.2}%p\n",
            splash.fixer_wr_premium * 100.0
        ));
        md.push_str(&format!(
            "- **3색 성과 검증**: {} (+{} / -{})\n",
            splash.performance_validation,
            splash.positive_splash_count,
            splash.negative_splash_count
        ));
        md.push_str(&format!("- **추천**: {}\n\n", splash.recommendation));
        md.push_str("| 카드 유형 | 수량 |\n|----------|------|\n");
        md.push_str(&format!("| 듀얼 랜드 | {} |\n", splash.dual_land_count));
        md.push_str(&format!("| 마나 픽서 | {} |\n", splash.mana_fixer_count));
    }
    md
}

fn render_top_cards(snapshot: &MetaSnapshot) -> String {
    let mut md = format!(
        r#"## ⭐ Top {} Cards by Composite Score

| Rank | Card | Colors | Rarity | Grade | Score | GIH WR |
|------|------|--------|--------|-------|-------|--------|
"#,
        TOP_CARDS
    );
    for (i, c) in snapshot.top_cards(TOP_CARDS).iter().enumerate() {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {:.1} | {} |\n",
            i + 1,
            card_link(c),
            c.colors(),
            title_case(c.rarity().as_str()),
            c.grade,
            c.composite_score,
            gih(c)
        ));
    }
    md
}

fn render_irregular(title: &str, blurb: &str, empty: &str, cards: &[Card]) -> String {
    let mut md = format!(
        r#"{}

{}

| Card | Colors | Grade | Score | GIH WR | Deviation Z |
|------|--------|-------|-------|--------|-------------|
"#,
        title, blurb
    );
    for c in cards.iter().take(MAX_IRREGULAR) {
        md.push_str(&format!(
            "| {} | {} | {} | {:.1} | {} | {:+.2} |\n",
            card_link(c),
            c.colors(),
            c.grade,
            c.composite_score,
            gih(c),
            c.irregularity_z
        ));
    }
    if cards.is_empty() {
        md.push_str(&format!("\n{}\n", empty));
    }
    md
}

fn render_color_breakdown(snapshot: &MetaSnapshot) -> String {
    let mut md = String::from("## 📊 Color Breakdown\n\n");
    for color in snapshot.top_colors() {
        md.push_str(&format!(
            "### {} - Rank {} (Score: {:.1})\n\n",
            color.color, color.rank, color.strength_score
        ));
        md.push_str(&format!(
            "**Top Commons**: {}\n\n",
            join_or_na(&color.top_commons, 5)
        ));
        md.push_str(&format!(
            "**Top Uncommons**: {}\n\n",
            join_or_na(&color.top_uncommons, 3)
        ));
        md.push_str(&format!(
            "**Top Rares**: {}\n\n",
            join_or_na(&color.top_rares, 3)
        ));
    }
    md
}

fn render_llm(llm: &LlmSections) -> String {
    let sections = [
        ("## 🤖 AI Format Overview", &llm.format_overview),
        ("## 🧭 Format Characteristics", &llm.format_characteristics),
        ("## 🎨 Color Strategy", &llm.color_strategy),
        ("## 🏛️ Archetype Deep Dive", &llm.archetype_deep_dive),
        ("## 📝 Strategy Tips", &llm.strategy_tips),
    ];
    let mut md = String::new();
    for (title, body) in sections {
        if let Some(body) = body {
            md.push_str(&format!("{}\n\n{}\n\n", title, body.trim()));
        }
    }
    md
}

fn render_images(snapshot: &MetaSnapshot) -> String {
    let mut md = String::from("## 🖼️ Top Card Images\n\n");
    let with_images: Vec<(&Card, &str)> = snapshot
        .top_cards(TOP_CARDS)
        .into_iter()
        .filter_map(|c| {
            let uri = c.metadata.as_ref()?.image_uri.as_deref()?;
            Some((c, uri))
        })
        .take(MAX_IMAGES)
        .collect();

    if with_images.is_empty() {
        md.push_str("*Card images not available.*\n");
        return md;
    }

    md.push_str(
        "<div style=\"display: flex; flex-wrap: wrap; gap: 10px; justify-content: center;\">\n",
    );
    for (card, image) in with_images {
        let img = format!(
            "<img src=\"{}\" alt=\"{}\" style=\"width: 200px;\">",
            image,
            card.name()
        );
        let img = match scryfall_uri(card) {
            Some(link) => format!("<a href=\"{}\">{}</a>", link, img),
            None => img,
        };
        md.push_str(&format!(
            "<div style=\"text-align: center; width: 200px;\">\n{}\n<br><small>{}</small>\n</div>\n",
            img,
            card.name()
        ));
    }
    md.push_str("</div>\n");
    md
}

fn scryfall_uri(card: &Card) -> Option<&str> {
    card.metadata.as_ref()?.scryfall_uri.as_deref()
}

fn card_link(card: &Card) -> String {
    match scryfall_uri(card) {
        Some(uri) => format!("[{}]({})", card.name(), uri),
        None => card.name().to_string(),
    }
}

fn gih(card: &Card) -> String {
    card.stats
        .gih_wr
        .map(|wr| pct(wr, 2))
        .unwrap_or_else(|| "-".into())
}

fn first_or_dash(names: &[String]) -> &str {
    names.first().map(String::as_str).unwrap_or("-")
}

fn join_or_na(names: &[String], n: usize) -> String {
    if names.is_empty() {
        return "N/A".to_string();
    }
    names.iter().take(n).cloned().collect::<Vec<_>>().join(", ")
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_snapshot;

    #[test]
    fn test_markdown_sections_present() {
        let md = render(&test_snapshot()).unwrap();
        assert!(md.starts_with("# FDN PremierDraft Meta Analysis"));
        assert!(md.contains("**Total Games Analyzed**: 1,234,567"));
        assert!(md.contains("## 🎨 Color Rankings"));
        assert!(md.contains("| 1 | Selesnya (WG) | 58.00% |"));
        assert!(md.contains("## 📈 포맷 특성"));
        assert!(md.contains("**⚠️ 지표 충돌**"));
        assert!(md.contains("### 스플래시 분석"));
        assert!(md.contains("## 🤖 AI Format Overview\n\nGreen is open."));
        assert!(md.contains("## 📝 Strategy Tips"));
        assert!(!md.contains("## 🎨 Color Strategy"));
    }

    #[test]
    fn test_card_links_and_images() {
        let md = render(&test_snapshot()).unwrap();
        assert!(md.contains("[Hidden Gem](https://scryfall.com/card/fdn/1)"));
        assert!(md.contains("<img src=\"https://img/gem.jpg\""));
        assert!(md.contains("| Shiny <Bait> | R |"));
        assert!(md.contains("-1.80"));
    }

    #[test]
    fn test_empty_irregular_lists() {
        let mut snapshot = test_snapshot();
        snapshot.sleeper_cards.clear();
        snapshot.llm = LlmSections::default();
        let md = render(&snapshot).unwrap();
        assert!(md.contains("*No significant sleepers detected.*"));
        assert!(!md.contains("AI Format Overview"));
    }

    #[test]
    fn test_helpers() {
        assert_eq!(title_case("mythic"), "Mythic");
        assert_eq!(join_or_na(&[], 3), "N/A");
        assert_eq!(
            join_or_na(&["a".into(), "b".into(), "c".into()], 2),
            "a, b"
        );
    }
}
