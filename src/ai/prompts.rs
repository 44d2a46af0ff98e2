//! Prompt templates for LLM commentary
//!
//! Templates live in `prompts/*.md` with `{placeholder}` slots. The builder
//! renders every number itself, so a template never needs format specs.

use crate::analysis::keyword_distribution;
use crate::models::{Archetype, Card, ColorStrength, MetaSnapshot, Rarity, TrophyStats};
use regex::Regex;
use std::sync::OnceLock;

const COLOR_STRATEGY: &str = include_str!("prompts/color_strategy.md");
const FORMAT_OVERVIEW: &str = include_str!("prompts/format_overview.md");
const FORMAT_CHARACTERISTICS: &str = include_str!("prompts/format_characteristics.md");
const ARCHETYPE_DEEP_DIVE: &str = include_str!("prompts/archetype_deep_dive.md");
const STRATEGY_TIPS: &str = include_str!("prompts/strategy_tips.md");
const CARD_ANALYSIS: &str = include_str!("prompts/card_analysis.md");
const SYSTEM: &str = include_str!("prompts/system.txt");

/// Keywords printed on fewer cards are left out of the distribution
const MIN_KEYWORD_CARDS: usize = 3;
const MAX_ORACLE_CHARS: usize = 1000;

/// Fill `{key}` slots in `template`
fn render(template: &str, values: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (key, value) in values {
        out = out.replace(&format!("{{{}}}", key), value);
    }
    out
}

fn pct(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value * 100.0)
}

/// `1234567` -> `1,234,567`
fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn first_n(names: &[String], n: usize) -> String {
    if names.is_empty() {
        return "N/A".to_string();
    }
    names.iter().take(n).cloned().collect::<Vec<_>>().join(", ")
}

/// Strip instruction-like text from card text before it reaches the model
fn sanitize_text(text: &str) -> String {
    static INJECTION_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

    let patterns = INJECTION_PATTERNS.get_or_init(|| {
        vec![
            Regex::new(r"(?i)ignore\s+(all\s+)?previous\s+instructions?").expect("valid regex"),
            Regex::new(r"(?i)disregard\s+(all\s+)?previous").expect("valid regex"),
            Regex::new(r"(?i)<\s*system\s*>").expect("valid regex"),
            Regex::new(r"(?i)system\s*:\s*").expect("valid regex"),
            Regex::new(r"(?i)assistant\s*:\s*").expect("valid regex"),
        ]
    });

    let mut result = text.to_string();
    for pattern in patterns {
        result = pattern.replace_all(&result, "[REDACTED]").to_string();
    }

    if result.chars().count() > MAX_ORACLE_CHARS {
        result = result.chars().take(MAX_ORACLE_CHARS).collect();
        result.push_str("... [truncated]");
    }
    result
}

/// Renders section prompts from a finished snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Shared system instruction for every section
    pub fn system_prompt(&self) -> &'static str {
        SYSTEM.trim()
    }

    pub fn color_strategy(&self, snapshot: &MetaSnapshot) -> String {
        let colors = snapshot.top_colors();
        render(
            COLOR_STRATEGY,
            &[
                ("expansion", snapshot.expansion.clone()),
                ("format", snapshot.format.clone()),
                ("color_rankings", color_rankings(&colors)),
                ("archetype_rankings", archetype_rankings(snapshot, false)),
                ("top_cards", top_cards(snapshot)),
                ("color_details", color_details(&colors)),
            ],
        )
    }

    pub fn format_overview(&self, snapshot: &MetaSnapshot) -> String {
        let archetypes = snapshot.top_archetypes();
        render(
            FORMAT_OVERVIEW,
            &[
                ("expansion", snapshot.expansion.clone()),
                ("format", snapshot.format.clone()),
                ("total_games", thousands(snapshot.total_games_analyzed)),
                ("speed_block", speed_block(snapshot)),
                ("splash_block", splash_block(snapshot)),
                ("color_details", color_details(&snapshot.top_colors())),
                ("archetype_details", archetype_details(&archetypes[..archetypes.len().min(5)])),
                ("trophy_section", trophy_section(snapshot.trophy_stats.as_ref())),
            ],
        )
    }

    pub fn format_characteristics(&self, snapshot: &MetaSnapshot) -> String {
        render(
            FORMAT_CHARACTERISTICS,
            &[
                ("expansion", snapshot.expansion.clone()),
                ("format", snapshot.format.clone()),
                ("total_games", thousands(snapshot.total_games_analyzed)),
                ("archetype_rankings", archetype_rankings(snapshot, true)),
                ("speed_block", speed_block(snapshot)),
                ("splash_block", splash_block(snapshot)),
                (
                    "keyword_distribution",
                    keyword_distribution(&snapshot.all_cards).format_for_llm(MIN_KEYWORD_CARDS),
                ),
            ],
        )
    }

    pub fn archetype_deep_dive(&self, snapshot: &MetaSnapshot) -> String {
        let archetypes = snapshot.top_archetypes();
        render(
            ARCHETYPE_DEEP_DIVE,
            &[
                ("expansion", snapshot.expansion.clone()),
                ("format", snapshot.format.clone()),
                ("total_games", thousands(snapshot.total_games_analyzed)),
                ("archetype_details", archetype_details(&archetypes[..archetypes.len().min(5)])),
                ("trophy_section", trophy_section(snapshot.trophy_stats.as_ref())),
            ],
        )
    }

    pub fn strategy_tips(&self, snapshot: &MetaSnapshot) -> String {
        let top_colors: Vec<&str> = snapshot
            .top_colors()
            .into_iter()
            .take(3)
            .map(|c| c.color.as_str())
            .collect();
        let top_archetypes: Vec<&str> = snapshot
            .top_archetypes()
            .into_iter()
            .take(5)
            .map(|a| a.guild_name())
            .collect();
        render(
            STRATEGY_TIPS,
            &[
                ("expansion", snapshot.expansion.clone()),
                ("format", snapshot.format.clone()),
                ("top_colors", top_colors.join(", ")),
                ("top_archetypes", top_archetypes.join(", ")),
            ],
        )
    }

    /// Single-card prompt used by `draftmeta card --explain`
    pub fn card_analysis(&self, card: &Card) -> String {
        let stats = &card.stats;
        let mut archetypes: Vec<(&String, &f64)> = stats.archetype_wrs.iter().collect();
        archetypes.sort_by(|a, b| b.1.total_cmp(a.1));
        let archetype_breakdown = if archetypes.is_empty() {
            "No archetype-specific data available.".to_string()
        } else {
            archetypes
                .iter()
                .map(|(colors, wr)| {
                    let games = stats.archetype_games.get(*colors).copied().unwrap_or(0);
                    format!("- {}: {} ({} games)", colors, pct(**wr, 2), thousands(games))
                })
                .collect::<Vec<_>>()
                .join("\n")
        };

        let viability_class = match card.viability.viable_archetypes {
            0 => "No data",
            n if n >= 5 => "Very Flexible",
            n if n >= 3 => "Flexible",
            2 => "Moderate",
            _ => "Archetype-Specific",
        };
        let metadata = card.metadata.as_ref();
        let text_or_na = |value: Option<&String>| value.cloned().unwrap_or_else(|| "N/A".into());

        render(
            CARD_ANALYSIS,
            &[
                ("name", card.name().to_string()),
                ("colors", card.colors().to_string()),
                ("mana_cost", text_or_na(metadata.and_then(|m| m.mana_cost.as_ref()))),
                ("type_line", text_or_na(metadata.and_then(|m| m.type_line.as_ref()))),
                ("oracle_text", sanitize_text(card.oracle_text().unwrap_or("N/A"))),
                ("score", format!("{:.1}", card.composite_score)),
                ("grade", card.grade.to_string()),
                ("gih_wr", pct(stats.gih_wr.unwrap_or(0.0), 2)),
                ("adj_wr", pct(card.adjusted_gih_wr, 2)),
                ("games", thousands(stats.gih_games)),
                ("alsa", format!("{:.1}", stats.alsa)),
                ("pick_position", format!("{}", (stats.alsa + 0.5) as u64)),
                ("iwd", pct(stats.iwd().unwrap_or(0.0), 2)),
                ("archetype_breakdown", archetype_breakdown),
                ("irregularity", card.irregularity.to_string()),
                ("z_score", format!("{:.2}", card.irregularity_z)),
                ("viable_archetypes", card.viability.viable_archetypes.to_string()),
                ("viability_class", viability_class.to_string()),
            ],
        )
    }
}

fn color_rankings(colors: &[&ColorStrength]) -> String {
    colors
        .iter()
        .enumerate()
        .map(|(i, c)| {
            format!(
                "{}. **{}** - Score: {:.1}, Playables: {}",
                i + 1,
                c.color,
                c.strength_score,
                c.playable_count
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Top ten archetypes; `with_share` swaps the strength score for meta share
fn archetype_rankings(snapshot: &MetaSnapshot, with_share: bool) -> String {
    snapshot
        .top_archetypes()
        .iter()
        .take(10)
        .enumerate()
        .map(|(i, a)| {
            let tail = if with_share {
                format!("Share: {}", pct(a.meta_share, 1))
            } else {
                format!("Score: {:.1}", a.strength_score)
            };
            format!(
                "{}. **{}** ({}) - WR: {}, {}",
                i + 1,
                a.guild_name(),
                a.colors(),
                pct(a.win_rate(), 2),
                tail
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn top_cards(snapshot: &MetaSnapshot) -> String {
    snapshot
        .top_cards(15)
        .iter()
        .map(|c| {
            let gih = c
                .stats
                .gih_wr
                .map(|wr| pct(wr, 2))
                .unwrap_or_else(|| "N/A".into());
            format!(
                "- **{}** ({}, {}) - Grade: {}, GIH WR: {}",
                c.name(),
                c.colors(),
                c.rarity().as_str(),
                c.grade,
                gih
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn speed_block(snapshot: &MetaSnapshot) -> String {
    let speed = snapshot.format_speed.clone().unwrap_or_default();
    let conflicts = if speed.conflicts.is_empty() {
        "없음".to_string()
    } else {
        speed.conflicts.join(", ")
    };
    let mut lines = vec![
        format!("- Tempo Ratio: {:.3} (OH WR / GD WR)", speed.tempo_ratio),
        format!("- Speed: {}", speed.speed_label),
        format!("- Aggro Advantage: {:.3}", speed.aggro_advantage),
        format!(
            "- Low CMC WR (≤2): {} vs High CMC WR (≥5): {}",
            pct(speed.low_cmc_wr, 2),
            pct(speed.high_cmc_wr, 2)
        ),
        format!("- 갈등 감지: {}", conflicts),
    ];
    if let (Some(length), Some(on_play)) = (speed.average_game_length, speed.win_rate_on_play) {
        lines.push(format!(
            "- 평균 게임 길이: {:.1}턴, 선공 승률: {}",
            length,
            pct(on_play, 1)
        ));
    }
    lines.join("\n")
}

fn splash_block(snapshot: &MetaSnapshot) -> String {
    let splash = snapshot.splash_indicator.clone().unwrap_or_default();
    [
        format!("- Splash Viability: {}", splash.splash_label),
        format!("- Dual Land Count: {}장", splash.dual_land_count),
        format!("- Dual Land ALSA: {:.1}", splash.dual_land_alsa),
        format!("- Fixer WR Premium: {}", pct(splash.fixer_wr_premium, 2)),
    ]
    .join("\n")
}

fn color_details(colors: &[&ColorStrength]) -> String {
    if colors.is_empty() {
        return "색상 데이터 없음".to_string();
    }
    colors
        .iter()
        .map(|cs| {
            format!(
                "### {} (Rank #{})\n\
                 - 강도 점수: {:.1}\n\
                 - 플레이어블: {}장\n\
                 - 폭탄 강도: {:.2}\n\
                 - 카드 풀 깊이: {:.2}\n\
                 - 상위 커먼: {}\n\
                 - 상위 언커먼: {}",
                cs.color,
                cs.rank,
                cs.strength_score,
                cs.playable_count,
                cs.bomb_factor,
                cs.depth_factor,
                first_n(&cs.top_commons, 3),
                first_n(&cs.top_uncommons, 3),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn archetype_details(archetypes: &[&Archetype]) -> String {
    if archetypes.is_empty() {
        return "아키타입 데이터 없음".to_string();
    }
    archetypes
        .iter()
        .map(|a| {
            let variants = if a.variants.is_empty() {
                "없음".to_string()
            } else {
                a.variants
                    .iter()
                    .take(3)
                    .map(|v| {
                        let delta = v.win_rate_delta * 100.0;
                        let sign = if delta > 0.0 { "+" } else { "" };
                        format!("+{}: {} ({}{:.1}%p)", v.added_color, pct(v.win_rate, 1), sign, delta)
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            format!(
                "### {} ({}) - Rank #{}\n\
                 **⚠️ 이 아키타입 고유 전략** (다른 아키타입과 다름)\n\
                 - 승률: {}\n\
                 - 메타 점유율: {}\n\
                 - 시너지 리프트: {} (표준편차: {:.3})\n\
                 - 스플래시 옵션: {}\n\
                 - Signpost: {}\n\
                 - 핵심 커먼: {}\n\
                 - 시너지 카드 (이 아키타입 전용): {}\n\
                 - 폭탄: {}\n\
                 - 이 아키타입 트랩: {}",
                a.guild_name(),
                a.colors(),
                a.rank,
                pct(a.win_rate(), 2),
                pct(a.meta_share, 1),
                pct(a.synergy_lift, 2),
                a.synergy_std,
                variants,
                a.signpost_uncommon.as_deref().unwrap_or("N/A"),
                first_n(&a.key_commons, 3),
                first_n(&a.synergy_cards, 3),
                first_n(&a.bombs, 3),
                first_n(&a.trap_cards, 3),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Trophy block, empty when no trophy stats were collected
fn trophy_section(trophy: Option<&TrophyStats>) -> String {
    let Some(trophy) = trophy else {
        return String::new();
    };

    let mut lines = vec![
        "## 🏆 Trophy Deck 분석 (7승 덱 통계)".to_string(),
        format!("- 총 Trophy Decks: {}개", trophy.total_trophy_decks),
        format!("- 분석된 덱: {}개", trophy.analyzed_decks),
        "\n### 아키타입별 Trophy 분포 + 덱 특성".to_string(),
    ];

    let ranking = trophy.archetype_ranking();
    for arch in ranking.iter().take(5) {
        let share = trophy.archetype_share(&arch.colors);
        lines.push(format!(
            "- **{} ({})**: {}개 ({})",
            arch.guild_name,
            arch.colors,
            arch.trophy_count,
            pct(share, 1)
        ));

        let mut parts = Vec::new();
        if arch.avg_cmc > 0.0 {
            parts.push(format!("CMC {:.1}", arch.avg_cmc));
        }
        if arch.avg_creature_count > 0.0 {
            parts.push(format!("생물 {:.0}장", arch.avg_creature_count));
        }
        if arch.splash_rate > 0.0 {
            parts.push(format!("스플래시 {:.0}%", arch.splash_rate * 100.0));
        }
        if !parts.is_empty() {
            lines.push(format!("  {}", parts.join(" | ")));
        }

        let key: Vec<String> = arch.top_cards(3).into_iter().map(|e| e.name).collect();
        lines.push(format!("  핵심: {}", key.join(", ")));
    }

    lines.push("\n### 7승 덱 핵심 Uncommon/Common (드래프트 우선순위)".to_string());
    for arch in ranking.iter().take(3) {
        let names = |rarity: Rarity| {
            let names: Vec<String> = arch
                .top_cards_by_rarity(&[rarity], 3)
                .into_iter()
                .map(|e| e.name)
                .collect();
            first_n(&names, 3)
        };
        lines.push(format!(
            "- **{}**: U:{} / C:{}",
            arch.guild_name,
            names(Rarity::Uncommon),
            names(Rarity::Common)
        ));
    }

    let overall = trophy.top_cards_overall(10);
    if !overall.is_empty() {
        lines.push("\n### Trophy Deck 핵심 카드 (전체)".to_string());
        let list: Vec<String> = overall
            .iter()
            .map(|e| format!("{}({})", e.name, e.count))
            .collect();
        lines.push(format!("- {}", list.join(", ")));
    }

    lines.join("\n")
}
