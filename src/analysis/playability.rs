//! Hybrid-aware castability checks and keyword counts

use crate::models::{Card, COLORS};
use std::collections::BTreeMap;

fn hybrid_options(card: &Card) -> Option<&[String]> {
    let mana = &card.metadata.as_ref()?.mana;
    if mana.is_hybrid && !mana.hybrid_options.is_empty() {
        Some(mana.hybrid_options.as_slice())
    } else {
        None
    }
}

/// Whether a deck with `deck_colors` can cast the card.
///
/// Every hybrid symbol needs one of its colors in the deck; other cards
/// need all of their colors. Colorless cards are always castable.
pub fn is_card_playable_in_colors(card: &Card, deck_colors: &str) -> bool {
    if deck_colors.is_empty() {
        return false;
    }
    if let Some(options) = hybrid_options(card) {
        return options
            .iter()
            .all(|opts| opts.chars().any(|c| deck_colors.contains(c)));
    }
    card.colors().chars().all(|c| deck_colors.contains(c))
}

/// Whether the card needs a color outside `base_colors`
pub fn requires_splash_for_card(card: &Card, base_colors: &str) -> bool {
    if base_colors.is_empty() {
        return true;
    }
    if let Some(options) = hybrid_options(card) {
        return options
            .iter()
            .any(|opts| !opts.chars().any(|c| base_colors.contains(c)));
    }
    card.colors().chars().any(|c| !base_colors.contains(c))
}

/// Keyword counts per color across enriched cards
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordDistribution {
    /// Keyword -> color -> card count
    pub by_color: BTreeMap<String, BTreeMap<char, usize>>,
    pub totals: BTreeMap<String, usize>,
}

impl KeywordDistribution {
    /// Markdown bullet list of keywords seen on at least `min_total` cards
    pub fn format_for_llm(&self, min_total: usize) -> String {
        let lines: Vec<String> = self
            .totals
            .iter()
            .filter(|(_, total)| **total >= min_total)
            .map(|(keyword, total)| {
                let per_color = self.by_color.get(keyword);
                let parts: Vec<String> = COLORS
                    .iter()
                    .map(|c| {
                        let n = per_color.and_then(|m| m.get(c)).copied().unwrap_or(0);
                        format!("{} {}장", c, n)
                    })
                    .collect();
                format!("- **{}**: {} (총 {}장)", keyword, parts.join(", "), total)
            })
            .collect();

        if lines.is_empty() {
            return "키워드 분포 데이터 없음".to_string();
        }
        lines.join("\n")
    }
}

/// Count keywords per color. Colorless cards only add to the totals.
pub fn keyword_distribution(cards: &[Card]) -> KeywordDistribution {
    let mut dist = KeywordDistribution::default();
    for card in cards {
        for keyword in card.keywords() {
            *dist.totals.entry(keyword.clone()).or_default() += 1;
            for color in card.colors().chars().filter(|c| COLORS.contains(c)) {
                *dist
                    .by_color
                    .entry(keyword.clone())
                    .or_default()
                    .entry(color)
                    .or_default() += 1;
            }
        }
    }
    dist
}
