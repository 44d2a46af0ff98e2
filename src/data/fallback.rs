//! Color-pair win rates estimated from card data
//!
//! Used when the color-ratings endpoint fails or returns nothing. Each
//! target combination blends two signals:
//!
//! ```text
//! gold = game-weighted deck WR of cards whose colors equal the target
//! mono = game-weighted deck WR of mono cards (first two target colors)
//!        that beat their color's mean deck WR
//! wr   = 0.7 * gold + 0.3 * mono   (or whichever signal exists)
//! ```

use crate::models::{CardStats, ColorPair, COLOR_PAIRS};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

pub const FALLBACK_MIN_GAMES: u64 = 200;
pub const GOLD_WEIGHT: f64 = 0.7;

/// Game-weighted deck WR and total games, `None` for an empty slice
fn weighted_deck_wr(cards: &[&CardStats]) -> Option<(f64, u64)> {
    let games: u64 = cards.iter().map(|c| c.game_count).sum();
    if games == 0 {
        return None;
    }
    let weighted: f64 = cards
        .iter()
        .map(|c| c.deck_wr.unwrap_or(0.0) * c.game_count as f64)
        .sum();
    Some((weighted / games as f64, games))
}

/// Estimate color pairs from per-card deck win rates, best first
pub fn compute_color_pairs_from_cards(cards: &[CardStats]) -> Vec<ColorPair> {
    let valid: Vec<&CardStats> = cards
        .iter()
        .filter(|c| c.deck_wr.is_some_and(|wr| wr > 0.0) && c.game_count >= FALLBACK_MIN_GAMES)
        .collect();

    if valid.is_empty() {
        warn!("No cards with deck win rate data for color-pair fallback");
        return Vec::new();
    }
    info!("Computing color-pair fallback from {} cards", valid.len());

    let mut mono_wrs: BTreeMap<char, Vec<f64>> = BTreeMap::new();
    for card in valid.iter().filter(|c| c.is_mono()) {
        if let (Some(color), Some(wr)) = (card.colors.chars().next(), card.deck_wr) {
            mono_wrs.entry(color).or_default().push(wr);
        }
    }
    let color_avg: BTreeMap<char, f64> = mono_wrs
        .iter()
        .map(|(color, wrs)| (*color, wrs.iter().sum::<f64>() / wrs.len() as f64))
        .collect();

    let mut overperformers: BTreeMap<char, Vec<&CardStats>> = BTreeMap::new();
    for card in valid.iter().filter(|c| c.is_mono()) {
        let Some(color) = card.colors.chars().next() else {
            continue;
        };
        let beats_average = color_avg
            .get(&color)
            .zip(card.deck_wr)
            .is_some_and(|(avg, wr)| wr > *avg);
        if beats_average {
            overperformers.entry(color).or_default().push(*card);
        }
    }

    let mut targets: BTreeSet<String> = COLOR_PAIRS.iter().map(|p| p.to_string()).collect();
    targets.extend(
        valid
            .iter()
            .filter(|c| c.colors.chars().count() == 3)
            .map(|c| c.colors.clone()),
    );

    let mut pairs: Vec<ColorPair> = targets
        .iter()
        .filter_map(|colors| {
            let gold: Vec<&CardStats> = valid
                .iter()
                .filter(|c| c.colors == *colors)
                .copied()
                .collect();
            let mono: Vec<&CardStats> = colors
                .chars()
                .take(2)
                .flat_map(|c| overperformers.get(&c).into_iter().flatten().copied())
                .collect();

            let (win_rate, games) = match (weighted_deck_wr(&gold), weighted_deck_wr(&mono)) {
                (Some((g_wr, g_games)), Some((m_wr, m_games))) => (
                    GOLD_WEIGHT * g_wr + (1.0 - GOLD_WEIGHT) * m_wr,
                    g_games + m_games,
                ),
                (Some(gold), None) => gold,
                (None, Some(mono)) => mono,
                (None, None) => return None,
            };
            Some(ColorPair::computed(colors.clone(), win_rate, games))
        })
        .collect();

    pairs.sort_by(|a, b| b.win_rate.total_cmp(&a.win_rate));
    info!("Computed {} color pairs from card data", pairs.len());
    pairs
}
