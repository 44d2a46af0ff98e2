//! Per-color strength
//!
//! Card-quality components are stability weighted: cards whose win rate
//! collapses outside one archetype count for less.

use crate::models::{Card, ColorPair, ColorStrength, Rarity, COLORS};
use crate::stats::mean;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Scores above this count toward the bomb factor
const BOMB_SCORE_FLOOR: f64 = 70.0;
/// Theoretical excess over the floor per bomb slot
const BOMB_SLOT_EXCESS: f64 = 30.0;
const DEPTH_POINTS_PER_PLAYABLE: f64 = 5.0;
const DECK_WR_MIN_GAMES: u64 = 200;
const NEUTRAL_STRENGTH: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorWeights {
    pub deck_wr_strength: f64,
    pub archetype_success: f64,
    pub top_common_avg: f64,
    pub top_uncommon_avg: f64,
    pub bomb_factor: f64,
    pub depth_factor: f64,
}

impl Default for ColorWeights {
    fn default() -> Self {
        Self {
            deck_wr_strength: 0.35,
            archetype_success: 0.25,
            top_common_avg: 0.15,
            top_uncommon_avg: 0.10,
            bomb_factor: 0.10,
            depth_factor: 0.05,
        }
    }
}

/// How many cards of each rarity feed the quality averages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopN {
    pub common: usize,
    pub uncommon: usize,
    pub rare: usize,
}

impl Default for TopN {
    fn default() -> Self {
        Self {
            common: 10,
            uncommon: 5,
            rare: 3,
        }
    }
}

/// Weight range mapped linearly from stability 0..100
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityWeight {
    pub min: f64,
    pub max: f64,
}

impl Default for StabilityWeight {
    fn default() -> Self {
        Self { min: 0.8, max: 1.0 }
    }
}

impl StabilityWeight {
    pub fn weight(&self, card: &Card) -> f64 {
        let stability = (card.stability_score() / 100.0).clamp(0.0, 1.0);
        self.min + (self.max - self.min) * stability
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorScorerConfig {
    pub weights: ColorWeights,
    pub top_n: TopN,
    pub stability_weight: StabilityWeight,
    /// Composite score at which a card counts as playable
    pub playable_threshold: f64,
}

impl Default for ColorScorerConfig {
    fn default() -> Self {
        Self {
            weights: ColorWeights::default(),
            top_n: TopN::default(),
            stability_weight: StabilityWeight::default(),
            playable_threshold: 50.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ColorScorer {
    config: ColorScorerConfig,
}

impl ColorScorer {
    pub fn new(config: ColorScorerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ColorScorerConfig {
        &self.config
    }

    /// Strength of one color. `rank` is left at 0.
    pub fn calculate_color_strength(
        &self,
        color: char,
        cards: &[Card],
        color_pairs: &[ColorPair],
    ) -> ColorStrength {
        let in_color: Vec<&Card> = cards
            .iter()
            .filter(|c| c.stats.has_color(color) && c.stats.gih_wr.is_some())
            .collect();
        if in_color.is_empty() {
            debug!("No scored cards for color {}", color);
            return ColorStrength::empty(color);
        }

        let top_n = self.config.top_n;
        let commons = self.top_by_rarity(&in_color, &[Rarity::Common], top_n.common);
        let uncommons = self.top_by_rarity(&in_color, &[Rarity::Uncommon], top_n.uncommon);
        let rares = self.top_by_rarity(&in_color, &[Rarity::Rare, Rarity::Mythic], top_n.rare);

        let weighted = |cards: &[&Card]| -> Vec<f64> {
            cards
                .iter()
                .map(|c| c.composite_score * self.config.stability_weight.weight(c))
                .collect()
        };

        let top_common_avg = mean(&weighted(&commons));
        let top_uncommon_avg = mean(&weighted(&uncommons));

        let excess: f64 = weighted(&rares)
            .iter()
            .map(|s| (s - BOMB_SCORE_FLOOR).max(0.0))
            .sum();
        let bomb_slots = top_n.rare.max(1) as f64;
        let bomb_factor = (excess / (bomb_slots * BOMB_SLOT_EXCESS)).clamp(0.0, 1.0) * 100.0;

        let playable_count = in_color
            .iter()
            .filter(|c| c.composite_score >= self.config.playable_threshold)
            .count();
        let depth_factor = (playable_count as f64 * DEPTH_POINTS_PER_PLAYABLE).min(100.0);

        let deck_wr_strength = deck_wr_strength(color, cards);
        let archetype_success = archetype_success(color, color_pairs);

        let w = &self.config.weights;
        let strength_score = w.deck_wr_strength * deck_wr_strength
            + w.archetype_success * archetype_success
            + w.top_common_avg * top_common_avg
            + w.top_uncommon_avg * top_uncommon_avg
            + w.bomb_factor * bomb_factor
            + w.depth_factor * depth_factor;

        debug!(
            "Color {}: strength {:.1} (deck {:.1}, arch {:.1}, C {:.1}, U {:.1}, bomb {:.1}, depth {:.1})",
            color,
            strength_score,
            deck_wr_strength,
            archetype_success,
            top_common_avg,
            top_uncommon_avg,
            bomb_factor,
            depth_factor
        );

        let names = |cards: &[&Card]| -> Vec<String> {
            cards.iter().map(|c| c.name().to_string()).collect()
        };
        ColorStrength {
            color: color.to_string(),
            strength_score,
            rank: 0,
            deck_wr_strength,
            archetype_success,
            top_common_avg,
            top_uncommon_avg,
            bomb_factor,
            depth_factor,
            playable_count,
            total_count: in_color.len(),
            top_commons: names(&commons),
            top_uncommons: names(&uncommons),
            top_rares: names(&rares),
        }
    }

    /// All five colors, strongest first, ranked 1-5
    pub fn calculate_all_color_strengths(
        &self,
        cards: &[Card],
        color_pairs: &[ColorPair],
    ) -> Vec<ColorStrength> {
        let mut strengths: Vec<ColorStrength> = COLORS
            .iter()
            .map(|&color| self.calculate_color_strength(color, cards, color_pairs))
            .collect();
        strengths.sort_by(|a, b| b.strength_score.total_cmp(&a.strength_score));
        for (i, strength) in strengths.iter_mut().enumerate() {
            strength.rank = i + 1;
        }

        if let Some(best) = strengths.first() {
            info!(
                "Strongest color: {} ({:.1})",
                best.color, best.strength_score
            );
        }
        strengths
    }

    fn top_by_rarity<'a>(&self, cards: &[&'a Card], rarities: &[Rarity], n: usize) -> Vec<&'a Card> {
        let mut selected: Vec<&Card> = cards
            .iter()
            .copied()
            .filter(|c| rarities.contains(&c.rarity()))
            .collect();
        selected.sort_by(|a, b| b.composite_score.total_cmp(&a.composite_score));
        selected.truncate(n);
        selected
    }
}

/// Game-weighted deck WR of mono-color cards, x100
fn deck_wr_strength(color: char, cards: &[Card]) -> f64 {
    let mut weighted = 0.0;
    let mut games = 0u64;
    for card in cards {
        let stats = &card.stats;
        if !stats.is_mono() || !stats.has_color(color) || stats.game_count < DECK_WR_MIN_GAMES {
            continue;
        }
        if let Some(wr) = stats.deck_wr.filter(|wr| *wr > 0.0) {
            weighted += wr * stats.game_count as f64;
            games += stats.game_count;
        }
    }
    if games == 0 {
        return NEUTRAL_STRENGTH;
    }
    weighted / games as f64 * 100.0
}

/// Mean WR of two-color pairs containing the color, x100
fn archetype_success(color: char, color_pairs: &[ColorPair]) -> f64 {
    let wrs: Vec<f64> = color_pairs
        .iter()
        .filter(|p| p.is_two_color() && p.colors.contains(color) && p.games > 0)
        .map(|p| p.win_rate)
        .collect();
    if wrs.is_empty() {
        return NEUTRAL_STRENGTH;
    }
    mean(&wrs) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CardStats;

    fn scored(name: &str, colors: &str, rarity: Rarity, score: f64) -> Card {
        let mut card = Card::new(CardStats::new(name, colors, rarity).with_gih(0.55, 1000));
        card.composite_score = score;
        card
    }

    #[test]
    fn test_all_five_colors_ranked() {
        let cards = vec![
            scored("A", "W", Rarity::Common, 70.0),
            scored("B", "U", Rarity::Common, 40.0),
            scored("C", "WU", Rarity::Uncommon, 60.0),
        ];
        let strengths = ColorScorer::default().calculate_all_color_strengths(&cards, &[]);
        assert_eq!(strengths.len(), 5);

        let mut ranks: Vec<usize> = strengths.iter().map(|s| s.rank).collect();
        ranks.sort();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);

        let mut colors: Vec<&str> = strengths.iter().map(|s| s.color.as_str()).collect();
        colors.sort();
        assert_eq!(colors, vec!["B", "G", "R", "U", "W"]);
        assert_eq!(strengths[0].color, "W");
    }

    #[test]
    fn test_empty_input_still_five() {
        let strengths = ColorScorer::default().calculate_all_color_strengths(&[], &[]);
        assert_eq!(strengths.len(), 5);
        assert!(strengths.iter().all(|s| s.strength_score == 0.0));
    }

    #[test]
    fn test_bomb_factor() {
        let cards = vec![
            scored("Dragon", "R", Rarity::Mythic, 100.0),
            scored("Giant", "R", Rarity::Rare, 85.0),
            scored("Goblin", "R", Rarity::Rare, 60.0),
            scored("Extra", "R", Rarity::Rare, 55.0),
        ];
        let strength = ColorScorer::default().calculate_color_strength('R', &cards, &[]);
        // (30 + 15 + 0) / 90
        assert!((strength.bomb_factor - 50.0).abs() < 1e-9);
        assert_eq!(strength.top_rares, vec!["Dragon", "Giant", "Goblin"]);
    }

    #[test]
    fn test_depth_and_deck_wr() {
        let mut cards: Vec<Card> = (0..25)
            .map(|i| scored(&format!("G{i}"), "G", Rarity::Common, 55.0))
            .collect();
        cards[0].stats.deck_wr = Some(0.60);
        cards[0].stats.game_count = 1000;
        cards[1].stats.deck_wr = Some(0.50);
        cards[1].stats.game_count = 3000;
        // Too few games
        cards[2].stats.deck_wr = Some(0.90);
        cards[2].stats.game_count = 100;

        let strength = ColorScorer::default().calculate_color_strength('G', &cards, &[]);
        assert_eq!(strength.playable_count, 25);
        assert_eq!(strength.depth_factor, 100.0);
        assert!((strength.deck_wr_strength - 52.5).abs() < 1e-9);
        assert_eq!(strength.top_commons.len(), 10);
    }

    #[test]
    fn test_archetype_success_from_pairs() {
        let cards = vec![scored("A", "B", Rarity::Common, 50.0)];
        let pairs = vec![
            ColorPair::new("WB", 560, 1000),
            ColorPair::new("BR", 540, 1000),
            ColorPair::new("UG", 600, 1000),
            ColorPair::new("WUB", 900, 1000),
        ];
        let strength = ColorScorer::default().calculate_color_strength('B', &cards, &pairs);
        assert!((strength.archetype_success - 55.0).abs() < 1e-9);
    }

    #[test]
    fn test_stability_weight_lowers_scores() {
        let mut card = scored("Narrow", "W", Rarity::Common, 80.0);
        card.stats.archetype_wrs.insert("WU".into(), 0.6);
        card.stats.archetype_wrs.insert("WB".into(), 0.5);
        card.viability.viable_archetypes = 1;
        let strength = ColorScorer::default().calculate_color_strength('W', &[card], &[]);
        assert!((strength.top_common_avg - 72.0).abs() < 1e-9);
    }
}
