//! Composite card scorer
//!
//! Five z-scores against a reference population, weighted and mapped onto a
//! 0-100 scale around 50. Small samples are shrunk through the Wilson lower
//! bound before they are compared with anything.

use crate::models::{Card, CardStats, Grade};
use crate::stats::{wilson_score_lower_bound, z_score, DEFAULT_WILSON_Z};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Below this many well-sampled cards the reference population widens
const MIN_REFERENCE_CARDS: usize = 10;
/// Opening-hand / drawn samples below this are ignored
const MIN_SPLIT_GAMES: u64 = 100;
/// `14 - alsa` so that earlier picks score higher
const ALSA_INVERSION_BASE: f64 = 14.0;
const WEIGHT_SUM_TOLERANCE: f64 = 0.001;

/// Metric weights; they are normalized to sum to 1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub gih_wr: f64,
    pub iwd: f64,
    pub alsa_inverse: f64,
    pub oh_wr: f64,
    pub gd_wr: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            gih_wr: 0.45,
            iwd: 0.20,
            alsa_inverse: 0.15,
            oh_wr: 0.10,
            gd_wr: 0.10,
        }
    }
}

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.gih_wr + self.iwd + self.alsa_inverse + self.oh_wr + self.gd_wr
    }

    fn normalized(self) -> Self {
        let total = self.sum();
        if (total - 1.0).abs() <= WEIGHT_SUM_TOLERANCE || total <= 0.0 {
            if total <= 0.0 {
                warn!("Scoring weights sum to {:.3}, using defaults", total);
                return Self::default();
            }
            return self;
        }
        warn!("Scoring weights sum to {:.3}, normalizing to 1.0", total);
        Self {
            gih_wr: self.gih_wr / total,
            iwd: self.iwd / total,
            alsa_inverse: self.alsa_inverse / total,
            oh_wr: self.oh_wr / total,
            gd_wr: self.gd_wr / total,
        }
    }
}

/// Scorer settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardScorerConfig {
    pub weights: ScoringWeights,
    /// Wilson interval z
    pub confidence_z: f64,
    /// Preferred GIH sample for reference cards
    pub min_sample_size: u64,
    pub scale_center: f64,
    pub scale_multiplier: f64,
}

impl Default for CardScorerConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            confidence_z: DEFAULT_WILSON_Z,
            min_sample_size: 500,
            scale_center: 50.0,
            scale_multiplier: 15.0,
        }
    }
}

/// Per-metric z-scores behind one composite score
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScoreBreakdown {
    /// Wilson lower bound of the GIH WR
    pub adjusted_wr: f64,
    pub z_gih_wr: f64,
    pub z_iwd: f64,
    pub z_alsa: f64,
    pub z_oh_wr: f64,
    pub z_gd_wr: f64,
    /// Weighted sum of the five z-scores
    pub weighted_z: f64,
    pub score: f64,
}

/// Produces scored [`Card`]s from raw statistics
pub trait CompositeScorer {
    /// Score one card against the full card list
    fn score_card(&self, card: &CardStats, all_cards: &[CardStats]) -> Card;

    /// Score every card, best first
    fn score_all_cards(&self, cards: &[CardStats]) -> Vec<Card>;
}

/// Metric populations the z-scores are measured against
struct ReferencePopulation {
    adjusted_wrs: Vec<f64>,
    iwds: Vec<f64>,
    alsa_inverses: Vec<f64>,
    oh_wrs: Vec<f64>,
    gd_wrs: Vec<f64>,
}

impl ReferencePopulation {
    /// `None` when fewer than two cards have a win rate
    fn build(all_cards: &[CardStats], min_games: u64, z: f64) -> Option<Self> {
        let mut reference: Vec<&CardStats> = all_cards
            .iter()
            .filter(|c| c.gih_games >= min_games && c.gih_wr.is_some())
            .collect();

        if reference.len() < MIN_REFERENCE_CARDS {
            warn!(
                "Only {} cards with {}+ games, using all cards with win rates as reference",
                reference.len(),
                min_games
            );
            reference = all_cards.iter().filter(|c| c.gih_wr.is_some()).collect();
        }

        if reference.len() < 2 {
            return None;
        }

        Some(Self {
            adjusted_wrs: reference
                .iter()
                .map(|c| wilson_score_lower_bound(c.gih_wins, c.gih_games, z))
                .collect(),
            iwds: reference.iter().filter_map(|c| c.iwd()).collect(),
            alsa_inverses: reference
                .iter()
                .map(|c| ALSA_INVERSION_BASE - c.alsa)
                .collect(),
            oh_wrs: reference
                .iter()
                .filter(|c| c.oh_games >= MIN_SPLIT_GAMES)
                .filter_map(|c| c.oh_wr)
                .collect(),
            gd_wrs: reference
                .iter()
                .filter(|c| c.gd_games >= MIN_SPLIT_GAMES)
                .filter_map(|c| c.gd_wr)
                .collect(),
        })
    }
}

/// Weighted z-score scorer
#[derive(Debug, Clone, Default)]
pub struct CardScorer {
    config: CardScorerConfig,
}

impl CardScorer {
    pub fn new(config: CardScorerConfig) -> Self {
        Self {
            config: CardScorerConfig {
                weights: config.weights.normalized(),
                ..config
            },
        }
    }

    pub fn config(&self) -> &CardScorerConfig {
        &self.config
    }

    /// Bayesian-adjusted win rate; 0.5 when there is no win rate at all
    pub fn bayesian_win_rate(&self, card: &CardStats) -> f64 {
        if card.gih_wr.is_none() {
            return 0.5;
        }
        wilson_score_lower_bound(card.gih_wins, card.gih_games, self.config.confidence_z)
    }

    /// Composite score in `[0, 100]`; 0.0 when the card has no win rate
    pub fn calculate_composite_score(&self, card: &CardStats, all_cards: &[CardStats]) -> f64 {
        self.explain_score(card, all_cards)
            .map(|b| b.score)
            .unwrap_or(0.0)
    }

    /// Full breakdown, `None` for cards without a win rate
    pub fn explain_score(&self, card: &CardStats, all_cards: &[CardStats]) -> Option<ScoreBreakdown> {
        card.gih_wr?;
        let population = ReferencePopulation::build(
            all_cards,
            self.config.min_sample_size,
            self.config.confidence_z,
        );
        Some(self.breakdown(card, population.as_ref()))
    }

    fn breakdown(&self, card: &CardStats, population: Option<&ReferencePopulation>) -> ScoreBreakdown {
        let adjusted_wr = self.bayesian_win_rate(card);
        let Some(population) = population else {
            return ScoreBreakdown {
                adjusted_wr,
                score: self.config.scale_center,
                ..Default::default()
            };
        };

        let z_gih_wr = z_score(adjusted_wr, &population.adjusted_wrs);
        let z_iwd = card
            .iwd()
            .map(|iwd| z_score(iwd, &population.iwds))
            .unwrap_or(0.0);
        let z_alsa = z_score(ALSA_INVERSION_BASE - card.alsa, &population.alsa_inverses);
        let z_oh_wr = match card.oh_wr {
            Some(oh) if card.oh_games >= MIN_SPLIT_GAMES => z_score(oh, &population.oh_wrs),
            _ => 0.0,
        };
        let z_gd_wr = match card.gd_wr {
            Some(gd) if card.gd_games >= MIN_SPLIT_GAMES => z_score(gd, &population.gd_wrs),
            _ => 0.0,
        };

        let w = &self.config.weights;
        let weighted_z = w.gih_wr * z_gih_wr
            + w.iwd * z_iwd
            + w.alsa_inverse * z_alsa
            + w.oh_wr * z_oh_wr
            + w.gd_wr * z_gd_wr;

        let score = (self.config.scale_center + weighted_z * self.config.scale_multiplier)
            .clamp(0.0, 100.0);

        ScoreBreakdown {
            adjusted_wr,
            z_gih_wr,
            z_iwd,
            z_alsa,
            z_oh_wr,
            z_gd_wr,
            weighted_z,
            score,
        }
    }

    fn to_card(&self, stats: &CardStats, population: Option<&ReferencePopulation>) -> Card {
        if stats.gih_wr.is_none() {
            debug!("{}: no GIH win rate, marked no_data", stats.name);
            return Card::no_data(stats.clone());
        }
        let breakdown = self.breakdown(stats, population);
        Card {
            composite_score: breakdown.score,
            grade: Grade::from_score(breakdown.score),
            adjusted_gih_wr: breakdown.adjusted_wr,
            ..Card::new(stats.clone())
        }
    }
}

impl CompositeScorer for CardScorer {
    fn score_card(&self, card: &CardStats, all_cards: &[CardStats]) -> Card {
        if card.gih_wr.is_none() {
            return self.to_card(card, None);
        }
        let population = ReferencePopulation::build(
            all_cards,
            self.config.min_sample_size,
            self.config.confidence_z,
        );
        self.to_card(card, population.as_ref())
    }

    fn score_all_cards(&self, cards: &[CardStats]) -> Vec<Card> {
        let population =
            ReferencePopulation::build(cards, self.config.min_sample_size, self.config.confidence_z);

        let mut scored: Vec<Card> = cards
            .iter()
            .map(|stats| self.to_card(stats, population.as_ref()))
            .collect();
        scored.sort_by(|a, b| b.composite_score.total_cmp(&a.composite_score));

        let no_data = scored.iter().filter(|c| c.grade == Grade::NotAvailable).count();
        info!("Scored {} cards ({} without win rate data)", scored.len(), no_data);
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Irregularity, Rarity};

    fn reference_cards(n: usize) -> Vec<CardStats> {
        (0..n)
            .map(|i| {
                CardStats::new(format!("Ref {i}"), "G", Rarity::Common)
                    .with_gih(0.50 + 0.01 * i as f64, 1000)
            })
            .collect()
    }

    #[test]
    fn test_target_scores_within_bounds() {
        let mut target = CardStats::new("Target", "W", Rarity::Rare);
        target.gih_wr = Some(0.55);
        target.gih_games = 1000;
        target.gih_wins = 550;
        target.alsa = 7.0;

        let mut all = reference_cards(20);
        all.push(target.clone());

        let score = CardScorer::default().calculate_composite_score(&target, &all);
        assert!((0.0..=100.0).contains(&score), "score {score}");
    }

    #[test]
    fn test_zero_sample_card_does_not_crash() {
        let mut target = CardStats::new("Fresh", "U", Rarity::Common);
        target.gih_wr = Some(0.6);
        target.gih_games = 0;
        let all = reference_cards(20);

        let score = CardScorer::default().calculate_composite_score(&target, &all);
        assert!((0.0..=100.0).contains(&score));
    }

    #[test]
    fn test_no_data_card() {
        let stats = CardStats::new("Unknown", "B", Rarity::Uncommon);
        let scorer = CardScorer::default();
        let all = reference_cards(20);

        assert_eq!(scorer.calculate_composite_score(&stats, &all), 0.0);
        let card = scorer.score_card(&stats, &all);
        assert_eq!(card.composite_score, 0.0);
        assert_eq!(card.grade, Grade::NotAvailable);
        assert_eq!(card.irregularity, Irregularity::NoData);
    }

    #[test]
    fn test_tiny_population_returns_midpoint() {
        let target = CardStats::new("Solo", "R", Rarity::Common).with_gih(0.6, 1000);
        let score = CardScorer::default().calculate_composite_score(&target, &[target.clone()]);
        assert_eq!(score, 50.0);
    }

    #[test]
    fn test_better_card_scores_higher() {
        let all = reference_cards(20);
        let scorer = CardScorer::default();
        let low = scorer.calculate_composite_score(&all[2], &all);
        let high = scorer.calculate_composite_score(&all[18], &all);
        assert!(high > low);
    }

    #[test]
    fn test_reference_falls_back_to_all_cards() {
        // All below the 500-game preference, still a valid population.
        let all: Vec<CardStats> = (0..12)
            .map(|i| {
                CardStats::new(format!("Low {i}"), "W", Rarity::Common)
                    .with_gih(0.48 + 0.01 * i as f64, 300)
            })
            .collect();
        let scorer = CardScorer::default();
        let top = scorer.calculate_composite_score(&all[11], &all);
        assert!(top > 50.0);
    }

    #[test]
    fn test_weights_normalized() {
        let scorer = CardScorer::new(CardScorerConfig {
            weights: ScoringWeights {
                gih_wr: 0.9,
                iwd: 0.4,
                alsa_inverse: 0.3,
                oh_wr: 0.2,
                gd_wr: 0.2,
            },
            ..Default::default()
        });
        assert!((scorer.config().weights.sum() - 1.0).abs() < 1e-9);
        assert!((scorer.config().weights.gih_wr - 0.45).abs() < 1e-9);
    }

    #[test]
    fn test_score_all_sorted_and_grades_assigned() {
        let mut cards = reference_cards(20);
        cards.push(CardStats::new("Blank", "U", Rarity::Common));
        let scored = CardScorer::default().score_all_cards(&cards);

        assert_eq!(scored.len(), 21);
        for pair in scored.windows(2) {
            assert!(pair[0].composite_score >= pair[1].composite_score);
        }
        let last = scored.last().unwrap();
        assert_eq!(last.name(), "Blank");
        assert_eq!(last.grade, Grade::NotAvailable);
        for card in scored.iter().filter(|c| c.stats.gih_wr.is_some()) {
            assert_eq!(card.grade, Grade::from_score(card.composite_score));
        }
    }

    #[test]
    fn test_bayesian_win_rate_defaults() {
        let scorer = CardScorer::default();
        let stats = CardStats::new("None", "W", Rarity::Common);
        assert_eq!(scorer.bayesian_win_rate(&stats), 0.5);
    }
}
