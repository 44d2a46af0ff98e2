//! Sleeper and trap detection
//!
//! A card's deviation is its Wilson-adjusted GIH WR minus the win rate its
//! draft signals predict. Deviations are z-scored against every
//! well-sampled card of the format.

use crate::calibrate::expected_win_rate;
use crate::models::{Card, CardStats, Irregularity, ThresholdConfig};
use crate::stats::{wilson_score_lower_bound, z_score, DEFAULT_WILSON_Z};
use tracing::{debug, info, warn};

/// Below this many reference cards nothing is classified
const MIN_REFERENCE_CARDS: usize = 20;

const SLEEPER_Z_RANGE: (f64, f64) = (0.3, 2.5);
const TRAP_Z_RANGE: (f64, f64) = (-2.5, -0.3);
const DEFAULT_SLEEPER_Z: f64 = 1.0;
const DEFAULT_TRAP_Z: f64 = -1.0;
const DEFAULT_MIN_GAMES: u64 = 200;

/// Cards partitioned by classification
#[derive(Debug, Clone, Default)]
pub struct IrregularityAnalysis {
    /// Every input card, classified, in input order
    pub all_cards: Vec<Card>,
    /// Highest z first
    pub sleepers: Vec<Card>,
    /// Lowest z first
    pub traps: Vec<Card>,
    pub no_data: Vec<Card>,
}

/// Classifies cards as sleeper, trap, normal or no-data
pub trait IrregularityClassifier {
    /// Classification and deviation z-score of one card
    fn detect_irregularity(&self, card: &CardStats, all_cards: &[CardStats]) -> (Irregularity, f64);

    /// Classify every card and partition the result
    fn analyze_all_cards(&self, cards: Vec<Card>) -> IrregularityAnalysis;
}

#[derive(Debug, Clone, PartialEq)]
pub struct IrregularityDetector {
    sleeper_z: f64,
    trap_z: f64,
    min_games: u64,
}

impl Default for IrregularityDetector {
    fn default() -> Self {
        Self::new(DEFAULT_SLEEPER_Z, DEFAULT_TRAP_Z, DEFAULT_MIN_GAMES)
    }
}

impl IrregularityDetector {
    pub fn new(sleeper_z: f64, trap_z: f64, min_games: u64) -> Self {
        Self {
            sleeper_z,
            trap_z,
            min_games,
        }
    }

    /// Detector from calibrated thresholds, with out-of-range cutoffs reset
    pub fn from_thresholds(thresholds: &ThresholdConfig) -> Self {
        let mut sleeper_z = thresholds.sleeper_z;
        let mut trap_z = thresholds.trap_z;

        if !(SLEEPER_Z_RANGE.0..=SLEEPER_Z_RANGE.1).contains(&sleeper_z) {
            warn!(
                "Calibrated sleeper_z {:.3} outside [{}, {}], using {}",
                sleeper_z, SLEEPER_Z_RANGE.0, SLEEPER_Z_RANGE.1, DEFAULT_SLEEPER_Z
            );
            sleeper_z = DEFAULT_SLEEPER_Z;
        }
        if !(TRAP_Z_RANGE.0..=TRAP_Z_RANGE.1).contains(&trap_z) {
            warn!(
                "Calibrated trap_z {:.3} outside [{}, {}], using {}",
                trap_z, TRAP_Z_RANGE.0, TRAP_Z_RANGE.1, DEFAULT_TRAP_Z
            );
            trap_z = DEFAULT_TRAP_Z;
        }

        Self::new(sleeper_z, trap_z, thresholds.min_games)
    }

    pub fn sleeper_z(&self) -> f64 {
        self.sleeper_z
    }

    pub fn trap_z(&self) -> f64 {
        self.trap_z
    }

    pub fn min_games(&self) -> u64 {
        self.min_games
    }

    fn deviation(stats: &CardStats) -> f64 {
        wilson_score_lower_bound(stats.gih_wins, stats.gih_games, DEFAULT_WILSON_Z)
            - expected_win_rate(stats)
    }

    /// Deviations of the reference population, `None` when too small
    fn reference_deviations<'a>(
        &self,
        cards: impl Iterator<Item = &'a CardStats>,
    ) -> Option<Vec<f64>> {
        let deviations: Vec<f64> = cards
            .filter(|c| c.gih_games >= self.min_games && c.gih_wr.is_some())
            .map(Self::deviation)
            .collect();
        if deviations.len() < MIN_REFERENCE_CARDS {
            return None;
        }
        Some(deviations)
    }

    fn classify(&self, stats: &CardStats, deviations: Option<&[f64]>) -> (Irregularity, f64) {
        if stats.gih_wr.is_none() {
            return (Irregularity::NoData, 0.0);
        }
        let Some(deviations) = deviations else {
            return (Irregularity::Normal, 0.0);
        };

        let z = z_score(Self::deviation(stats), deviations);
        let kind = if z >= self.sleeper_z {
            Irregularity::Sleeper
        } else if z <= self.trap_z {
            Irregularity::Trap
        } else {
            Irregularity::Normal
        };
        (kind, z)
    }
}

impl IrregularityClassifier for IrregularityDetector {
    fn detect_irregularity(&self, card: &CardStats, all_cards: &[CardStats]) -> (Irregularity, f64) {
        let deviations = self.reference_deviations(all_cards.iter());
        self.classify(card, deviations.as_deref())
    }

    fn analyze_all_cards(&self, cards: Vec<Card>) -> IrregularityAnalysis {
        let deviations = self.reference_deviations(cards.iter().map(|c| &c.stats));
        if deviations.is_none() {
            warn!(
                "Fewer than {} cards with {}+ games, skipping irregularity detection",
                MIN_REFERENCE_CARDS, self.min_games
            );
        }

        let mut analysis = IrregularityAnalysis::default();
        for mut card in cards {
            if card.irregularity != Irregularity::NoData {
                let (kind, z) = self.classify(&card.stats, deviations.as_deref());
                card.irregularity = kind;
                card.irregularity_z = z;
            }
            match card.irregularity {
                Irregularity::Sleeper => analysis.sleepers.push(card.clone()),
                Irregularity::Trap => analysis.traps.push(card.clone()),
                Irregularity::NoData => analysis.no_data.push(card.clone()),
                Irregularity::Normal => {}
            }
            analysis.all_cards.push(card);
        }

        analysis
            .sleepers
            .sort_by(|a, b| b.irregularity_z.total_cmp(&a.irregularity_z));
        analysis
            .traps
            .sort_by(|a, b| a.irregularity_z.total_cmp(&b.irregularity_z));

        for card in analysis.sleepers.iter().take(3) {
            debug!("Sleeper {} (z={:.2})", card.name(), card.irregularity_z);
        }
        info!(
            "Irregularities: {} sleepers, {} traps, {} without data",
            analysis.sleepers.len(),
            analysis.traps.len(),
            analysis.no_data.len()
        );
        analysis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rarity;
    use proptest::prelude::*;

    fn population(wrs: &[f64]) -> Vec<CardStats> {
        wrs.iter()
            .enumerate()
            .map(|(i, wr)| {
                let mut stats =
                    CardStats::new(format!("Card {i}"), "W", Rarity::Common).with_gih(*wr, 2000);
                stats.seen_count = 1000;
                stats.pick_count = 300;
                stats
            })
            .collect()
    }

    fn spread(n: usize) -> Vec<f64> {
        (0..n).map(|i| 0.45 + 0.005 * i as f64).collect()
    }

    #[test]
    fn test_from_thresholds_clamps() {
        let thresholds = ThresholdConfig {
            sleeper_z: 3.7,
            trap_z: -0.1,
            min_games: 150,
            ..Default::default()
        };
        let detector = IrregularityDetector::from_thresholds(&thresholds);
        assert_eq!(detector.sleeper_z(), 1.0);
        assert_eq!(detector.trap_z(), -1.0);
        assert_eq!(detector.min_games(), 150);

        let thresholds = ThresholdConfig {
            sleeper_z: 1.4,
            trap_z: -1.2,
            ..Default::default()
        };
        let detector = IrregularityDetector::from_thresholds(&thresholds);
        assert_eq!(detector.sleeper_z(), 1.4);
        assert_eq!(detector.trap_z(), -1.2);
    }

    #[test]
    fn test_no_data_short_circuits() {
        let detector = IrregularityDetector::default();
        let all = population(&spread(30));
        let blank = CardStats::new("Blank", "U", Rarity::Common);
        assert_eq!(
            detector.detect_irregularity(&blank, &all),
            (Irregularity::NoData, 0.0)
        );
    }

    #[test]
    fn test_small_population_is_normal() {
        let detector = IrregularityDetector::default();
        let all = population(&spread(19));
        let (kind, z) = detector.detect_irregularity(&all[18], &all);
        assert_eq!(kind, Irregularity::Normal);
        assert_eq!(z, 0.0);
    }

    #[test]
    fn test_extremes_classified() {
        let detector = IrregularityDetector::default();
        let all = population(&spread(30));
        assert_eq!(
            detector.detect_irregularity(&all[29], &all).0,
            Irregularity::Sleeper
        );
        assert_eq!(detector.detect_irregularity(&all[0], &all).0, Irregularity::Trap);
        assert_eq!(
            detector.detect_irregularity(&all[15], &all).0,
            Irregularity::Normal
        );
    }

    #[test]
    fn test_analyze_all_partitions_and_sorts() {
        let detector = IrregularityDetector::default();
        let mut cards: Vec<Card> = population(&spread(30)).into_iter().map(Card::new).collect();
        cards.push(Card::no_data(CardStats::new("Blank", "G", Rarity::Rare)));

        let analysis = detector.analyze_all_cards(cards);
        assert_eq!(analysis.all_cards.len(), 31);
        assert_eq!(analysis.no_data.len(), 1);
        assert!(!analysis.sleepers.is_empty());
        assert!(!analysis.traps.is_empty());
        assert_eq!(analysis.sleepers[0].name(), "Card 29");
        assert_eq!(analysis.traps[0].name(), "Card 0");
        for pair in analysis.sleepers.windows(2) {
            assert!(pair[0].irregularity_z >= pair[1].irregularity_z);
        }
        for pair in analysis.traps.windows(2) {
            assert!(pair[0].irregularity_z <= pair[1].irregularity_z);
        }
    }

    #[test]
    fn test_analyze_all_keeps_no_data_tag() {
        let detector = IrregularityDetector::default();
        let mut stats = CardStats::new("Odd", "B", Rarity::Common).with_gih(0.6, 3000);
        stats.seen_count = 10;
        let card = Card::no_data(stats);
        let analysis = detector.analyze_all_cards(vec![card]);
        assert_eq!(analysis.all_cards[0].irregularity, Irregularity::NoData);
    }

    proptest! {
        #[test]
        fn test_max_deviation_never_trap_min_never_sleeper(
            wrs in proptest::collection::vec(0.35f64..0.70, 20..40)
        ) {
            let detector = IrregularityDetector::default();
            let all = population(&wrs);
            let deviations: Vec<f64> = all.iter().map(IrregularityDetector::deviation).collect();

            let (max_idx, _) = deviations
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))
                .unwrap();
            let (min_idx, _) = deviations
                .iter()
                .enumerate()
                .min_by(|a, b| a.1.total_cmp(b.1))
                .unwrap();

            prop_assert_ne!(detector.detect_irregularity(&all[max_idx], &all).0, Irregularity::Trap);
            prop_assert_ne!(detector.detect_irregularity(&all[min_idx], &all).0, Irregularity::Sleeper);
        }
    }
}
