//! Checks detected sleepers/traps against hand-curated lists

use crate::models::{Card, Irregularity};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Precision/recall of one detection class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DetectionMetrics {
    pub detected: usize,
    pub known: usize,
    pub true_positives: usize,
    pub precision: f64,
    pub recall: f64,
}

impl DetectionMetrics {
    fn compute(detected: &HashSet<&str>, known: &HashSet<&str>) -> Self {
        let true_positives = detected.intersection(known).count();
        let ratio = |num: usize, den: usize| {
            if den == 0 {
                0.0
            } else {
                num as f64 / den as f64
            }
        };
        Self {
            detected: detected.len(),
            known: known.len(),
            true_positives,
            precision: ratio(true_positives, detected.len()),
            recall: ratio(true_positives, known.len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CalibrationValidation {
    pub sleeper: DetectionMetrics,
    pub trap: DetectionMetrics,
}

/// Compare classified cards with known sleeper and trap names
pub fn validate_calibration(
    cards: &[Card],
    known_sleepers: &[&str],
    known_traps: &[&str],
) -> CalibrationValidation {
    let detected = |kind: Irregularity| -> HashSet<&str> {
        cards
            .iter()
            .filter(|c| c.irregularity == kind)
            .map(|c| c.name())
            .collect()
    };
    let known_sleepers: HashSet<&str> = known_sleepers.iter().copied().collect();
    let known_traps: HashSet<&str> = known_traps.iter().copied().collect();

    CalibrationValidation {
        sleeper: DetectionMetrics::compute(&detected(Irregularity::Sleeper), &known_sleepers),
        trap: DetectionMetrics::compute(&detected(Irregularity::Trap), &known_traps),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CardStats, Rarity};

    fn classified(name: &str, kind: Irregularity) -> Card {
        let mut card = Card::new(CardStats::new(name, "B", Rarity::Common));
        card.irregularity = kind;
        card
    }

    #[test]
    fn test_precision_and_recall() {
        let cards = vec![
            classified("A", Irregularity::Sleeper),
            classified("B", Irregularity::Sleeper),
            classified("C", Irregularity::Trap),
            classified("D", Irregularity::Normal),
        ];
        let result = validate_calibration(&cards, &["A", "D"], &["C"]);

        assert_eq!(result.sleeper.detected, 2);
        assert_eq!(result.sleeper.true_positives, 1);
        assert_eq!(result.sleeper.precision, 0.5);
        assert_eq!(result.sleeper.recall, 0.5);
        assert_eq!(result.trap.precision, 1.0);
        assert_eq!(result.trap.recall, 1.0);
    }

    #[test]
    fn test_empty_lists() {
        let result = validate_calibration(&[], &[], &[]);
        assert_eq!(result.sleeper.precision, 0.0);
        assert_eq!(result.trap.recall, 0.0);
    }
}
