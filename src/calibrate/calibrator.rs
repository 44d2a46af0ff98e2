//! Percentile-based threshold calibrator
//!
//! Guardrails:
//! 1. Only cards with at least 200 GIH games enter any distribution
//! 2. Fewer than 50 qualifying cards is logged as unreliable, not rejected
//! 3. Empty populations fall back to fixed defaults (0.002 variance, ±0.03 deviation)

use super::expected_win_rate;
use crate::models::{CalibrationPercentiles, CardStats, ThresholdConfig};
use crate::stats::{mean, median, percentile, stdev, variance};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// Minimum GIH games for a card to shape the distributions
pub const MIN_CALIBRATION_GAMES: u64 = 200;

/// Below this many qualifying cards the calibration is flagged unreliable
const MIN_RELIABLE_CARDS: usize = 50;

/// Minimum archetype entries before a card's cross-archetype variance counts
const MIN_ARCHETYPES_FOR_VARIANCE: usize = 3;

const DEFAULT_SYNERGY_VARIANCE: f64 = 0.002;
const DEFAULT_DEVIATION: f64 = 0.03;

/// Distribution statistics observed during calibration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CalibrationStats {
    pub gih_wr_mean: f64,
    pub gih_wr_std: f64,
    pub gih_wr_median: f64,

    pub variance_mean: f64,
    pub variance_std: f64,
    pub variance_median: f64,

    /// Actual minus expected win rate
    pub deviation_mean: f64,
    pub deviation_std: f64,

    pub total_cards: usize,
    pub cards_with_variance: usize,

    pub gih_wr_bomb: f64,
    pub gih_wr_playable: f64,
    pub variance_synergy: f64,
    pub deviation_sleeper: f64,
    pub deviation_trap: f64,
}

impl CalibrationStats {
    /// Human-readable distribution report
    pub fn distribution_report(&self, percentiles: &CalibrationPercentiles) -> String {
        format!(
            r#"
=== Calibration Distribution Report ===

GIH Win Rate Distribution:
  Mean:   {:.4}
  StdDev: {:.4}
  Median: {:.4}
  P{:.0} (Bomb threshold):     {:.4}
  P{:.0} (Playable threshold): {:.4}

Archetype Variance Distribution:
  Cards with variance data: {}
  Mean:   {:.6}
  StdDev: {:.6}
  Median: {:.6}
  P{:.0} (Synergy threshold):  {:.6}

Deviation Distribution (Actual - Expected WR):
  Mean:   {:.4}
  StdDev: {:.4}
  P{:.0} (Sleeper deviation): {:.4}
  P{:.0} (Trap deviation):    {:.4}

Sample Size: {} cards
"#,
            self.gih_wr_mean,
            self.gih_wr_std,
            self.gih_wr_median,
            percentiles.bomb,
            self.gih_wr_bomb,
            percentiles.playable,
            self.gih_wr_playable,
            self.cards_with_variance,
            self.variance_mean,
            self.variance_std,
            self.variance_median,
            percentiles.synergy,
            self.variance_synergy,
            self.deviation_mean,
            self.deviation_std,
            percentiles.sleeper,
            self.deviation_sleeper,
            percentiles.trap,
            self.deviation_trap,
            self.total_cards,
        )
    }
}

/// Calibrated thresholds plus the statistics behind them
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    pub thresholds: ThresholdConfig,
    /// `None` when the data had no usable win rates
    pub stats: Option<CalibrationStats>,
}

impl Calibration {
    pub fn distribution_report(&self) -> String {
        match &self.stats {
            Some(stats) => {
                stats.distribution_report(&self.thresholds.calibration_percentiles)
            }
            None => "No calibration data available.".to_string(),
        }
    }
}

/// Derives thresholds from the card distribution
#[derive(Debug, Clone, Default)]
pub struct Calibrator {
    percentiles: CalibrationPercentiles,
}

impl Calibrator {
    pub fn new(percentiles: CalibrationPercentiles) -> Self {
        Self { percentiles }
    }

    pub fn percentiles(&self) -> &CalibrationPercentiles {
        &self.percentiles
    }

    /// Thresholds only
    pub fn calibrate(&self, cards: &[CardStats]) -> ThresholdConfig {
        self.calibrate_with_stats(cards).thresholds
    }

    /// Thresholds and the distribution statistics they came from
    pub fn calibrate_with_stats(&self, cards: &[CardStats]) -> Calibration {
        let fallback = Calibration {
            thresholds: ThresholdConfig {
                calibration_percentiles: self.percentiles,
                ..ThresholdConfig::default()
            },
            stats: None,
        };

        if cards.is_empty() {
            warn!("No cards provided for calibration, using defaults");
            return fallback;
        }

        let valid: Vec<&CardStats> = cards
            .iter()
            .filter(|c| c.gih_games >= MIN_CALIBRATION_GAMES)
            .collect();

        if valid.len() < MIN_RELIABLE_CARDS {
            warn!(
                "Only {} cards with sufficient data, calibration may be unreliable",
                valid.len()
            );
        }

        let gih_wrs: Vec<f64> = valid
            .iter()
            .filter_map(|c| c.gih_wr)
            .filter(|wr| *wr > 0.0)
            .collect();

        if gih_wrs.is_empty() {
            error!("No valid GIH WR data for calibration, using defaults");
            return fallback;
        }

        let variances: Vec<f64> = valid
            .iter()
            .filter(|c| c.archetype_wrs.len() >= MIN_ARCHETYPES_FOR_VARIANCE)
            .map(|c| variance(&c.archetype_wrs.values().copied().collect::<Vec<_>>()))
            .collect();

        let deviations: Vec<f64> = valid
            .iter()
            .filter_map(|c| c.gih_wr.map(|wr| wr - expected_win_rate(c)))
            .collect();

        let synergy_variance = if variances.is_empty() {
            DEFAULT_SYNERGY_VARIANCE
        } else {
            percentile(&variances, self.percentiles.synergy)
        };

        let dev_mean = mean(&deviations);
        let dev_std = if deviations.len() > 1 {
            stdev(&deviations)
        } else {
            DEFAULT_DEVIATION
        };
        let dev_std = if dev_std > 0.0 {
            dev_std
        } else {
            DEFAULT_DEVIATION
        };

        let (sleeper_deviation, trap_deviation) = if deviations.is_empty() {
            (DEFAULT_DEVIATION, -DEFAULT_DEVIATION)
        } else {
            (
                percentile(&deviations, self.percentiles.sleeper),
                percentile(&deviations, self.percentiles.trap),
            )
        };

        // Re-express the percentile cutoffs on the detector's z-score scale.
        let sleeper_z = (sleeper_deviation - dev_mean) / dev_std;
        let trap_z = (trap_deviation - dev_mean) / dev_std;

        let bomb_wr = percentile(&gih_wrs, self.percentiles.bomb);
        let playable_wr = percentile(&gih_wrs, self.percentiles.playable);

        let stats = CalibrationStats {
            gih_wr_mean: mean(&gih_wrs),
            gih_wr_std: if gih_wrs.len() > 1 { stdev(&gih_wrs) } else { 0.05 },
            gih_wr_median: median(&gih_wrs),
            variance_mean: mean(&variances),
            variance_std: stdev(&variances),
            variance_median: median(&variances),
            deviation_mean: dev_mean,
            deviation_std: dev_std,
            total_cards: valid.len(),
            cards_with_variance: variances.len(),
            gih_wr_bomb: bomb_wr,
            gih_wr_playable: playable_wr,
            variance_synergy: synergy_variance,
            deviation_sleeper: sleeper_deviation,
            deviation_trap: trap_deviation,
        };

        let thresholds = ThresholdConfig {
            synergy_variance,
            stable_variance: synergy_variance / 2.0,
            sleeper_z,
            trap_z,
            bomb_wr,
            playable_wr,
            min_games: MIN_CALIBRATION_GAMES,
            calibration_percentiles: self.percentiles,
        };

        info!(
            "Calibration complete: bomb_wr={:.3}, playable_wr={:.3}, sleeper_z={:.2}, trap_z={:.2}",
            bomb_wr, playable_wr, sleeper_z, trap_z
        );

        Calibration {
            thresholds,
            stats: Some(stats),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rarity;

    /// Cards with spread-out win rates and pick signals
    fn sample_cards(n: usize) -> Vec<CardStats> {
        (0..n)
            .map(|i| {
                let wr = 0.45 + (i % 15) as f64 * 0.01;
                let mut card = CardStats::new(format!("Card {i}"), "W", Rarity::Common)
                    .with_gih(wr, 1000);
                card.seen_count = 1000;
                card.pick_count = 100 + (i as u64 * 37) % 500;
                card.alsa = 2.0 + (i % 9) as f64;
                card
            })
            .collect()
    }

    #[test]
    fn test_empty_input_uses_defaults() {
        let calibration = Calibrator::default().calibrate_with_stats(&[]);
        assert_eq!(calibration.thresholds, ThresholdConfig::default());
        assert!(calibration.stats.is_none());
    }

    #[test]
    fn test_low_sample_cards_ignored() {
        let cards: Vec<CardStats> = sample_cards(60)
            .into_iter()
            .map(|mut c| {
                c.gih_games = 150;
                c
            })
            .collect();
        let thresholds = Calibrator::default().calibrate(&cards);
        assert_eq!(thresholds.sleeper_z, 1.0);
        assert_eq!(thresholds.bomb_wr, 0.60);
    }

    #[test]
    fn test_missing_win_rates_use_defaults() {
        let cards: Vec<CardStats> = sample_cards(60)
            .into_iter()
            .map(|mut c| {
                c.gih_wr = None;
                c
            })
            .collect();
        let calibration = Calibrator::default().calibrate_with_stats(&cards);
        assert!(calibration.stats.is_none());
        assert_eq!(calibration.thresholds.synergy_variance, 0.002);
    }

    #[test]
    fn test_calibrated_thresholds_from_distribution() {
        let cards = sample_cards(100);
        let calibration = Calibrator::default().calibrate_with_stats(&cards);
        let t = &calibration.thresholds;
        let gih: Vec<f64> = cards.iter().filter_map(|c| c.gih_wr).collect();

        assert!((t.bomb_wr - percentile(&gih, 95.0)).abs() < 1e-12);
        assert!((t.playable_wr - percentile(&gih, 35.0)).abs() < 1e-12);
        assert!(t.sleeper_z > 0.0);
        assert!(t.trap_z < 0.0);
        // No archetype data anywhere.
        assert_eq!(t.synergy_variance, 0.002);
        assert_eq!(t.stable_variance, 0.001);
        assert_eq!(t.min_games, 200);

        let stats = calibration.stats.unwrap();
        assert_eq!(stats.total_cards, 100);
        assert_eq!(stats.cards_with_variance, 0);
    }

    #[test]
    fn test_synergy_variance_from_archetypes() {
        let mut cards = sample_cards(60);
        for (i, card) in cards.iter_mut().enumerate() {
            let spread = 0.01 * (1 + i % 4) as f64;
            card.archetype_wrs.insert("WU".into(), 0.55 + spread);
            card.archetype_wrs.insert("WB".into(), 0.55);
            card.archetype_wrs.insert("WR".into(), 0.55 - spread);
        }
        let t = Calibrator::default().calibrate(&cards);
        // Variances are spread^2 for spreads of 0.01..0.04
        assert!(t.synergy_variance > 0.0001);
        assert!((t.stable_variance * 2.0 - t.synergy_variance).abs() < 1e-15);
    }

    #[test]
    fn test_sleeper_z_monotonic_in_percentile() {
        let cards = sample_cards(120);
        let mut last = f64::NEG_INFINITY;
        for p in [50.0, 60.0, 75.0, 85.0, 90.0, 95.0, 99.0] {
            let calibrator = Calibrator::new(CalibrationPercentiles {
                sleeper: p,
                ..Default::default()
            });
            let z = calibrator.calibrate(&cards).sleeper_z;
            assert!(z >= last, "sleeper_z decreased at p={p}");
            last = z;
        }
    }

    #[test]
    fn test_distribution_report_mentions_sample_size() {
        let calibration = Calibrator::default().calibrate_with_stats(&sample_cards(80));
        let report = calibration.distribution_report();
        assert!(report.contains("Sample Size: 80 cards"));
        assert!(report.contains("P95 (Bomb threshold)"));
    }
}
