//! Card, color and archetype scoring
//!
//! Every score here is relative: it is measured against the population of
//! the current (expansion, format) and recomputed from scratch on each run.
//!
//! # Card Score
//!
//! ```text
//! adjusted_wr = wilson_lower_bound(gih_wins, gih_games, 1.96)
//!
//! weighted_z = 0.45 × z(adjusted_wr)
//!            + 0.20 × z(iwd)
//!            + 0.15 × z(14 - alsa)
//!            + 0.10 × z(oh_wr)      (≥100 opening-hand games)
//!            + 0.10 × z(gd_wr)      (≥100 drawn games)
//!
//! score = clamp(50 + weighted_z × 15, 0, 100)
//! ```
//!
//! Grades: A+ ≥90, A ≥80, B+ ≥70, B ≥60, C+ ≥50, C ≥40, D ≥30, else F.
//! Cards without a GIH WR score 0 with grade N/A and are never ranked.
//!
//! # Irregularities
//!
//! ```text
//! deviation = wilson_lower_bound - (0.50 + pick_rate × 0.12 - (alsa - 7) × 0.01)
//! z ≥ sleeper_z → sleeper
//! z ≤ trap_z    → trap
//! ```
//!
//! # Color Strength
//!
//! ```text
//! strength = 0.35 × deck_wr + 0.25 × archetype_success
//!          + 0.15 × top_commons + 0.10 × top_uncommons
//!          + 0.10 × bomb_factor + 0.05 × depth
//! ```
//!
//! # Archetype Strength
//!
//! ```text
//! strength = (wr - 0.50) × 1000 + lift × 50 + synergy_ratio × 15
//!          + max(0, 5 - lift_std × 100) × 2
//!          + commons × 0.1 + uncommons × 0.1
//! ```

mod archetype;
mod card_scorer;
mod color_scorer;
mod irregularity;
mod viability;

pub use archetype::{
    build_all_archetypes, build_archetype, detect_archetype_structure, ArchetypeStructure,
    MIN_ARCHETYPE_GAMES, MIN_STRUCTURE_GAMES,
};
pub use card_scorer::{CardScorer, CardScorerConfig, CompositeScorer, ScoreBreakdown, ScoringWeights};
pub use color_scorer::{ColorScorer, ColorScorerConfig, ColorWeights, StabilityWeight, TopN};
pub use irregularity::{IrregularityAnalysis, IrregularityClassifier, IrregularityDetector};
pub use viability::{calculate_viability, enrich_cards_with_viability, DEFAULT_VIABILITY_MIN_GAMES};
