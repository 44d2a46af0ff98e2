//! Format-level analysis on top of scored cards
//!
//! - [`speed`]: how fast the format plays
//! - [`splash`]: how well the format supports a third color
//! - [`playability`]: hybrid-aware castability and keyword counts
//! - [`trophy`]: 7-win deck statistics
//! - [`evaluator`]: lookups and pick suggestions over a snapshot

mod evaluator;
mod playability;
mod speed;
mod splash;
mod trophy;

pub use evaluator::{CardEvaluator, BOMB_SCORE};
pub use playability::{
    is_card_playable_in_colors, keyword_distribution, requires_splash_for_card,
    KeywordDistribution,
};
pub use speed::{calculate_format_speed, classify_speed_from_api, speed_interpretation};
pub use splash::{calculate_splash_indicator, is_dual_land, is_mana_fixer};
pub use trophy::{MetadataIndex, TrophyAnalyzer, TrophyCacheStore, DEFAULT_MAX_DECKS};
