//! Core data models for draftmeta
//!
//! Raw upstream statistics ([`CardStats`]) flow through calibration and
//! scoring into derived values ([`Card`], [`Archetype`], [`ColorStrength`])
//! that are collected in one [`MetaSnapshot`] per (expansion, format).

mod archetype;
mod card;
mod color;
mod meta;
mod trophy;

pub use archetype::{Archetype, ColorPair, ColorStrength, SplashVariant};
pub use card::{
    Card, CardMetadata, CardStats, Grade, Irregularity, ManaRequirements, Rarity, Viability,
};
pub use color::{
    canonical_colors, guild_name, normalize_color_pair, BASIC_LANDS, COLORS, COLOR_PAIRS,
};
pub use meta::{
    CalibrationPercentiles, FormatSpeed, LlmSections, MetaSnapshot, PlayDrawStats,
    SplashIndicator, SplashLabel, SplashValidation, SpeedLabel, ThresholdConfig,
};
pub use trophy::{
    ArchetypeTrophyStats, TrophyDeck, TrophyDocument, TrophyDocumentMeta, TrophyStats, UsageEntry,
};
