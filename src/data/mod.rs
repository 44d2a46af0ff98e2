//! Upstream data boundary
//!
//! Two providers feed the analysis: 17lands for draft statistics and
//! Scryfall for card text. Both sit behind traits so the pipeline can run
//! against in-memory fixtures.

mod fallback;
mod loader;
mod mana;
mod metadata;
mod records;

pub use fallback::compute_color_pairs_from_cards;
pub use loader::{SeventeenLandsClient, SEVENTEEN_LANDS_BASE_URL};
pub use mana::parse_mana_requirements;
pub use metadata::{CardMetadataCache, CardMetadataProvider, ScryfallClient, SCRYFALL_BASE_URL};
pub use records::{CardRecord, ColorRecord, TrophyDeckRecord};

use crate::models::{CardStats, PlayDrawStats};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{info, warn};

/// Two-letter archetype code -> card ratings inside that archetype
pub type ArchetypeRatings = BTreeMap<String, Vec<CardRecord>>;

/// Errors at the upstream HTTP boundary
#[derive(Error, Debug)]
pub enum DataError {
    #[error("HTTP {status} from {url}")]
    Http { url: String, status: u16 },

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Malformed response from {url}: {message}")]
    Parse { url: String, message: String },

    #[error("Cache IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type DataResult<T> = Result<T, DataError>;

/// Source of draft statistics for one (expansion, format)
pub trait DraftDataSource {
    fn fetch_card_ratings(&self, expansion: &str, format: &str) -> DataResult<Vec<CardRecord>>;

    fn fetch_color_ratings(&self, expansion: &str, format: &str)
        -> DataResult<Vec<ColorRecord>>;

    /// Card ratings restricted to decks of one color combination
    fn fetch_archetype_ratings(
        &self,
        expansion: &str,
        format: &str,
        colors: &str,
    ) -> DataResult<Vec<CardRecord>>;

    fn fetch_trophy_decks(
        &self,
        _expansion: &str,
        _format: &str,
    ) -> DataResult<Vec<TrophyDeckRecord>> {
        Ok(Vec::new())
    }

    fn fetch_play_draw_stats(
        &self,
        _expansion: &str,
        _format: &str,
    ) -> DataResult<Option<PlayDrawStats>> {
        Ok(None)
    }
}

/// Archetype ratings for every requested pair; failing pairs are skipped
pub fn fetch_all_archetype_ratings(
    source: &dyn DraftDataSource,
    expansion: &str,
    format: &str,
    pairs: &[&str],
) -> ArchetypeRatings {
    let mut ratings = ArchetypeRatings::new();
    for colors in pairs {
        match source.fetch_archetype_ratings(expansion, format, colors) {
            Ok(records) if !records.is_empty() => {
                ratings.insert(colors.to_string(), records);
            }
            Ok(_) => warn!("No archetype ratings for {}", colors),
            Err(e) => warn!("Failed to load archetype ratings for {}: {}", colors, e),
        }
    }
    info!(
        "Loaded archetype ratings for {}/{} color pairs",
        ratings.len(),
        pairs.len()
    );
    ratings
}

/// Total games in the sample: the largest per-card deck count
pub fn total_games(cards: &[CardStats]) -> u64 {
    cards.iter().map(|c| c.game_count).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rarity;

    struct FlakySource;

    impl DraftDataSource for FlakySource {
        fn fetch_card_ratings(&self, _: &str, _: &str) -> DataResult<Vec<CardRecord>> {
            Ok(Vec::new())
        }

        fn fetch_color_ratings(&self, _: &str, _: &str) -> DataResult<Vec<ColorRecord>> {
            Ok(Vec::new())
        }

        fn fetch_archetype_ratings(
            &self,
            _: &str,
            _: &str,
            colors: &str,
        ) -> DataResult<Vec<CardRecord>> {
            match colors {
                "WU" => Ok(vec![CardRecord {
                    name: "Sky Patrol".into(),
                    ..Default::default()
                }]),
                "UB" => Ok(Vec::new()),
                _ => Err(DataError::Http {
                    url: "test".into(),
                    status: 503,
                }),
            }
        }
    }

    #[test]
    fn test_fetch_all_skips_failures() {
        let ratings = fetch_all_archetype_ratings(&FlakySource, "FDN", "PremierDraft", &[
            "WU", "UB", "BR",
        ]);
        assert_eq!(ratings.len(), 1);
        assert!(ratings.contains_key("WU"));
    }

    #[test]
    fn test_default_optional_endpoints() {
        assert!(FlakySource.fetch_trophy_decks("FDN", "PremierDraft").unwrap().is_empty());
        assert!(FlakySource.fetch_play_draw_stats("FDN", "PremierDraft").unwrap().is_none());
    }

    #[test]
    fn test_total_games_is_max() {
        let mut a = CardStats::new("A", "W", Rarity::Common);
        a.game_count = 100;
        let mut b = CardStats::new("B", "U", Rarity::Common);
        b.game_count = 250;
        assert_eq!(total_games(&[a, b]), 250);
        assert_eq!(total_games(&[]), 0);
    }
}
