//! Trophy (7-win) deck statistics
//!
//! Only the trophy list metadata is fetched. Card usage, curve and creature
//! counts are estimated from the per-archetype card ratings, with CMC and
//! type lines taken from card metadata.

use crate::cache::{get_trophy_cache_path, CacheLayer};
use crate::data::{ArchetypeRatings, DataResult, DraftDataSource, TrophyDeckRecord};
use crate::models::{
    ArchetypeTrophyStats, CardMetadata, Rarity, TrophyDeck, TrophyDocument, TrophyStats,
    BASIC_LANDS,
};
use anyhow::Context;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Nonland cards in a typical draft deck
const NONLAND_CARDS_PER_DECK: f64 = 23.0;
/// Games per unit of displayed card usage
const USAGE_GAMES_PER_UNIT: f64 = 1000.0;

pub const DEFAULT_MAX_DECKS: usize = 500;

/// Card name -> metadata, for CMC and type lookups
pub type MetadataIndex = BTreeMap<String, CardMetadata>;

fn cmc_bucket(cmc: f64) -> &'static str {
    if cmc <= 1.0 {
        return "1";
    }
    match cmc {
        c if c == 2.0 => "2",
        c if c == 3.0 => "3",
        c if c == 4.0 => "4",
        c if c == 5.0 => "5",
        _ => "6+",
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub struct TrophyAnalyzer {
    max_decks: usize,
}

impl Default for TrophyAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DECKS)
    }
}

impl TrophyAnalyzer {
    pub fn new(max_decks: usize) -> Self {
        Self { max_decks }
    }

    /// Fetch the trophy list and build statistics for the format
    pub fn analyze(
        &self,
        source: &dyn DraftDataSource,
        expansion: &str,
        format: &str,
        ratings: &ArchetypeRatings,
        metadata: &MetadataIndex,
    ) -> DataResult<TrophyStats> {
        let records = source.fetch_trophy_decks(expansion, format)?;
        Ok(self.analyze_decks(expansion, format, &records, ratings, metadata))
    }

    /// Build statistics from already fetched trophy records
    pub fn analyze_decks(
        &self,
        expansion: &str,
        format: &str,
        records: &[TrophyDeckRecord],
        ratings: &ArchetypeRatings,
        metadata: &MetadataIndex,
    ) -> TrophyStats {
        let mut stats = TrophyStats::new(expansion, format);
        stats.total_trophy_decks = records.len() as u64;

        if records.is_empty() {
            warn!("No trophy decks found for {} {}", expansion, format);
            return stats;
        }

        let decks: Vec<TrophyDeck> = records
            .iter()
            .take(self.max_decks)
            .map(TrophyDeck::from)
            .collect();
        stats.analyzed_decks = decks.len() as u64;

        let mut grouped: BTreeMap<&str, Vec<&TrophyDeck>> = BTreeMap::new();
        for deck in &decks {
            grouped.entry(deck.colors.as_str()).or_default().push(deck);
        }

        for (colors, group) in &grouped {
            let mut arch = ArchetypeTrophyStats::new(*colors, group.len() as u64);
            for deck in group {
                arch.total_wins += u64::from(deck.wins);
                arch.total_losses += u64::from(deck.losses);
            }
            arch.splash_rate = splash_rate(colors, &grouped);
            stats.archetype_stats.insert(colors.to_string(), arch);
        }

        if !ratings.is_empty() {
            populate_card_usage(&mut stats, ratings, metadata);
        }

        info!(
            "Trophy analysis complete: {} decks, {} archetypes",
            stats.analyzed_decks,
            stats.archetype_stats.len()
        );
        stats
    }
}

/// Share of trophy decks built on a two-color pair that added a third color
fn splash_rate(colors: &str, grouped: &BTreeMap<&str, Vec<&TrophyDeck>>) -> f64 {
    if colors.chars().count() != 2 {
        return 0.0;
    }
    let base = grouped.get(colors).map(Vec::len).unwrap_or(0);
    let splashed: usize = grouped
        .iter()
        .filter(|(other, _)| other.chars().count() == 3 && colors.chars().all(|c| other.contains(c)))
        .map(|(_, decks)| decks.len())
        .sum();

    let total = base + splashed;
    if total == 0 {
        return 0.0;
    }
    splashed as f64 / total as f64
}

fn populate_card_usage(stats: &mut TrophyStats, ratings: &ArchetypeRatings, metadata: &MetadataIndex) {
    for (colors, arch) in stats.archetype_stats.iter_mut() {
        let Some(records) = ratings.get(colors) else {
            debug!("No archetype ratings for {}", colors);
            continue;
        };

        let mut cmc_weighted = 0.0;
        let mut total_games = 0u64;
        let mut creature_games = 0u64;

        for record in records {
            if record.name.is_empty() || BASIC_LANDS.contains(&record.name.as_str()) {
                continue;
            }
            if record.game_count == 0 {
                continue;
            }
            let games = record.game_count;

            let weight = (games as f64 / USAGE_GAMES_PER_UNIT).min(arch.trophy_count as f64) as u64;
            *arch.card_usage.entry(record.name.clone()).or_default() += weight;
            *stats.overall_card_usage.entry(record.name.clone()).or_default() += weight;
            *arch
                .card_usage_by_rarity
                .entry(Rarity::from_code(&record.rarity))
                .or_default()
                .entry(record.name.clone())
                .or_default() += weight;

            let meta = metadata.get(&record.name);
            let cmc = meta.and_then(|m| m.cmc).filter(|c| *c >= 0.0).unwrap_or(0.0);
            *arch.cmc_distribution.entry(cmc_bucket(cmc).to_string()).or_default() += games;
            cmc_weighted += cmc * games as f64;
            total_games += games;

            let is_creature = if record.types.is_empty() {
                meta.and_then(|m| m.type_line.as_deref())
                    .is_some_and(|t| t.contains("Creature"))
            } else {
                record.types.iter().any(|t| t.contains("Creature"))
            };
            if is_creature {
                creature_games += games;
            }
        }

        if total_games > 0 {
            arch.avg_cmc = cmc_weighted / total_games as f64;
            let creature_ratio = creature_games as f64 / total_games as f64;
            arch.avg_creature_count = round1(creature_ratio * NONLAND_CARDS_PER_DECK);
        }
    }
}

/// Trophy statistics cached as one JSON document per (expansion, format)
pub struct TrophyCacheStore {
    dir: PathBuf,
    max_age_days: u64,
}

impl TrophyCacheStore {
    pub fn new(dir: impl Into<PathBuf>, max_age_days: u64) -> Self {
        Self {
            dir: dir.into(),
            max_age_days,
        }
    }

    pub fn path(&self, expansion: &str, format: &str) -> PathBuf {
        get_trophy_cache_path(&self.dir, expansion, format)
    }

    fn age(path: &Path) -> Option<Duration> {
        std::fs::metadata(path).ok()?.modified().ok()?.elapsed().ok()
    }

    /// Cached statistics if the file exists, parses, and is fresh enough
    pub fn load(&self, expansion: &str, format: &str) -> Option<TrophyStats> {
        let path = self.path(expansion, format);
        if !path.exists() {
            debug!("Trophy cache not found: {}", path.display());
            return None;
        }

        let age_days = Self::age(&path)
            .map(|d| d.as_secs() / 86_400)
            .unwrap_or(u64::MAX);
        if age_days > self.max_age_days {
            info!("Trophy cache expired ({} days old): {}", age_days, path.display());
            return None;
        }

        let raw = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str::<TrophyDocument>(&raw) {
            Ok(doc) => {
                let stats = TrophyStats::from_document(&doc);
                info!(
                    "Loaded trophy cache: {} decks, {} archetypes ({} days old)",
                    stats.analyzed_decks,
                    stats.archetype_stats.len(),
                    age_days
                );
                Some(stats)
            }
            Err(e) => {
                warn!("Failed to load trophy cache {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn save(&self, stats: &TrophyStats) -> anyhow::Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        let path = self.path(&stats.expansion, &stats.format);
        let json = serde_json::to_string_pretty(&stats.to_document())?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write trophy cache {}", path.display()))?;
        info!("Trophy cache saved to {}", path.display());
        Ok(path)
    }

    fn cache_files(&self) -> Vec<PathBuf> {
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with("_trophy_cache.json"))
            })
            .collect()
    }
}

impl CacheLayer for TrophyCacheStore {
    fn name(&self) -> &str {
        "trophy"
    }

    fn is_populated(&self) -> bool {
        !self.cache_files().is_empty()
    }

    fn invalidate_all(&mut self) -> usize {
        self.cache_files()
            .into_iter()
            .filter(|p| std::fs::remove_file(p).is_ok())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CardRecord;

    fn deck(colors: &str, wins: u32, losses: u32) -> TrophyDeckRecord {
        TrophyDeckRecord {
            colors: colors.into(),
            wins,
            losses,
            ..Default::default()
        }
    }

    fn rating(name: &str, rarity: &str, games: u64, types: &[&str]) -> CardRecord {
        CardRecord {
            name: name.into(),
            rarity: rarity.into(),
            game_count: games,
            types: types.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn meta(cmc: f64, type_line: &str) -> CardMetadata {
        CardMetadata {
            cmc: Some(cmc),
            type_line: Some(type_line.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_groups_by_colors_and_caps() {
        let records = vec![
            deck("WU", 7, 1),
            deck("UW", 7, 2),
            deck("BR", 7, 0),
            deck("WUB", 7, 2),
            deck("RG", 7, 0),
        ];
        let stats = TrophyAnalyzer::new(4).analyze_decks(
            "FDN",
            "PremierDraft",
            &records,
            &ArchetypeRatings::new(),
            &MetadataIndex::new(),
        );

        assert_eq!(stats.total_trophy_decks, 5);
        assert_eq!(stats.analyzed_decks, 4);
        let wu = stats.archetype("WU").unwrap();
        assert_eq!(wu.trophy_count, 2);
        assert_eq!(wu.total_wins, 14);
        assert_eq!(wu.total_losses, 3);
        assert_eq!(wu.guild_name, "Azorius");
        assert!((wu.splash_rate - 1.0 / 3.0).abs() < 1e-12);
        assert!(stats.archetype("RG").is_none());
    }

    #[test]
    fn test_card_usage_curve_and_creatures() {
        let records = vec![deck("WU", 7, 1), deck("WU", 7, 0), deck("WU", 7, 2)];
        let mut ratings = ArchetypeRatings::new();
        ratings.insert(
            "WU".into(),
            vec![
                rating("Sky Patrol", "common", 2500, &["Creature"]),
                rating("Big Flyer", "rare", 9000, &[]),
                rating("Counterspell", "uncommon", 1000, &["Instant"]),
                rating("Island", "common", 50000, &["Land"]),
                rating("Unplayed", "common", 0, &[]),
            ],
        );
        let mut metadata = MetadataIndex::new();
        metadata.insert("Sky Patrol".into(), meta(2.0, "Creature — Bird"));
        metadata.insert("Big Flyer".into(), meta(6.0, "Creature — Dragon"));

        let stats = TrophyAnalyzer::default().analyze_decks(
            "FDN",
            "PremierDraft",
            &records,
            &ratings,
            &metadata,
        );
        let wu = stats.archetype("WU").unwrap();

        assert_eq!(wu.card_usage["Sky Patrol"], 2);
        assert_eq!(wu.card_usage["Big Flyer"], 3);
        assert_eq!(wu.card_usage["Counterspell"], 1);
        assert!(!wu.card_usage.contains_key("Island"));
        assert!(!wu.card_usage.contains_key("Unplayed"));
        assert_eq!(wu.card_usage_by_rarity[&Rarity::Rare]["Big Flyer"], 3);
        assert_eq!(stats.overall_card_usage["Sky Patrol"], 2);

        assert_eq!(wu.cmc_distribution["2"], 2500);
        assert_eq!(wu.cmc_distribution["6+"], 9000);
        assert_eq!(wu.cmc_distribution["1"], 1000);
        let expected_cmc = (2.0 * 2500.0 + 6.0 * 9000.0) / 12500.0;
        assert!((wu.avg_cmc - expected_cmc).abs() < 1e-9);
        assert_eq!(wu.avg_creature_count, round1(11500.0 / 12500.0 * 23.0));
    }

    #[test]
    fn test_empty_trophy_list() {
        let stats = TrophyAnalyzer::default().analyze_decks(
            "FDN",
            "PremierDraft",
            &[],
            &ArchetypeRatings::new(),
            &MetadataIndex::new(),
        );
        assert_eq!(stats.analyzed_decks, 0);
        assert!(stats.archetype_stats.is_empty());
    }

    #[test]
    fn test_cmc_buckets() {
        assert_eq!(cmc_bucket(0.0), "1");
        assert_eq!(cmc_bucket(1.0), "1");
        assert_eq!(cmc_bucket(3.0), "3");
        assert_eq!(cmc_bucket(5.0), "5");
        assert_eq!(cmc_bucket(2.5), "6+");
        assert_eq!(cmc_bucket(8.0), "6+");
    }

    #[test]
    fn test_cache_store_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = TrophyCacheStore::new(tmp.path(), 7);
        assert!(store.load("FDN", "PremierDraft").is_none());

        let records = vec![deck("WU", 7, 1), deck("BR", 7, 2)];
        let stats = TrophyAnalyzer::default().analyze_decks(
            "FDN",
            "PremierDraft",
            &records,
            &ArchetypeRatings::new(),
            &MetadataIndex::new(),
        );
        let path = store.save(&stats).unwrap();
        assert!(path.ends_with("FDN_PremierDraft_trophy_cache.json"));

        let loaded = store.load("FDN", "PremierDraft").unwrap();
        assert_eq!(loaded, stats);
        assert!(store.is_populated());
        assert_eq!(store.invalidate_all(), 1);
        assert!(store.load("FDN", "PremierDraft").is_none());
    }

    #[test]
    fn test_cache_store_rejects_garbage() {
        let tmp = tempfile::tempdir().unwrap();
        let store = TrophyCacheStore::new(tmp.path(), 7);
        std::fs::write(store.path("FDN", "PremierDraft"), "not json").unwrap();
        assert!(store.load("FDN", "PremierDraft").is_none());
    }
}
