//! Trophy deck (7-win) statistics

use super::card::Rarity;
use super::color::{guild_name, BASIC_LANDS};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One trophy deck, metadata only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrophyDeck {
    pub aggregate_id: String,
    pub deck_index: u32,
    /// Normalized WUBRG colors
    pub colors: String,
    pub wins: u32,
    pub losses: u32,
    pub timestamp: String,
}

/// Name and weighted usage count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageEntry {
    pub name: String,
    pub count: u64,
}

/// Trophy results of one color combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ArchetypeTrophyStats {
    pub colors: String,
    pub guild_name: String,
    pub trophy_count: u64,
    pub total_wins: u64,
    pub total_losses: u64,
    /// Card name -> weighted inclusion count
    pub card_usage: BTreeMap<String, u64>,
    pub card_usage_by_rarity: BTreeMap<Rarity, BTreeMap<String, u64>>,
    /// CMC bucket ("1".."5", "6+") -> games
    pub cmc_distribution: BTreeMap<String, u64>,
    pub avg_cmc: f64,
    /// Estimated creatures per 23 nonland cards
    pub avg_creature_count: f64,
    pub splash_rate: f64,
}

impl ArchetypeTrophyStats {
    pub fn new(colors: impl Into<String>, trophy_count: u64) -> Self {
        let colors = colors.into();
        Self {
            guild_name: guild_name(&colors).unwrap_or(&colors).to_string(),
            colors,
            trophy_count,
            ..Default::default()
        }
    }

    pub fn win_rate(&self) -> f64 {
        let total = self.total_wins + self.total_losses;
        if total == 0 {
            return 0.0;
        }
        self.total_wins as f64 / total as f64
    }

    /// Most used cards, basic lands excluded
    pub fn top_cards(&self, n: usize) -> Vec<UsageEntry> {
        most_common(&self.card_usage, n)
    }

    /// Most used cards across the given rarities, basic lands excluded
    pub fn top_cards_by_rarity(&self, rarities: &[Rarity], n: usize) -> Vec<UsageEntry> {
        let mut combined: BTreeMap<String, u64> = BTreeMap::new();
        for rarity in rarities {
            if let Some(usage) = self.card_usage_by_rarity.get(rarity) {
                for (name, count) in usage {
                    *combined.entry(name.clone()).or_default() += count;
                }
            }
        }
        most_common(&combined, n)
    }
}

/// Trophy statistics for a format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TrophyStats {
    pub expansion: String,
    pub format: String,
    pub total_trophy_decks: u64,
    pub analyzed_decks: u64,
    pub archetype_stats: BTreeMap<String, ArchetypeTrophyStats>,
    pub overall_card_usage: BTreeMap<String, u64>,
}

impl TrophyStats {
    pub fn new(expansion: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            expansion: expansion.into(),
            format: format.into(),
            ..Default::default()
        }
    }

    /// Archetypes by trophy count, most first
    pub fn archetype_ranking(&self) -> Vec<&ArchetypeTrophyStats> {
        let mut ranking: Vec<&ArchetypeTrophyStats> = self.archetype_stats.values().collect();
        ranking.sort_by(|a, b| {
            b.trophy_count
                .cmp(&a.trophy_count)
                .then_with(|| a.colors.cmp(&b.colors))
        });
        ranking
    }

    pub fn top_cards_overall(&self, n: usize) -> Vec<UsageEntry> {
        most_common(&self.overall_card_usage, n)
    }

    pub fn archetype_share(&self, colors: &str) -> f64 {
        if self.analyzed_decks == 0 {
            return 0.0;
        }
        self.archetype_stats
            .get(colors)
            .map(|a| a.trophy_count as f64 / self.analyzed_decks as f64)
            .unwrap_or(0.0)
    }

    pub fn archetype(&self, colors: &str) -> Option<&ArchetypeTrophyStats> {
        self.archetype_stats.get(colors)
    }

    /// Export document used for caching and JSON output
    pub fn to_document(&self) -> TrophyDocument {
        TrophyDocument {
            meta: TrophyDocumentMeta {
                expansion: self.expansion.clone(),
                format: self.format.clone(),
                analyzed_at: Utc::now(),
                total_trophy_decks: self.total_trophy_decks,
                analyzed_decks: self.analyzed_decks,
            },
            overall_card_usage: self.overall_card_usage.clone(),
            archetype_ranking: self.archetype_ranking().into_iter().cloned().collect(),
            overall_top_cards: self.top_cards_overall(50),
        }
    }

    /// Rebuild from an exported document
    pub fn from_document(doc: &TrophyDocument) -> Self {
        Self {
            expansion: doc.meta.expansion.clone(),
            format: doc.meta.format.clone(),
            total_trophy_decks: doc.meta.total_trophy_decks,
            analyzed_decks: doc.meta.analyzed_decks,
            archetype_stats: doc
                .archetype_ranking
                .iter()
                .map(|a| (a.colors.clone(), a.clone()))
                .collect(),
            overall_card_usage: doc.overall_card_usage.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrophyDocumentMeta {
    pub expansion: String,
    pub format: String,
    pub analyzed_at: DateTime<Utc>,
    pub total_trophy_decks: u64,
    pub analyzed_decks: u64,
}

/// Serialized form of [`TrophyStats`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrophyDocument {
    pub meta: TrophyDocumentMeta,
    #[serde(default)]
    pub overall_card_usage: BTreeMap<String, u64>,
    #[serde(default)]
    pub archetype_ranking: Vec<ArchetypeTrophyStats>,
    #[serde(default)]
    pub overall_top_cards: Vec<UsageEntry>,
}

fn most_common(usage: &BTreeMap<String, u64>, n: usize) -> Vec<UsageEntry> {
    let mut entries: Vec<(&String, &u64)> = usage
        .iter()
        .filter(|(name, _)| !BASIC_LANDS.contains(&name.as_str()))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    entries
        .into_iter()
        .take(n)
        .map(|(name, count)| UsageEntry {
            name: name.clone(),
            count: *count,
        })
        .collect()
}
