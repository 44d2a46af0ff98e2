//! Per-card models: raw statistics and the derived, scored card

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Card rarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Mythic,
}

impl Rarity {
    /// Parse an upstream rarity code. Unknown values fall back to common.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_lowercase().as_str() {
            "u" | "uncommon" => Rarity::Uncommon,
            "r" | "rare" => Rarity::Rare,
            "m" | "mythic" => Rarity::Mythic,
            _ => Rarity::Common,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Mythic => "mythic",
        }
    }

    pub fn is_rare_or_mythic(&self) -> bool {
        matches!(self, Rarity::Rare | Rarity::Mythic)
    }
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw per-card statistics for one (expansion, format)
///
/// Win rates are `Option`: a missing value means "no data" and must never be
/// read as 0.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CardStats {
    pub name: String,
    /// Color identity in WUBRG order, empty for colorless
    pub colors: String,
    pub rarity: Rarity,

    pub seen_count: u64,
    pub pick_count: u64,
    /// Games played with the card in the deck
    pub game_count: u64,
    /// Games-in-hand sample
    pub gih_games: u64,
    pub gih_wins: u64,

    /// Average last seen at
    pub alsa: f64,
    /// Average taken at
    pub ata: f64,

    pub gih_wr: Option<f64>,
    /// Games-not-seen win rate
    pub gns_wr: Option<f64>,
    pub oh_wr: Option<f64>,
    pub oh_games: u64,
    pub gd_wr: Option<f64>,
    pub gd_games: u64,
    pub deck_wr: Option<f64>,

    /// Two-letter archetype code -> GIH WR inside that archetype
    #[serde(default)]
    pub archetype_wrs: BTreeMap<String, f64>,
    /// Two-letter archetype code -> GIH games inside that archetype
    #[serde(default)]
    pub archetype_games: BTreeMap<String, u64>,
}

impl CardStats {
    pub fn new(name: impl Into<String>, colors: impl Into<String>, rarity: Rarity) -> Self {
        Self {
            name: name.into(),
            colors: colors.into(),
            rarity,
            alsa: 7.0,
            ata: 7.0,
            ..Default::default()
        }
    }

    /// Set the games-in-hand sample, deriving wins from the rate
    pub fn with_gih(mut self, win_rate: f64, games: u64) -> Self {
        self.gih_wr = Some(win_rate);
        self.gih_games = games;
        self.gih_wins = (games as f64 * win_rate).floor() as u64;
        self
    }

    pub fn has_valid_wr(&self) -> bool {
        self.gih_wr.is_some()
    }

    /// `pick_count / seen_count`, 0 when the card was never seen
    pub fn pick_rate(&self) -> f64 {
        if self.seen_count == 0 {
            return 0.0;
        }
        self.pick_count as f64 / self.seen_count as f64
    }

    /// Improvement when drawn, only defined when both rates exist
    pub fn iwd(&self) -> Option<f64> {
        match (self.gih_wr, self.gns_wr) {
            (Some(gih), Some(gns)) => Some(gih - gns),
            _ => None,
        }
    }

    pub fn is_mono(&self) -> bool {
        self.colors.chars().count() == 1
    }

    pub fn has_color(&self, color: char) -> bool {
        self.colors.contains(color)
    }
}

/// Letter grade from the composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "F")]
    F,
    #[default]
    #[serde(rename = "N/A")]
    NotAvailable,
}

impl Grade {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 90.0 => Grade::APlus,
            s if s >= 80.0 => Grade::A,
            s if s >= 70.0 => Grade::BPlus,
            s if s >= 60.0 => Grade::B,
            s if s >= 50.0 => Grade::CPlus,
            s if s >= 40.0 => Grade::C,
            s if s >= 30.0 => Grade::D,
            _ => Grade::F,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
            Grade::NotAvailable => "N/A",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outlier classification of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Irregularity {
    #[default]
    Normal,
    /// Wins more than its draft position predicts
    Sleeper,
    /// Wins less than its draft position predicts
    Trap,
    /// No games-in-hand win rate available
    NoData,
}

impl std::fmt::Display for Irregularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Irregularity::Normal => write!(f, "normal"),
            Irregularity::Sleeper => write!(f, "sleeper"),
            Irregularity::Trap => write!(f, "trap"),
            Irregularity::NoData => write!(f, "no_data"),
        }
    }
}

/// How well a card travels between archetypes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Viability {
    /// Archetypes within 5pp of the card's best archetype
    pub viable_archetypes: usize,
    pub best_archetype: Option<String>,
    /// Best WR minus mean WR of the non-viable archetypes
    pub off_archetype_penalty: f64,
    /// Mean WR in color-sharing archetypes minus the rest
    pub natural_premium: Option<f64>,
}

/// Colors a mana cost demands, with hybrid symbols kept apart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ManaRequirements {
    pub is_hybrid: bool,
    /// Colors from plain colored symbols, WUBRG order
    pub required_colors: String,
    /// One entry per hybrid symbol, listing the colors that can pay it
    pub hybrid_options: Vec<String>,
    /// Smallest color set that can cast the card
    pub min_colors: String,
}

/// Text metadata from the card database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CardMetadata {
    pub oracle_text: Option<String>,
    pub mana_cost: Option<String>,
    pub type_line: Option<String>,
    pub power: Option<String>,
    pub toughness: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub cmc: Option<f64>,
    pub image_uri: Option<String>,
    pub scryfall_uri: Option<String>,
    #[serde(default)]
    pub mana: ManaRequirements,
}

/// A scored card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub stats: CardStats,
    /// 0-100, with 0 reserved for cards without data
    pub composite_score: f64,
    pub grade: Grade,
    /// Wilson lower bound of the GIH WR
    pub adjusted_gih_wr: f64,
    #[serde(default)]
    pub viability: Viability,
    pub irregularity: Irregularity,
    pub irregularity_z: f64,
    #[serde(default)]
    pub metadata: Option<CardMetadata>,
}

impl Card {
    pub fn new(stats: CardStats) -> Self {
        Self {
            stats,
            composite_score: 0.0,
            grade: Grade::NotAvailable,
            adjusted_gih_wr: 0.0,
            viability: Viability::default(),
            irregularity: Irregularity::Normal,
            irregularity_z: 0.0,
            metadata: None,
        }
    }

    /// Card without a GIH win rate: score 0, grade N/A, classified no-data
    pub fn no_data(stats: CardStats) -> Self {
        Self {
            irregularity: Irregularity::NoData,
            ..Self::new(stats)
        }
    }

    pub fn name(&self) -> &str {
        &self.stats.name
    }

    pub fn colors(&self) -> &str {
        &self.stats.colors
    }

    pub fn rarity(&self) -> Rarity {
        self.stats.rarity
    }

    pub fn cmc(&self) -> Option<f64> {
        self.metadata.as_ref().and_then(|m| m.cmc)
    }

    pub fn type_line(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.type_line.as_deref())
    }

    pub fn oracle_text(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.oracle_text.as_deref())
    }

    pub fn keywords(&self) -> &[String] {
        self.metadata
            .as_ref()
            .map(|m| m.keywords.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_hybrid(&self) -> bool {
        self.metadata.as_ref().is_some_and(|m| m.mana.is_hybrid)
    }

    pub fn is_land(&self) -> bool {
        self.type_line()
            .is_some_and(|t| t.to_lowercase().contains("land"))
    }

    pub fn is_creature(&self) -> bool {
        self.type_line().is_some_and(|t| t.contains("Creature"))
    }

    /// Stability on a 0-100 scale, derived from archetype viability.
    ///
    /// Cards without archetype data count as fully stable. Otherwise the
    /// share of measured archetypes in which the card stays viable.
    pub fn stability_score(&self) -> f64 {
        let measured = self.stats.archetype_wrs.len();
        if measured == 0 {
            return 100.0;
        }
        let viable = self.viability.viable_archetypes.min(measured);
        100.0 * viable as f64 / measured as f64
    }

    /// Archetype-specific win rate, if measured
    pub fn archetype_wr(&self, colors: &str) -> Option<f64> {
        self.stats.archetype_wrs.get(colors).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rarity_from_code() {
        assert_eq!(Rarity::from_code("c"), Rarity::Common);
        assert_eq!(Rarity::from_code("common"), Rarity::Common);
        assert_eq!(Rarity::from_code("U"), Rarity::Uncommon);
        assert_eq!(Rarity::from_code("rare"), Rarity::Rare);
        assert_eq!(Rarity::from_code("m"), Rarity::Mythic);
        assert_eq!(Rarity::from_code("special"), Rarity::Common);
    }

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(Grade::from_score(90.0), Grade::APlus);
        assert_eq!(Grade::from_score(89.999), Grade::A);
        assert_eq!(Grade::from_score(80.0), Grade::A);
        assert_eq!(Grade::from_score(70.0), Grade::BPlus);
        assert_eq!(Grade::from_score(60.0), Grade::B);
        assert_eq!(Grade::from_score(50.0), Grade::CPlus);
        assert_eq!(Grade::from_score(40.0), Grade::C);
        assert_eq!(Grade::from_score(30.0), Grade::D);
        assert_eq!(Grade::from_score(29.999), Grade::F);
        assert_eq!(Grade::from_score(0.0), Grade::F);
    }

    #[test]
    fn test_grade_serializes_as_letter() {
        let json = serde_json::to_string(&Grade::BPlus).unwrap();
        assert_eq!(json, "\"B+\"");
        let json = serde_json::to_string(&Grade::NotAvailable).unwrap();
        assert_eq!(json, "\"N/A\"");
    }

    #[test]
    fn test_pick_rate_and_iwd() {
        let mut stats = CardStats::new("Test", "W", Rarity::Common);
        assert_eq!(stats.pick_rate(), 0.0);
        stats.seen_count = 200;
        stats.pick_count = 50;
        assert_eq!(stats.pick_rate(), 0.25);

        assert_eq!(stats.iwd(), None);
        stats.gih_wr = Some(0.58);
        assert_eq!(stats.iwd(), None);
        stats.gns_wr = Some(0.53);
        assert!((stats.iwd().unwrap() - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_no_data_card() {
        let card = Card::no_data(CardStats::new("Blank", "U", Rarity::Rare));
        assert_eq!(card.composite_score, 0.0);
        assert_eq!(card.grade, Grade::NotAvailable);
        assert_eq!(card.irregularity, Irregularity::NoData);
        assert_eq!(card.irregularity.to_string(), "no_data");
    }

    #[test]
    fn test_stability_score_from_viability() {
        let mut card = Card::new(CardStats::new("Flex", "W", Rarity::Common));
        assert_eq!(card.stability_score(), 100.0);

        card.stats.archetype_wrs.insert("WU".into(), 0.58);
        card.stats.archetype_wrs.insert("WB".into(), 0.57);
        card.stats.archetype_wrs.insert("WR".into(), 0.49);
        card.stats.archetype_wrs.insert("WG".into(), 0.48);
        card.viability.viable_archetypes = 2;
        assert_eq!(card.stability_score(), 50.0);
    }
}
