//! Raw upstream records as served by the 17lands endpoints
//!
//! Counts may come back as `null`; they deserialize to zero. Win rates stay
//! `Option` all the way into [`CardStats`].

use crate::models::{
    canonical_colors, normalize_color_pair, CardStats, ColorPair, Rarity, TrophyDeck,
};
use serde::{Deserialize, Deserializer, Serialize};

fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One card row from `card_ratings/data`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CardRecord {
    #[serde(deserialize_with = "null_default")]
    pub name: String,
    #[serde(deserialize_with = "null_default")]
    pub color: String,
    #[serde(deserialize_with = "null_default")]
    pub rarity: String,

    #[serde(deserialize_with = "null_default")]
    pub seen_count: u64,
    pub avg_seen: Option<f64>,
    #[serde(deserialize_with = "null_default")]
    pub pick_count: u64,
    pub avg_pick: Option<f64>,

    /// Games with the card in the main deck
    #[serde(deserialize_with = "null_default")]
    pub game_count: u64,
    /// Deck win rate
    pub win_rate: Option<f64>,

    #[serde(deserialize_with = "null_default")]
    pub opening_hand_game_count: u64,
    pub opening_hand_win_rate: Option<f64>,
    #[serde(deserialize_with = "null_default")]
    pub drawn_game_count: u64,
    pub drawn_win_rate: Option<f64>,
    /// Games in hand
    #[serde(deserialize_with = "null_default")]
    pub ever_drawn_game_count: u64,
    pub ever_drawn_win_rate: Option<f64>,
    #[serde(deserialize_with = "null_default")]
    pub never_drawn_game_count: u64,
    pub never_drawn_win_rate: Option<f64>,

    #[serde(deserialize_with = "null_default")]
    pub types: Vec<String>,
}

impl From<&CardRecord> for CardStats {
    fn from(record: &CardRecord) -> Self {
        let gih_games = record.ever_drawn_game_count;
        let gih_wins = record
            .ever_drawn_win_rate
            .map(|wr| (gih_games as f64 * wr).floor() as u64)
            .unwrap_or(0);

        CardStats {
            name: record.name.clone(),
            colors: canonical_colors(&record.color),
            rarity: Rarity::from_code(&record.rarity),
            seen_count: record.seen_count,
            pick_count: record.pick_count,
            game_count: record.game_count,
            gih_games,
            gih_wins,
            alsa: record.avg_seen.unwrap_or(7.0),
            ata: record.avg_pick.unwrap_or(7.0),
            gih_wr: record.ever_drawn_win_rate,
            gns_wr: record.never_drawn_win_rate,
            oh_wr: record.opening_hand_win_rate,
            oh_games: record.opening_hand_game_count,
            gd_wr: record.drawn_win_rate,
            gd_games: record.drawn_game_count,
            deck_wr: record.win_rate,
            archetype_wrs: Default::default(),
            archetype_games: Default::default(),
        }
    }
}

/// One row from `color_ratings/data`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ColorRecord {
    #[serde(deserialize_with = "null_default")]
    pub color_name: String,
    #[serde(deserialize_with = "null_default")]
    pub wins: u64,
    #[serde(deserialize_with = "null_default")]
    pub games: u64,
    #[serde(deserialize_with = "null_default")]
    pub is_summary: bool,
}

impl ColorRecord {
    /// Convert to a [`ColorPair`]; summary rows and unreadable labels yield `None`
    pub fn to_color_pair(&self) -> Option<ColorPair> {
        if self.is_summary {
            return None;
        }
        let colors = normalize_color_pair(&self.color_name);
        if colors.is_empty() {
            return None;
        }
        Some(ColorPair::new(colors, self.wins, self.games))
    }
}

/// One row from the trophy deck list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TrophyDeckRecord {
    #[serde(deserialize_with = "null_default")]
    pub aggregate_id: String,
    #[serde(deserialize_with = "null_default")]
    pub deck_index: u32,
    #[serde(deserialize_with = "null_default")]
    pub colors: String,
    #[serde(deserialize_with = "null_default")]
    pub wins: u32,
    #[serde(deserialize_with = "null_default")]
    pub losses: u32,
    #[serde(deserialize_with = "null_default")]
    pub time: String,
}

impl From<&TrophyDeckRecord> for TrophyDeck {
    fn from(record: &TrophyDeckRecord) -> Self {
        TrophyDeck {
            aggregate_id: record.aggregate_id.clone(),
            deck_index: record.deck_index,
            colors: normalize_color_pair(&record.colors),
            wins: record.wins,
            losses: record.losses,
            timestamp: record.time.clone(),
        }
    }
}
