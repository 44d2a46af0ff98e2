//! Color and archetype aggregates

use super::color::guild_name;
use serde::{Deserialize, Serialize};

/// Aggregate record for one color combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ColorPair {
    /// Color letters in WUBRG order
    pub colors: String,
    pub wins: u64,
    pub games: u64,
    pub win_rate: f64,
    /// True when the win rate was estimated from card data instead of
    /// coming from the color-ratings endpoint
    #[serde(default)]
    pub is_computed: bool,
}

impl ColorPair {
    pub fn new(colors: impl Into<String>, wins: u64, games: u64) -> Self {
        let win_rate = if games > 0 {
            wins as f64 / games as f64
        } else {
            0.0
        };
        Self {
            colors: colors.into(),
            wins,
            games,
            win_rate,
            is_computed: false,
        }
    }

    /// Estimated pair; wins are reconstructed from the rate
    pub fn computed(colors: impl Into<String>, win_rate: f64, games: u64) -> Self {
        Self {
            colors: colors.into(),
            wins: (win_rate * games as f64).round() as u64,
            games,
            win_rate,
            is_computed: true,
        }
    }

    pub fn color_count(&self) -> usize {
        self.colors.chars().count()
    }

    pub fn is_two_color(&self) -> bool {
        self.color_count() == 2
    }

    pub fn guild_name(&self) -> Option<&'static str> {
        guild_name(&self.colors)
    }

    /// Display label such as `Azorius (WU)`
    pub fn label(&self) -> String {
        match self.guild_name() {
            Some(name) => format!("{} ({})", name, self.colors),
            None => self.colors.clone(),
        }
    }
}

/// Strength breakdown of a single color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ColorStrength {
    pub color: String,
    pub strength_score: f64,
    /// 1 = strongest
    pub rank: usize,

    pub deck_wr_strength: f64,
    pub archetype_success: f64,
    pub top_common_avg: f64,
    pub top_uncommon_avg: f64,
    pub bomb_factor: f64,
    pub depth_factor: f64,

    pub playable_count: usize,
    pub total_count: usize,
    pub top_commons: Vec<String>,
    pub top_uncommons: Vec<String>,
    pub top_rares: Vec<String>,
}

impl ColorStrength {
    pub fn empty(color: char) -> Self {
        Self {
            color: color.to_string(),
            ..Default::default()
        }
    }
}

/// A superset color combination (parent plus one color) seen in the data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplashVariant {
    pub colors: String,
    pub added_color: String,
    pub win_rate: f64,
    pub games: u64,
    pub meta_share: f64,
    /// Variant WR minus parent WR
    pub win_rate_delta: f64,
}

/// A two-color archetype with its derived strength
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Archetype {
    pub color_pair: ColorPair,
    pub strength_score: f64,
    pub rank: usize,

    pub key_commons: Vec<String>,
    pub key_uncommons: Vec<String>,
    pub signpost_uncommon: Option<String>,
    pub bombs: Vec<String>,
    pub synergy_cards: Vec<String>,
    pub trap_cards: Vec<String>,

    /// Share of all two-color games
    pub meta_share: f64,
    /// Mean synergy lift over cards with archetype data
    pub synergy_lift: f64,
    pub synergy_std: f64,

    #[serde(default)]
    pub variants: Vec<SplashVariant>,
}

impl Archetype {
    pub fn colors(&self) -> &str {
        &self.color_pair.colors
    }

    pub fn win_rate(&self) -> f64 {
        self.color_pair.win_rate
    }

    pub fn guild_name(&self) -> &str {
        match self.color_pair.guild_name() {
            Some(name) => name,
            None => &self.color_pair.colors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_pair_win_rate() {
        let pair = ColorPair::new("WU", 550, 1000);
        assert!((pair.win_rate - 0.55).abs() < 1e-12);
        assert!(!pair.is_computed);
        assert_eq!(ColorPair::new("WU", 0, 0).win_rate, 0.0);
    }

    #[test]
    fn test_computed_pair() {
        let pair = ColorPair::computed("BR", 0.5234, 1000);
        assert_eq!(pair.wins, 523);
        assert!(pair.is_computed);
    }

    #[test]
    fn test_label() {
        assert_eq!(ColorPair::new("UG", 1, 2).label(), "Simic (UG)");
        assert_eq!(ColorPair::new("WUB", 1, 2).label(), "WUB");
    }
}
