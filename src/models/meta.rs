//! Run-level models: thresholds, format characteristics and the snapshot

use super::archetype::{Archetype, ColorStrength};
use super::card::{Card, Rarity};
use super::trophy::TrophyStats;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Percentiles the calibrator reads off each distribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationPercentiles {
    pub synergy: f64,
    pub sleeper: f64,
    pub trap: f64,
    pub bomb: f64,
    pub playable: f64,
}

impl Default for CalibrationPercentiles {
    fn default() -> Self {
        Self {
            synergy: 75.0,
            sleeper: 90.0,
            trap: 10.0,
            bomb: 95.0,
            playable: 35.0,
        }
    }
}

/// Calibrated cutoffs for one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub synergy_variance: f64,
    pub stable_variance: f64,
    /// Deviation z-score at or above which a card is a sleeper
    pub sleeper_z: f64,
    /// Deviation z-score at or below which a card is a trap
    pub trap_z: f64,
    pub bomb_wr: f64,
    pub playable_wr: f64,
    pub min_games: u64,
    pub calibration_percentiles: CalibrationPercentiles,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            synergy_variance: 0.002,
            stable_variance: 0.001,
            sleeper_z: 1.0,
            trap_z: -1.0,
            bomb_wr: 0.60,
            playable_wr: 0.50,
            min_games: 200,
            calibration_percentiles: CalibrationPercentiles::default(),
        }
    }
}

/// Format speed tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpeedLabel {
    #[serde(rename = "초고속")]
    VeryFast,
    #[serde(rename = "빠름")]
    Fast,
    #[default]
    #[serde(rename = "보통")]
    Normal,
    #[serde(rename = "약간 느림")]
    SlightlySlow,
    #[serde(rename = "느림")]
    Slow,
    #[serde(rename = "매우 느림")]
    VerySlow,
}

impl SpeedLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeedLabel::VeryFast => "초고속",
            SpeedLabel::Fast => "빠름",
            SpeedLabel::Normal => "보통",
            SpeedLabel::SlightlySlow => "약간 느림",
            SpeedLabel::Slow => "느림",
            SpeedLabel::VerySlow => "매우 느림",
        }
    }

    /// Strategy recommendation attached to each tier
    pub fn recommendation(&self) -> &'static str {
        match self {
            SpeedLabel::VeryFast | SpeedLabel::Fast => "템포/어그로 덱 유리, 2드롭 및 커브 중요",
            SpeedLabel::SlightlySlow => "약간 느린 포맷, 밸류 중시하되 템포 무시 금지",
            SpeedLabel::Slow | SpeedLabel::VerySlow => {
                "밸류/컨트롤 덱 유리, 후반 카드와 제거기 중요"
            }
            SpeedLabel::Normal => "균형 잡힌 포맷, 다양한 전략 가능",
        }
    }
}

impl std::fmt::Display for SpeedLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direct play/draw metrics from the upstream API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PlayDrawStats {
    /// Mean game length in turns
    pub average_game_length: Option<f64>,
    pub win_rate_on_play: Option<f64>,
    pub sample_size: Option<u64>,
    /// Games ending on each turn
    pub turns: Vec<u64>,
}

/// How fast the format plays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatSpeed {
    pub speed_label: SpeedLabel,

    pub average_game_length: Option<f64>,
    pub win_rate_on_play: Option<f64>,
    pub play_draw_sample_size: Option<u64>,
    pub turns_distribution: Vec<u64>,
    pub speed_interpretation: String,

    /// Mean OH WR / mean GD WR
    pub tempo_ratio: f64,
    /// Mean GIH WR of cmc<=2 minus cmc>=5
    pub aggro_advantage: f64,
    pub avg_oh_wr: f64,
    pub avg_gd_wr: f64,
    pub low_cmc_wr: f64,
    pub high_cmc_wr: f64,

    /// Disagreements between speed signals
    pub conflicts: Vec<String>,
    pub recommendation: String,
}

impl Default for FormatSpeed {
    fn default() -> Self {
        Self {
            speed_label: SpeedLabel::Normal,
            average_game_length: None,
            win_rate_on_play: None,
            play_draw_sample_size: None,
            turns_distribution: Vec::new(),
            speed_interpretation: String::new(),
            tempo_ratio: 1.0,
            aggro_advantage: 0.0,
            avg_oh_wr: 0.0,
            avg_gd_wr: 0.0,
            low_cmc_wr: 0.0,
            high_cmc_wr: 0.0,
            conflicts: Vec::new(),
            recommendation: String::new(),
        }
    }
}

/// Splash viability tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SplashLabel {
    #[serde(rename = "높음")]
    High,
    #[default]
    #[serde(rename = "보통")]
    Moderate,
    #[serde(rename = "낮음")]
    Low,
}

impl std::fmt::Display for SplashLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SplashLabel::High => "높음",
            SplashLabel::Moderate => "보통",
            SplashLabel::Low => "낮음",
        })
    }
}

/// Verdict from measured three-color performance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SplashValidation {
    #[serde(rename = "양호")]
    Good,
    #[serde(rename = "저조")]
    Poor,
    #[serde(rename = "보통")]
    Neutral,
    #[default]
    #[serde(rename = "데이터 부족")]
    InsufficientData,
}

impl std::fmt::Display for SplashValidation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SplashValidation::Good => "양호",
            SplashValidation::Poor => "저조",
            SplashValidation::Neutral => "보통",
            SplashValidation::InsufficientData => "데이터 부족",
        })
    }
}

/// Mana fixing quality of the format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplashIndicator {
    pub splash_label: SplashLabel,
    /// Lower means dual lands are taken earlier
    pub dual_land_alsa: f64,
    pub dual_land_pick_rate: f64,
    /// Fixer GIH WR minus format average
    pub fixer_wr_premium: f64,
    pub dual_land_count: usize,
    pub mana_fixer_count: usize,
    pub performance_validation: SplashValidation,
    pub positive_splash_count: usize,
    pub negative_splash_count: usize,
    pub recommendation: String,
}

impl Default for SplashIndicator {
    fn default() -> Self {
        Self {
            splash_label: SplashLabel::Moderate,
            dual_land_alsa: 7.0,
            dual_land_pick_rate: 0.0,
            fixer_wr_premium: 0.0,
            dual_land_count: 0,
            mana_fixer_count: 0,
            performance_validation: SplashValidation::InsufficientData,
            positive_splash_count: 0,
            negative_splash_count: 0,
            recommendation: String::new(),
        }
    }
}

/// LLM-written report sections, one generation call each
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LlmSections {
    pub format_overview: Option<String>,
    pub format_characteristics: Option<String>,
    pub color_strategy: Option<String>,
    pub strategy_tips: Option<String>,
    pub archetype_deep_dive: Option<String>,
}

impl LlmSections {
    pub fn is_empty(&self) -> bool {
        self.format_overview.is_none()
            && self.format_characteristics.is_none()
            && self.color_strategy.is_none()
            && self.strategy_tips.is_none()
            && self.archetype_deep_dive.is_none()
    }
}

/// Complete analysis result for one (expansion, format)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaSnapshot {
    pub expansion: String,
    pub format: String,
    pub timestamp: DateTime<Utc>,

    pub thresholds: ThresholdConfig,

    pub all_cards: Vec<Card>,
    pub sleeper_cards: Vec<Card>,
    pub trap_cards: Vec<Card>,
    pub no_data_cards: Vec<Card>,

    pub color_strengths: Vec<ColorStrength>,
    pub archetypes: Vec<Archetype>,

    pub total_cards: usize,
    pub total_games_analyzed: u64,

    pub format_speed: Option<FormatSpeed>,
    pub splash_indicator: Option<SplashIndicator>,
    pub trophy_stats: Option<TrophyStats>,

    #[serde(default)]
    pub llm: LlmSections,
}

impl MetaSnapshot {
    /// Attach LLM sections, consuming the snapshot
    pub fn with_llm(mut self, sections: LlmSections) -> Self {
        self.llm = sections;
        self
    }

    /// Colors by strength, best first
    pub fn top_colors(&self) -> Vec<&ColorStrength> {
        let mut colors: Vec<&ColorStrength> = self.color_strengths.iter().collect();
        colors.sort_by(|a, b| b.strength_score.total_cmp(&a.strength_score));
        colors
    }

    /// Archetypes by win rate, best first
    pub fn top_archetypes(&self) -> Vec<&Archetype> {
        let mut archetypes: Vec<&Archetype> = self.archetypes.iter().collect();
        archetypes.sort_by(|a, b| b.win_rate().total_cmp(&a.win_rate()));
        archetypes
    }

    /// Cards by composite score, best first
    pub fn top_cards(&self, n: usize) -> Vec<&Card> {
        let mut cards: Vec<&Card> = self.all_cards.iter().collect();
        cards.sort_by(|a, b| b.composite_score.total_cmp(&a.composite_score));
        cards.truncate(n);
        cards
    }

    pub fn cards_by_color(&self, color: char) -> Vec<&Card> {
        self.all_cards
            .iter()
            .filter(|c| c.stats.has_color(color))
            .collect()
    }

    pub fn cards_by_rarity(&self, rarity: Rarity) -> Vec<&Card> {
        self.all_cards
            .iter()
            .filter(|c| c.rarity() == rarity)
            .collect()
    }

    /// Short plain-text summary
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("=== {} {} Meta Snapshot ===", self.expansion, self.format),
            format!("Analyzed: {}", self.timestamp.format("%Y-%m-%d %H:%M")),
            format!("Total Cards: {}", self.total_cards),
            format!("Total Games: {}", self.total_games_analyzed),
            String::new(),
        ];

        if let Some(color) = self.top_colors().first() {
            lines.push(format!(
                "Best Color: {} (score: {:.1})",
                color.color, color.strength_score
            ));
        }
        if let Some(arch) = self.top_archetypes().first() {
            lines.push(format!(
                "Best Archetype: {} (WR: {:.2}%)",
                arch.guild_name(),
                arch.win_rate() * 100.0
            ));
        }
        if let Some(card) = self.sleeper_cards.first() {
            lines.push(format!("Top Sleeper: {}", card.name()));
        }
        if let Some(card) = self.trap_cards.first() {
            lines.push(format!("Top Trap: {}", card.name()));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_defaults() {
        let t = ThresholdConfig::default();
        assert_eq!(t.sleeper_z, 1.0);
        assert_eq!(t.trap_z, -1.0);
        assert_eq!(t.min_games, 200);
        assert_eq!(t.calibration_percentiles.playable, 35.0);
    }

    #[test]
    fn test_speed_label_serializes_korean() {
        let json = serde_json::to_string(&SpeedLabel::SlightlySlow).unwrap();
        assert_eq!(json, "\"약간 느림\"");
        assert_eq!(SpeedLabel::Fast.to_string(), "빠름");
    }

    #[test]
    fn test_speed_recommendations() {
        assert_eq!(
            SpeedLabel::VeryFast.recommendation(),
            SpeedLabel::Fast.recommendation()
        );
        assert_eq!(
            SpeedLabel::Normal.recommendation(),
            "균형 잡힌 포맷, 다양한 전략 가능"
        );
    }

    #[test]
    fn test_format_speed_default() {
        let speed = FormatSpeed::default();
        assert_eq!(speed.speed_label, SpeedLabel::Normal);
        assert_eq!(speed.tempo_ratio, 1.0);
        assert!(speed.conflicts.is_empty());
    }

    #[test]
    fn test_llm_sections_empty() {
        let mut sections = LlmSections::default();
        assert!(sections.is_empty());
        sections.strategy_tips = Some("Draft removal".into());
        assert!(!sections.is_empty());
    }
}
