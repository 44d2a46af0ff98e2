//! Mana fixing and splash viability

use crate::models::{
    Card, SplashIndicator, SplashLabel, SplashValidation, SplashVariant, BASIC_LANDS,
};
use crate::stats::mean;
use std::collections::BTreeMap;
use tracing::info;

const MANA_SYMBOLS: [&str; 5] = ["{w}", "{u}", "{b}", "{r}", "{g}"];

const ANY_COLOR_PHRASES: [&str; 4] = [
    "mana of any color",
    "mana of any type",
    "one mana of any color",
    "add one mana of any",
];

/// Name fragments of known dual land cycles
const DUAL_LAND_NAMES: [&str; 19] = [
    "temple",
    "pathway",
    "campus",
    "triome",
    "bridge",
    "falls",
    "harbor",
    "grove",
    "clearing",
    "fortress",
    "manor",
    "tunnel",
    "channel",
    "gardens",
    "sanctum",
    "copse",
    "concealed courtyard",
    "inspiring vantage",
    "spire of industry",
];

const DUAL_LAND_TYPES: [&str; 2] = ["gate", "locus"];

const FIXER_PHRASES: [&str; 6] = [
    "add {",
    "add one mana",
    "treasure",
    "any color",
    "mana of any",
    "add mana of any",
];

const FORMAT_AVG_MIN_GAMES: u64 = 200;
const FIXER_MIN_GAMES: u64 = 100;

fn is_basic_land(name: &str) -> bool {
    BASIC_LANDS.iter().any(|b| b.eq_ignore_ascii_case(name.trim()))
}

fn distinct_mana_symbols(oracle: &str) -> usize {
    MANA_SYMBOLS.iter().filter(|s| oracle.contains(*s)).count()
}

/// Land producing two or more colors
pub fn is_dual_land(card: &Card) -> bool {
    let type_line = card.type_line().unwrap_or_default().to_lowercase();
    if !type_line.contains("land") || is_basic_land(card.name()) {
        return false;
    }
    let oracle = card.oracle_text().unwrap_or_default().to_lowercase();
    let name = card.name().to_lowercase();

    distinct_mana_symbols(&oracle) >= 2
        || ANY_COLOR_PHRASES.iter().any(|p| oracle.contains(p))
        || DUAL_LAND_NAMES.iter().any(|p| name.contains(p))
        || DUAL_LAND_TYPES.iter().any(|p| type_line.contains(p))
}

/// Any card that helps cast off-color spells: dual lands, treasure makers,
/// mana creatures
pub fn is_mana_fixer(card: &Card) -> bool {
    if is_basic_land(card.name()) {
        return false;
    }
    let type_line = card.type_line().unwrap_or_default().to_lowercase();
    let oracle = card.oracle_text().unwrap_or_default().to_lowercase();

    if type_line.contains("land") {
        return oracle.contains("add {")
            || oracle.contains("any color")
            || distinct_mana_symbols(&oracle) >= 2;
    }
    FIXER_PHRASES.iter().any(|p| oracle.contains(p))
}

fn validate_with_variants(
    variants: &BTreeMap<String, Vec<SplashVariant>>,
) -> (SplashValidation, usize, usize) {
    let all: Vec<&SplashVariant> = variants.values().flatten().collect();
    if all.is_empty() {
        return (SplashValidation::InsufficientData, 0, 0);
    }
    let positive = all.iter().filter(|v| v.win_rate_delta > 0.0).count();
    let negative = all.iter().filter(|v| v.win_rate_delta < 0.0).count();
    let validation = if positive as f64 > negative as f64 * 1.5 {
        SplashValidation::Good
    } else if negative > positive {
        SplashValidation::Poor
    } else {
        SplashValidation::Neutral
    };
    (validation, positive, negative)
}

/// Splash viability from dual lands, fixers and measured 3-color results
pub fn calculate_splash_indicator(
    cards: &[Card],
    variants: Option<&BTreeMap<String, Vec<SplashVariant>>>,
) -> SplashIndicator {
    let dual_lands: Vec<&Card> = cards.iter().filter(|c| is_dual_land(c)).collect();
    let fixers: Vec<&Card> = cards.iter().filter(|c| is_mana_fixer(c)).collect();

    let positive_wr = |c: &Card, min_games: u64| {
        c.stats
            .gih_wr
            .filter(|wr| *wr > 0.0 && c.stats.gih_games >= min_games)
    };

    let format_wrs: Vec<f64> = cards
        .iter()
        .filter_map(|c| positive_wr(c, FORMAT_AVG_MIN_GAMES))
        .collect();
    let format_avg_wr = if format_wrs.is_empty() { 0.5 } else { mean(&format_wrs) };

    let (dual_land_alsa, dual_land_pick_rate) = if dual_lands.is_empty() {
        (7.0, 0.4)
    } else {
        let alsas: Vec<f64> = dual_lands.iter().map(|c| c.stats.alsa).collect();
        let pick_rates: Vec<f64> = dual_lands.iter().map(|c| c.stats.pick_rate()).collect();
        (mean(&alsas), mean(&pick_rates))
    };

    let fixer_wr_premium = if fixers.is_empty() {
        0.0
    } else {
        let wrs: Vec<f64> = fixers
            .iter()
            .filter_map(|c| positive_wr(*c, FIXER_MIN_GAMES))
            .collect();
        let fixer_avg = if wrs.is_empty() { format_avg_wr } else { mean(&wrs) };
        fixer_avg - format_avg_wr
    };

    let (performance_validation, positive, negative) = variants
        .map(validate_with_variants)
        .unwrap_or((SplashValidation::InsufficientData, 0, 0));

    let dual_count = dual_lands.len();
    let (splash_label, recommendation) = match dual_count {
        0 if fixers.len() >= 5 && fixer_wr_premium > 0.0 => (
            SplashLabel::Moderate,
            "듀얼랜드 없음, 비랜드 마나 픽스로 스플래시 가능",
        ),
        0 => (SplashLabel::Low, "마나 픽스 부족, 2색 집중 권장"),
        n if n >= 10 => {
            if dual_land_alsa < 6.0 && dual_land_pick_rate > 0.5 {
                (SplashLabel::High, "풍부한 듀얼랜드, 3색 적극 권장")
            } else if dual_land_alsa < 7.5 {
                (SplashLabel::High, "듀얼랜드 풍부, 스플래시 용이")
            } else {
                (SplashLabel::Moderate, "듀얼랜드 있으나 늦게 픽됨, 스플래시 가능")
            }
        }
        n if n >= 5 => {
            if dual_land_alsa < 5.5 && dual_land_pick_rate > 0.55 {
                (SplashLabel::High, "듀얼랜드 경쟁 높음, 조기 픽 권장")
            } else if dual_land_alsa > 8.0 {
                (SplashLabel::High, "듀얼랜드 늦게 돌아옴, 스플래시 용이")
            } else {
                (SplashLabel::Moderate, "폭탄 스플래시 가능, 픽싱 확보 필요")
            }
        }
        _ if fixer_wr_premium > 0.02 => (
            SplashLabel::Moderate,
            "듀얼랜드 적으나 마나 픽스 강력, 제한적 스플래시",
        ),
        _ => (SplashLabel::Low, "2색 집중 권장, 스플래시 주의"),
    };

    let mut recommendation = recommendation.to_string();
    if performance_validation != SplashValidation::InsufficientData {
        recommendation.push_str(&format!(
            " (실제 3색 성과: {}, +{}/-{})",
            performance_validation, positive, negative
        ));
    }

    info!(
        "Splash: {} ({} dual lands, {} fixers, premium {:+.3})",
        splash_label,
        dual_count,
        fixers.len(),
        fixer_wr_premium
    );

    SplashIndicator {
        splash_label,
        dual_land_alsa,
        dual_land_pick_rate,
        fixer_wr_premium,
        dual_land_count: dual_count,
        mana_fixer_count: fixers.len(),
        performance_validation,
        positive_splash_count: positive,
        negative_splash_count: negative,
        recommendation,
    }
}
