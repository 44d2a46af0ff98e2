//! Format speed
//!
//! Direct play/draw metrics win when present; otherwise the speed is
//! inferred from opening-hand vs drawn win rates and the CMC curve.
//! Disagreements between the signals are recorded, never resolved silently.

use crate::models::{Card, FormatSpeed, PlayDrawStats, SpeedLabel};
use crate::stats::mean;
use tracing::{debug, info};

const MIN_GAMES: u64 = 200;
const LOW_CMC: f64 = 2.0;
const HIGH_CMC: f64 = 5.0;
const NEUTRAL_WR: f64 = 0.5;

/// Speed label and raw band score from game length and on-the-play WR
pub fn classify_speed_from_api(avg_length: f64, wr_on_play: f64) -> (SpeedLabel, i32) {
    let mut score = 0;

    score += match avg_length {
        l if l < 8.2 => 2,
        l if l < 8.5 => 1,
        l if l > 9.2 => -2,
        l if l > 9.0 => -1,
        _ => 0,
    };
    score += match wr_on_play {
        w if w > 0.530 => 2,
        w if w > 0.525 => 1,
        w if w < 0.510 => -2,
        w if w < 0.515 => -1,
        _ => 0,
    };

    let label = match score {
        s if s >= 3 => SpeedLabel::VeryFast,
        s if s >= 1 => SpeedLabel::Fast,
        s if s <= -3 => SpeedLabel::VerySlow,
        s if s <= -1 => SpeedLabel::Slow,
        _ => SpeedLabel::Normal,
    };
    (label, score)
}

fn classify_from_tempo(tempo_ratio: f64, aggro_advantage: f64, conflicts: &mut Vec<String>) -> SpeedLabel {
    let mut label = match tempo_ratio {
        t if t >= 1.03 => SpeedLabel::Fast,
        t if t >= 0.99 => SpeedLabel::Normal,
        t if t >= 0.96 => SpeedLabel::SlightlySlow,
        _ => SpeedLabel::Slow,
    };

    if aggro_advantage > 0.03 {
        match label {
            SpeedLabel::Normal => {
                label = SpeedLabel::Fast;
                conflicts.push("CMC 기반 분석: 저마나 카드 강세".to_string());
            }
            SpeedLabel::SlightlySlow => {
                label = SpeedLabel::Normal;
                conflicts.push("CMC 기반 분석이 템포 분석과 상충".to_string());
            }
            _ => {}
        }
    } else if aggro_advantage < -0.03 {
        match label {
            SpeedLabel::Normal => {
                label = SpeedLabel::SlightlySlow;
                conflicts.push("CMC 기반 분석: 고마나 카드 강세".to_string());
            }
            SpeedLabel::Fast => {
                label = SpeedLabel::Normal;
                conflicts.push("CMC 기반 분석이 템포 분석과 상충".to_string());
            }
            _ => {}
        }
    }
    label
}

/// Human-readable explanation: data level, then conclusion
pub fn speed_interpretation(
    avg_length: Option<f64>,
    wr_on_play: Option<f64>,
    tempo_ratio: f64,
    aggro_advantage: f64,
) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let (Some(length), Some(wr)) = (avg_length, wr_on_play) {
        parts.push(if length < 8.5 {
            format!("평균 게임 길이 {:.2}턴은 빠른 편입니다", length)
        } else if length > 9.0 {
            format!("평균 게임 길이 {:.2}턴은 느린 편입니다", length)
        } else {
            format!("평균 게임 길이 {:.2}턴은 평균 수준입니다", length)
        });

        let pct = wr * 100.0;
        parts.push(if wr > 0.525 {
            format!("선공 승률 {:.1}%로 선공 우위가 높습니다", pct)
        } else if wr < 0.515 {
            format!("선공 승률 {:.1}%로 선공 우위가 낮습니다", pct)
        } else {
            format!("선공 승률 {:.1}%로 선/후공 균형이 맞습니다", pct)
        });

        let conclusion = if length < 8.5 && wr > 0.525 {
            "→ 템포와 초반 압박이 중요한 빠른 포맷입니다"
        } else if length > 9.0 && wr < 0.515 {
            "→ 카드 밸류와 후반 전략이 중요한 느린 포맷입니다"
        } else if length < 8.5 || wr > 0.52 {
            "→ 빠른 편이지만 균형 잡힌 포맷입니다"
        } else if length > 9.0 || wr < 0.515 {
            "→ 느린 편이지만 다양한 전략이 가능합니다"
        } else {
            "→ 균형 잡힌 포맷으로 다양한 전략이 가능합니다"
        };
        parts.push(conclusion.to_string());
    } else {
        let tempo = if tempo_ratio >= 1.02 {
            "템포 비율이 높아 빠른 포맷으로 추정됩니다"
        } else if tempo_ratio <= 0.97 {
            "템포 비율이 낮아 느린 포맷으로 추정됩니다"
        } else {
            "템포 비율이 평균 수준입니다"
        };
        parts.push(tempo.to_string());

        if aggro_advantage > 0.02 {
            parts.push("저마나 카드가 강세를 보입니다".to_string());
        } else if aggro_advantage < -0.02 {
            parts.push("고마나 카드가 강세를 보입니다".to_string());
        }
    }

    format!("{}.", parts.join(". "))
}

/// Speed of the format from card stats and optional play/draw metrics.
/// Empty input yields the default (normal) speed.
pub fn calculate_format_speed(cards: &[Card], play_draw: Option<&PlayDrawStats>) -> FormatSpeed {
    let valid: Vec<&Card> = cards.iter().filter(|c| c.stats.gih_games >= MIN_GAMES).collect();
    if valid.is_empty() {
        debug!("No cards with {}+ GIH games, default format speed", MIN_GAMES);
        return FormatSpeed::default();
    }

    let positive = |wr: Option<f64>| wr.filter(|v| *v > 0.0);
    let oh_wrs: Vec<f64> = valid.iter().filter_map(|c| positive(c.stats.oh_wr)).collect();
    let gd_wrs: Vec<f64> = valid.iter().filter_map(|c| positive(c.stats.gd_wr)).collect();
    let avg_oh_wr = if oh_wrs.is_empty() { NEUTRAL_WR } else { mean(&oh_wrs) };
    let avg_gd_wr = if gd_wrs.is_empty() { NEUTRAL_WR } else { mean(&gd_wrs) };
    let tempo_ratio = if avg_gd_wr > 0.0 { avg_oh_wr / avg_gd_wr } else { 1.0 };

    let with_cmc: Vec<(f64, f64)> = valid
        .iter()
        .filter_map(|c| Some((c.cmc()?, positive(c.stats.gih_wr)?)))
        .collect();
    let (low_cmc_wr, high_cmc_wr, aggro_advantage) = if with_cmc.is_empty() {
        info!("CMC data not available, aggro advantage set to 0");
        (NEUTRAL_WR, NEUTRAL_WR, 0.0)
    } else {
        let bucket_mean = |keep: &dyn Fn(f64) -> bool| {
            let wrs: Vec<f64> = with_cmc
                .iter()
                .filter(|(cmc, _)| keep(*cmc))
                .map(|(_, wr)| *wr)
                .collect();
            if wrs.is_empty() {
                NEUTRAL_WR
            } else {
                mean(&wrs)
            }
        };
        let low = bucket_mean(&|cmc| cmc <= LOW_CMC);
        let high = bucket_mean(&|cmc| cmc >= HIGH_CMC);
        (low, high, low - high)
    };

    let average_game_length = play_draw.and_then(|p| p.average_game_length);
    let win_rate_on_play = play_draw.and_then(|p| p.win_rate_on_play);

    let mut conflicts = Vec::new();
    let speed_label = match (average_game_length, win_rate_on_play) {
        (Some(length), Some(wr)) => {
            let (label, api_score) = classify_speed_from_api(length, wr);
            let indirect_fast = tempo_ratio >= 1.02 || aggro_advantage > 0.03;
            let indirect_slow = tempo_ratio <= 0.97 || aggro_advantage < -0.03;
            if api_score >= 1 && indirect_slow {
                conflicts.push("API는 빠름을 나타내지만 간접 지표는 느림을 시사".to_string());
            } else if api_score <= -1 && indirect_fast {
                conflicts.push("API는 느림을 나타내지만 간접 지표는 빠름을 시사".to_string());
            }
            label
        }
        _ => classify_from_tempo(tempo_ratio, aggro_advantage, &mut conflicts),
    };

    if tempo_ratio >= 1.02 && aggro_advantage < -0.02 {
        conflicts.push("템포 비율은 빠르지만 고마나 카드가 강함".to_string());
    }
    if tempo_ratio < 0.97 && aggro_advantage > 0.02 {
        conflicts.push("템포 비율은 느리지만 저마나 카드가 강함".to_string());
    }

    info!(
        "Format speed: {} (tempo {:.3}, aggro {:+.3}, {} conflicts)",
        speed_label,
        tempo_ratio,
        aggro_advantage,
        conflicts.len()
    );

    FormatSpeed {
        speed_label,
        average_game_length,
        win_rate_on_play,
        play_draw_sample_size: play_draw.and_then(|p| p.sample_size),
        turns_distribution: play_draw.map(|p| p.turns.clone()).unwrap_or_default(),
        speed_interpretation: speed_interpretation(
            average_game_length,
            win_rate_on_play,
            tempo_ratio,
            aggro_advantage,
        ),
        tempo_ratio,
        aggro_advantage,
        avg_oh_wr,
        avg_gd_wr,
        low_cmc_wr,
        high_cmc_wr,
        conflicts,
        recommendation: speed_label.recommendation().to_string(),
    }
}
