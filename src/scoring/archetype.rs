//! Two-color archetypes and their splash variants

use crate::models::{Archetype, Card, ColorPair, Rarity, SplashVariant};
use crate::stats::{mean, stdev};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Pairs below this many games are not built into archetypes
pub const MIN_ARCHETYPE_GAMES: u64 = 1000;
/// Color combinations below this many games are ignored by structure detection
pub const MIN_STRUCTURE_GAMES: u64 = 50;

/// Lift above which a card counts as synergistic
const SYNERGY_MARGIN: f64 = 0.02;
const CANDIDATE_SHARE: f64 = 0.005;
const FALLBACK_MAIN_COUNT: usize = 5;

const KEY_COMMONS: usize = 5;
const KEY_UNCOMMONS: usize = 3;
const KEY_BOMBS: usize = 3;
const MAX_SYNERGY_CARDS: usize = 5;
const MAX_TRAP_CARDS: usize = 3;

/// Main archetypes and the splash variants hanging off each of them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArchetypeStructure {
    pub main_pairs: Vec<ColorPair>,
    /// Main pair colors -> variants (main colors plus exactly one)
    pub variants: BTreeMap<String, Vec<SplashVariant>>,
}

impl ArchetypeStructure {
    pub fn is_empty(&self) -> bool {
        self.main_pairs.is_empty()
    }

    pub fn variants_of(&self, colors: &str) -> &[SplashVariant] {
        self.variants.get(colors).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Colors of the two-color main pairs
    pub fn main_two_color_codes(&self) -> Vec<&str> {
        self.main_pairs
            .iter()
            .filter(|p| p.is_two_color())
            .map(|p| p.colors.as_str())
            .collect()
    }
}

fn is_subset(inner: &str, outer: &str) -> bool {
    inner.chars().all(|c| outer.contains(c))
}

/// Lift of one card inside the archetype; `None` without archetype data
fn synergy_lift(card: &Card, pair: &ColorPair) -> Option<f64> {
    let arch_wr = card.archetype_wr(&pair.colors)?;
    let baseline = if card.colors().chars().count() >= 2 {
        pair.win_rate
    } else {
        card.stats.gih_wr?
    };
    Some(arch_wr - baseline)
}

fn ranked_by_score<'a>(cards: &[&'a Card], keep: impl Fn(&Card) -> bool) -> Vec<&'a Card> {
    let mut ranked: Vec<&Card> = cards.iter().copied().filter(|c| keep(c)).collect();
    ranked.sort_by(|a, b| b.composite_score.total_cmp(&a.composite_score));
    ranked
}

fn top_mean(cards: &[&Card], n: usize) -> f64 {
    let scores: Vec<f64> = cards.iter().take(n).map(|c| c.composite_score).collect();
    mean(&scores)
}

fn names(cards: &[&Card], n: usize) -> Vec<String> {
    cards.iter().take(n).map(|c| c.name().to_string()).collect()
}

/// Build one archetype. Member cards are those whose colors are a
/// non-empty subset of the pair.
pub fn build_archetype(pair: &ColorPair, cards: &[Card], all_pairs: &[ColorPair]) -> Archetype {
    let members: Vec<&Card> = cards
        .iter()
        .filter(|c| c.stats.gih_wr.is_some())
        .filter(|c| !c.colors().is_empty() && is_subset(c.colors(), &pair.colors))
        .collect();

    let commons = ranked_by_score(&members, |c| c.rarity() == Rarity::Common);
    let uncommons = ranked_by_score(&members, |c| c.rarity() == Rarity::Uncommon);
    let rares = ranked_by_score(&members, |c| c.rarity().is_rare_or_mythic());

    let lifts: Vec<f64> = members.iter().filter_map(|c| synergy_lift(c, pair)).collect();
    let synergy_lift = mean(&lifts);
    let synergy_std = stdev(&lifts);
    let synergy_ratio = if lifts.is_empty() {
        0.0
    } else {
        lifts.iter().filter(|l| **l > SYNERGY_MARGIN).count() as f64 / lifts.len() as f64
    };
    let stability_bonus = (5.0 - synergy_std * 100.0).max(0.0);

    let mut synergy_cards = Vec::new();
    let mut trap_cards = Vec::new();
    for card in &members {
        let (Some(arch_wr), Some(gih_wr)) = (card.archetype_wr(&pair.colors), card.stats.gih_wr)
        else {
            continue;
        };
        if arch_wr > gih_wr + SYNERGY_MARGIN && synergy_cards.len() < MAX_SYNERGY_CARDS {
            synergy_cards.push(card.name().to_string());
        } else if arch_wr < gih_wr - SYNERGY_MARGIN && trap_cards.len() < MAX_TRAP_CARDS {
            trap_cards.push(card.name().to_string());
        }
    }

    let two_color_games: u64 = all_pairs
        .iter()
        .filter(|p| p.is_two_color())
        .map(|p| p.games)
        .sum();
    let meta_share = if two_color_games > 0 {
        pair.games as f64 / two_color_games as f64
    } else {
        0.0
    };

    let commons_score = top_mean(&commons, KEY_COMMONS);
    let uncommons_score = top_mean(&uncommons, KEY_UNCOMMONS);

    let strength_score = (pair.win_rate - 0.50) * 1000.0
        + synergy_lift * 50.0
        + synergy_ratio * 15.0
        + stability_bonus * 2.0
        + commons_score * 0.1
        + uncommons_score * 0.1;

    debug!(
        "Archetype {}: strength {:.1}, lift {:+.3} (std {:.3}), share {:.1}%",
        pair.colors,
        strength_score,
        synergy_lift,
        synergy_std,
        meta_share * 100.0
    );

    Archetype {
        color_pair: pair.clone(),
        strength_score,
        rank: 0,
        key_commons: names(&commons, KEY_COMMONS),
        key_uncommons: names(&uncommons, KEY_UNCOMMONS),
        signpost_uncommon: uncommons.first().map(|c| c.name().to_string()),
        bombs: names(&rares, KEY_BOMBS),
        synergy_cards,
        trap_cards,
        meta_share,
        synergy_lift,
        synergy_std,
        variants: Vec::new(),
    }
}

/// Archetypes for every two-color pair with enough games, by win rate
pub fn build_all_archetypes(cards: &[Card], color_pairs: &[ColorPair]) -> Vec<Archetype> {
    let mut archetypes: Vec<Archetype> = color_pairs
        .iter()
        .filter(|p| p.is_two_color() && p.games >= MIN_ARCHETYPE_GAMES)
        .map(|p| build_archetype(p, cards, color_pairs))
        .collect();

    archetypes.sort_by(|a, b| b.win_rate().total_cmp(&a.win_rate()));
    for (i, archetype) in archetypes.iter_mut().enumerate() {
        archetype.rank = i + 1;
    }
    info!("Built {} archetypes", archetypes.len());
    archetypes
}

/// Split color combinations into main archetypes and splash variants.
///
/// Mains need `min_share` of all games, candidates 0.5%; both need 50 games.
/// Without any main, the five most played combinations above the game floor
/// are used instead.
pub fn detect_archetype_structure(color_pairs: &[ColorPair], min_share: f64) -> ArchetypeStructure {
    let total_games: u64 = color_pairs.iter().map(|p| p.games).sum();
    if total_games == 0 {
        warn!("No color pair games, archetype structure is empty");
        return ArchetypeStructure::default();
    }
    let share = |games: u64| games as f64 / total_games as f64;

    let eligible: Vec<&ColorPair> = color_pairs
        .iter()
        .filter(|p| p.games >= MIN_STRUCTURE_GAMES)
        .collect();

    let mut main_pairs: Vec<&ColorPair> = eligible
        .iter()
        .copied()
        .filter(|p| share(p.games) >= min_share)
        .collect();
    let mut candidates: Vec<&ColorPair> = eligible
        .iter()
        .copied()
        .filter(|p| share(p.games) < min_share && share(p.games) >= CANDIDATE_SHARE)
        .collect();

    if main_pairs.is_empty() {
        let mut by_games = eligible.clone();
        by_games.sort_by(|a, b| b.games.cmp(&a.games));
        by_games.truncate(FALLBACK_MAIN_COUNT);
        if !by_games.is_empty() {
            warn!(
                "No color pair reaches {:.1}% meta share, using the {} most played",
                min_share * 100.0,
                by_games.len()
            );
        }
        candidates.retain(|c| !by_games.iter().any(|m| m.colors == c.colors));
        main_pairs = by_games;
    }

    let mut variants: BTreeMap<String, Vec<SplashVariant>> = main_pairs
        .iter()
        .map(|p| (p.colors.clone(), Vec::new()))
        .collect();

    for candidate in main_pairs.iter().chain(candidates.iter()) {
        for parent in &main_pairs {
            if parent.colors == candidate.colors {
                continue;
            }
            let extends_by_one = is_subset(&parent.colors, &candidate.colors)
                && candidate.color_count() == parent.color_count() + 1;
            if !extends_by_one {
                continue;
            }
            let added_color: String = candidate
                .colors
                .chars()
                .filter(|c| !parent.colors.contains(*c))
                .collect();
            if let Some(list) = variants.get_mut(&parent.colors) {
                list.push(SplashVariant {
                    colors: candidate.colors.clone(),
                    added_color,
                    win_rate: candidate.win_rate,
                    games: candidate.games,
                    meta_share: share(candidate.games),
                    win_rate_delta: candidate.win_rate - parent.win_rate,
                });
            }
        }
    }

    let variant_count: usize = variants.values().map(Vec::len).sum();
    info!(
        "Archetype structure: {} main, {} splash variants",
        main_pairs.len(),
        variant_count
    );

    ArchetypeStructure {
        main_pairs: main_pairs.into_iter().cloned().collect(),
        variants,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CardStats;

    fn card(name: &str, colors: &str, rarity: Rarity, score: f64, gih: f64) -> Card {
        let mut card = Card::new(CardStats::new(name, colors, rarity).with_gih(gih, 2000));
        card.composite_score = score;
        card
    }

    #[test]
    fn test_structure_below_game_floor_is_empty() {
        let pairs = vec![ColorPair::new("WU", 20, 40)];
        let structure = detect_archetype_structure(&pairs, 0.02);
        assert!(structure.main_pairs.is_empty());
        assert!(structure.variants.is_empty());
    }

    #[test]
    fn test_structure_zero_games() {
        let pairs = vec![ColorPair::new("WU", 0, 0)];
        assert!(detect_archetype_structure(&pairs, 0.02).is_empty());
        assert!(detect_archetype_structure(&[], 0.02).is_empty());
    }

    #[test]
    fn test_structure_mains_and_variants() {
        let pairs = vec![
            ColorPair::new("WU", 5500, 10000),
            ColorPair::new("BR", 5000, 10000),
            ColorPair::new("WUB", 90, 150),
            ColorPair::new("WUR", 300, 500),
            ColorPair::new("WBRG", 10, 30),
        ];
        let structure = detect_archetype_structure(&pairs, 0.02);
        let mains: Vec<&str> = structure.main_pairs.iter().map(|p| p.colors.as_str()).collect();
        // WUR holds 2.4% of games
        assert_eq!(mains, vec!["WU", "BR", "WUR"]);

        let wu = structure.variants_of("WU");
        assert_eq!(wu.len(), 2);
        let wur = wu.iter().find(|v| v.colors == "WUR").unwrap();
        assert_eq!(wur.added_color, "R");
        assert!((wur.win_rate_delta - 0.05).abs() < 1e-9);
        let wub = wu.iter().find(|v| v.colors == "WUB").unwrap();
        assert_eq!(wub.added_color, "B");

        assert!(!structure.variants_of("BR").iter().any(|v| v.colors == "WUR"));
        assert!(structure.variants_of("WUR").is_empty());
    }

    #[test]
    fn test_structure_fallback_top_played() {
        // Games spread over many tiny buckets so nothing reaches 2%
        let mut pairs = vec![ColorPair::new("WUBRG", 20, 49); 100];
        pairs.push(ColorPair::new("UB", 33, 60));
        pairs.push(ColorPair::new("UBG", 30, 55));
        let structure = detect_archetype_structure(&pairs, 0.02);
        let mains: Vec<&str> = structure.main_pairs.iter().map(|p| p.colors.as_str()).collect();
        assert_eq!(mains, vec!["UB", "UBG"]);
        assert_eq!(structure.variants_of("UB").len(), 1);
    }

    #[test]
    fn test_build_archetype_strength() {
        let pair = ColorPair::new("WU", 5500, 10000);
        let all_pairs = vec![pair.clone(), ColorPair::new("BR", 4500, 10000)];

        let mut flyer = card("Flyer", "W", Rarity::Common, 70.0, 0.56);
        flyer.stats.archetype_wrs.insert("WU".into(), 0.60);
        let mut gold = card("Signpost", "WU", Rarity::Uncommon, 80.0, 0.58);
        gold.stats.archetype_wrs.insert("WU".into(), 0.58);
        let mut dud = card("Dud", "U", Rarity::Common, 40.0, 0.55);
        dud.stats.archetype_wrs.insert("WU".into(), 0.52);
        let outsider = card("Raider", "R", Rarity::Common, 90.0, 0.60);
        let bomb = card("Angel", "W", Rarity::Mythic, 95.0, 0.65);

        let cards = vec![flyer, gold, dud, outsider, bomb];
        let arch = build_archetype(&pair, &cards, &all_pairs);

        assert_eq!(arch.key_commons, vec!["Flyer", "Dud"]);
        assert_eq!(arch.signpost_uncommon.as_deref(), Some("Signpost"));
        assert_eq!(arch.bombs, vec!["Angel"]);
        assert_eq!(arch.synergy_cards, vec!["Flyer"]);
        assert_eq!(arch.trap_cards, vec!["Dud"]);
        assert!((arch.meta_share - 0.5).abs() < 1e-12);

        // lifts: 0.04, 0.03 (gold vs pair WR), -0.03
        let lifts = [0.04, 0.03, -0.03];
        assert!((arch.synergy_lift - mean(&lifts)).abs() < 1e-9);
        let expected = 0.05 * 1000.0
            + mean(&lifts) * 50.0
            + (2.0 / 3.0) * 15.0
            + (5.0 - stdev(&lifts) * 100.0).max(0.0) * 2.0
            + 55.0 * 0.1
            + 80.0 * 0.1;
        assert!((arch.strength_score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_build_all_filters_and_ranks() {
        let pairs = vec![
            ColorPair::new("WU", 520, 1000),
            ColorPair::new("BR", 5600, 10000),
            ColorPair::new("UG", 300, 500),
            ColorPair::new("WUB", 700, 1200),
        ];
        let archetypes = build_all_archetypes(&[], &pairs);
        assert_eq!(archetypes.len(), 2);
        assert_eq!(archetypes[0].colors(), "BR");
        assert_eq!(archetypes[0].rank, 1);
        assert_eq!(archetypes[1].rank, 2);
    }
}
