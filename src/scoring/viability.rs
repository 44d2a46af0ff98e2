//! Archetype viability of individual cards

use crate::data::ArchetypeRatings;
use crate::models::{Card, Viability};
use crate::stats::mean;
use std::collections::BTreeMap;
use tracing::debug;

/// Archetype sample below this is ignored
pub const DEFAULT_VIABILITY_MIN_GAMES: u64 = 50;
/// Archetypes within this of the best one stay viable
const VIABLE_MARGIN: f64 = 0.05;

/// Viability from a card's per-archetype win rates
pub fn calculate_viability(
    colors: &str,
    archetype_wrs: &BTreeMap<String, f64>,
    archetype_games: &BTreeMap<String, u64>,
    min_games: u64,
) -> Viability {
    let measured: Vec<(&str, f64)> = archetype_wrs
        .iter()
        .filter(|(code, _)| code.chars().count() == 2)
        .filter(|(code, _)| archetype_games.get(*code).copied().unwrap_or(0) >= min_games)
        .map(|(code, wr)| (code.as_str(), *wr))
        .collect();

    let Some(&(best_code, best_wr)) = measured.iter().max_by(|a, b| a.1.total_cmp(&b.1)) else {
        return Viability::default();
    };

    if measured.len() == 1 {
        return Viability {
            viable_archetypes: 1,
            best_archetype: Some(best_code.to_string()),
            off_archetype_penalty: 0.0,
            natural_premium: None,
        };
    }

    let (viable, off): (Vec<_>, Vec<_>) = measured
        .iter()
        .partition(|(_, wr)| *wr >= best_wr - VIABLE_MARGIN);
    let off_wrs: Vec<f64> = off.iter().map(|(_, wr)| *wr).collect();
    let off_archetype_penalty = if off_wrs.is_empty() {
        0.0
    } else {
        best_wr - mean(&off_wrs)
    };

    let (natural, foreign): (Vec<_>, Vec<_>) = measured
        .iter()
        .partition(|(code, _)| code.chars().any(|c| colors.contains(c)));
    let natural_premium = if natural.is_empty() || foreign.is_empty() {
        None
    } else {
        let natural: Vec<f64> = natural.iter().map(|(_, wr)| *wr).collect();
        let foreign: Vec<f64> = foreign.iter().map(|(_, wr)| *wr).collect();
        Some(mean(&natural) - mean(&foreign))
    };

    Viability {
        viable_archetypes: viable.len(),
        best_archetype: Some(best_code.to_string()),
        off_archetype_penalty,
        natural_premium,
    }
}

/// Fill per-archetype win rates from the ratings and compute viability.
/// Cards without a GIH WR are left untouched.
pub fn enrich_cards_with_viability(
    mut cards: Vec<Card>,
    ratings: &ArchetypeRatings,
    min_games: u64,
) -> Vec<Card> {
    let mut enriched = 0usize;
    for card in cards.iter_mut() {
        if card.stats.gih_wr.is_none() {
            continue;
        }
        for (code, records) in ratings {
            let Some(record) = records.iter().find(|r| r.name == card.stats.name) else {
                continue;
            };
            let Some(wr) = record.ever_drawn_win_rate else {
                continue;
            };
            if record.ever_drawn_game_count >= min_games {
                card.stats.archetype_wrs.insert(code.clone(), wr);
                card.stats
                    .archetype_games
                    .insert(code.clone(), record.ever_drawn_game_count);
            }
        }
        card.viability = calculate_viability(
            &card.stats.colors,
            &card.stats.archetype_wrs,
            &card.stats.archetype_games,
            min_games,
        );
        if card.viability.best_archetype.is_some() {
            enriched += 1;
        }
    }
    debug!("Viability computed for {} cards", enriched);
    cards
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CardRecord;
    use crate::models::{CardStats, Rarity};

    fn maps(entries: &[(&str, f64, u64)]) -> (BTreeMap<String, f64>, BTreeMap<String, u64>) {
        let wrs = entries.iter().map(|(c, wr, _)| (c.to_string(), *wr)).collect();
        let games = entries.iter().map(|(c, _, g)| (c.to_string(), *g)).collect();
        (wrs, games)
    }

    #[test]
    fn test_no_archetype_data() {
        let (wrs, games) = maps(&[("WU", 0.6, 10)]);
        assert_eq!(calculate_viability("W", &wrs, &games, 50), Viability::default());
    }

    #[test]
    fn test_single_archetype() {
        let (wrs, games) = maps(&[("WU", 0.6, 300), ("WB", 0.5, 20)]);
        let v = calculate_viability("W", &wrs, &games, 50);
        assert_eq!(v.viable_archetypes, 1);
        assert_eq!(v.best_archetype.as_deref(), Some("WU"));
        assert_eq!(v.off_archetype_penalty, 0.0);
        assert_eq!(v.natural_premium, None);
    }

    #[test]
    fn test_penalty_and_premium() {
        let (wrs, games) = maps(&[
            ("WU", 0.60, 500),
            ("WB", 0.57, 500),
            ("UB", 0.50, 500),
            ("BR", 0.48, 500),
            ("WUB", 0.70, 500),
        ]);
        let v = calculate_viability("W", &wrs, &games, 50);
        assert_eq!(v.viable_archetypes, 2);
        assert_eq!(v.best_archetype.as_deref(), Some("WU"));
        assert!((v.off_archetype_penalty - 0.11).abs() < 1e-9);
        // natural (WU, WB) 0.585, foreign (UB, BR) 0.49
        assert!((v.natural_premium.unwrap() - 0.095).abs() < 1e-9);
    }

    #[test]
    fn test_enrich_cards() {
        let mut ratings = ArchetypeRatings::new();
        for (code, wr, games) in [("WU", 0.62, 800), ("WB", 0.55, 600), ("WR", 0.51, 30)] {
            ratings.insert(
                code.to_string(),
                vec![CardRecord {
                    name: "Sky Patrol".into(),
                    ever_drawn_game_count: games,
                    ever_drawn_win_rate: Some(wr),
                    ..Default::default()
                }],
            );
        }

        let cards = vec![
            Card::new(CardStats::new("Sky Patrol", "W", Rarity::Common).with_gih(0.58, 3000)),
            Card::no_data(CardStats::new("Sky Patrol", "W", Rarity::Common)),
        ];
        let cards = enrich_cards_with_viability(cards, &ratings, 50);

        assert_eq!(cards[0].stats.archetype_wrs.len(), 2);
        assert!(!cards[0].stats.archetype_wrs.contains_key("WR"));
        assert_eq!(cards[0].viability.viable_archetypes, 1);
        assert!((cards[0].viability.off_archetype_penalty - 0.07).abs() < 1e-9);
        assert_eq!(cards[0].stability_score(), 50.0);
        assert!(cards[1].stats.archetype_wrs.is_empty());
    }
}
