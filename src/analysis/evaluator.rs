//! Card lookups and pick suggestions over a finished snapshot

use crate::models::{Card, MetaSnapshot, Rarity};
use std::collections::HashMap;
use tracing::warn;

/// Minimum composite score for a rare or mythic to count as a bomb
pub const BOMB_SCORE: f64 = 80.0;

pub struct CardEvaluator<'a> {
    snapshot: &'a MetaSnapshot,
    by_name: HashMap<String, &'a Card>,
}

fn by_score_desc(a: &&Card, b: &&Card) -> std::cmp::Ordering {
    b.composite_score.total_cmp(&a.composite_score)
}

impl<'a> CardEvaluator<'a> {
    pub fn new(snapshot: &'a MetaSnapshot) -> Self {
        let by_name = snapshot
            .all_cards
            .iter()
            .map(|c| (c.name().to_lowercase(), c))
            .collect();
        Self { snapshot, by_name }
    }

    /// Case-insensitive lookup
    pub fn card(&self, name: &str) -> Option<&'a Card> {
        self.by_name.get(&name.to_lowercase()).copied()
    }

    /// Found cards, best score first; unknown names are logged and skipped
    pub fn compare_cards(&self, names: &[&str]) -> Vec<&'a Card> {
        let mut cards: Vec<&Card> = names
            .iter()
            .filter_map(|name| {
                let card = self.card(name);
                if card.is_none() {
                    warn!("Card not found: {}", name);
                }
                card
            })
            .collect();
        cards.sort_by(by_score_desc);
        cards
    }

    fn best_of_rarity(&self, rarity: Rarity, color: Option<char>, top_n: usize) -> Vec<&'a Card> {
        let mut cards: Vec<&Card> = self
            .snapshot
            .all_cards
            .iter()
            .filter(|c| c.rarity() == rarity)
            .filter(|c| color.is_none_or(|color| c.stats.has_color(color)))
            .collect();
        cards.sort_by(by_score_desc);
        cards.truncate(top_n);
        cards
    }

    pub fn best_commons(&self, color: Option<char>, top_n: usize) -> Vec<&'a Card> {
        self.best_of_rarity(Rarity::Common, color, top_n)
    }

    pub fn best_uncommons(&self, color: Option<char>, top_n: usize) -> Vec<&'a Card> {
        self.best_of_rarity(Rarity::Uncommon, color, top_n)
    }

    /// Rares and mythics scoring at least `min_score`
    pub fn bombs(&self, min_score: f64) -> Vec<&'a Card> {
        self.snapshot
            .all_cards
            .iter()
            .filter(|c| c.rarity().is_rare_or_mythic() && c.composite_score >= min_score)
            .collect()
    }

    /// Best pick among `available`.
    ///
    /// With a known archetype, a card's score is boosted by how much better
    /// it wins inside that archetype than overall (in percentage points).
    pub fn suggest_pick(&self, available: &[&str], archetype: Option<&str>) -> Option<&'a Card> {
        let cards: Vec<&Card> = available.iter().filter_map(|name| self.card(name)).collect();

        let pick_score = |card: &Card| -> f64 {
            let base = card.composite_score;
            let boost = archetype
                .and_then(|arch| card.archetype_wr(arch))
                .zip(card.stats.gih_wr)
                .map(|(arch_wr, gih)| (arch_wr - gih) * 100.0)
                .unwrap_or(0.0);
            base + boost
        };

        cards
            .into_iter()
            .max_by(|a, b| pick_score(*a).total_cmp(&pick_score(*b)))
    }

    /// One-line summary used by `draftmeta card`
    pub fn format_card_summary(card: &Card) -> String {
        let gih = card
            .stats
            .gih_wr
            .map(|wr| format!("{:.1}%", wr * 100.0))
            .unwrap_or_else(|| "N/A".to_string());
        format!(
            "{} ({}, {}) - Grade: {}, Score: {:.1}, GIH WR: {}",
            card.name(),
            card.colors(),
            card.rarity(),
            card.grade,
            card.composite_score,
            gih
        )
    }

    pub fn format_comparison(cards: &[&Card]) -> String {
        if cards.is_empty() {
            return "No cards to compare.".to_string();
        }
        let mut lines = vec!["Card Comparison:".to_string(), String::new()];
        for (i, card) in cards.iter().enumerate() {
            lines.push(format!("{}. {}", i + 1, Self::format_card_summary(card)));
        }
        lines.join("\n")
    }
}
