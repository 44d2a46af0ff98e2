//! End-to-end pipeline tests
//!
//! Drive `MetaAnalyzer` against an in-memory set of 60 cards across ten
//! archetypes, then check the snapshot invariants and that every report
//! format renders.

use draftmeta::ai::{AiResult, TextGenerator};
use draftmeta::config::AnalyzerConfig;
use draftmeta::data::{
    parse_mana_requirements, CardMetadataProvider, CardRecord, ColorRecord, DataResult,
    DraftDataSource, TrophyDeckRecord,
};
use draftmeta::models::{CardMetadata, Grade, Irregularity, MetaSnapshot, COLOR_PAIRS};
use draftmeta::pipeline::{AnalysisOptions, MetaAnalyzer, NoProgress, ProgressSink};
use draftmeta::reporters::{report_with_format, write_report, write_snapshot, OutputFormat};
use std::cell::Cell;
use std::rc::Rc;

const MONO: [&str; 5] = ["W", "U", "B", "R", "G"];

fn record(name: &str, color: &str, rarity: &str, gih_wr: Option<f64>, games: u64, alsa: f64) -> CardRecord {
    CardRecord {
        name: name.into(),
        color: color.into(),
        rarity: rarity.into(),
        seen_count: 20_000,
        avg_seen: Some(alsa),
        pick_count: 3_000,
        avg_pick: Some(alsa - 1.0),
        game_count: games,
        win_rate: gih_wr.map(|wr| wr - 0.005),
        opening_hand_game_count: games / 3,
        opening_hand_win_rate: gih_wr.map(|wr| wr - 0.01),
        drawn_game_count: games / 2,
        drawn_win_rate: gih_wr.map(|wr| wr + 0.005),
        ever_drawn_game_count: if gih_wr.is_some() { games } else { 0 },
        ever_drawn_win_rate: gih_wr,
        never_drawn_game_count: games,
        never_drawn_win_rate: gih_wr.map(|_| 0.53),
        types: vec!["Creature".into()],
    }
}

/// 10 cards per color plus a few gold cards, one bait and one unplayed rare
fn set_cards() -> Vec<CardRecord> {
    let mut cards = Vec::new();
    for (ci, color) in MONO.iter().enumerate() {
        for i in 0..10 {
            let wr = 0.50 + ci as f64 * 0.004 + i as f64 * 0.006;
            let rarity = match i {
                9 => "rare",
                7 | 8 => "uncommon",
                _ => "common",
            };
            cards.push(record(
                &format!("{} Card {}", color, i),
                color,
                rarity,
                Some(wr),
                4_000 + i as u64 * 200,
                9.0 - i as f64 * 0.6,
            ));
        }
    }
    cards.push(record("Azorius Signpost", "WU", "uncommon", Some(0.60), 3_000, 3.5));
    cards.push(record("Golgari Signpost", "BG", "uncommon", Some(0.57), 3_000, 3.8));
    cards.push(record("Overdrafted Bait", "R", "rare", Some(0.47), 6_000, 1.6));
    cards.push(record("Late Pick Gem", "G", "common", Some(0.62), 5_000, 11.5));
    cards.push(record("Thriving Grove", "", "common", Some(0.55), 2_500, 6.0));
    cards.push(record("Unplayed Rare", "B", "rare", None, 0, 7.0));
    cards
}

struct SetFixture;

impl DraftDataSource for SetFixture {
    fn fetch_card_ratings(&self, _: &str, _: &str) -> DataResult<Vec<CardRecord>> {
        Ok(set_cards())
    }

    fn fetch_color_ratings(&self, _: &str, _: &str) -> DataResult<Vec<ColorRecord>> {
        let mut records: Vec<ColorRecord> = COLOR_PAIRS
            .iter()
            .enumerate()
            .map(|(i, pair)| ColorRecord {
                color_name: format!("Pair ({})", pair),
                wins: 5_300 + i as u64 * 60,
                games: 10_000,
                is_summary: false,
            })
            .collect();
        records.push(ColorRecord {
            color_name: "Azorius + Splash (WUG)".into(),
            wins: 520,
            games: 1_000,
            is_summary: false,
        });
        Ok(records)
    }

    fn fetch_archetype_ratings(&self, _: &str, _: &str, colors: &str) -> DataResult<Vec<CardRecord>> {
        Ok(set_cards()
            .into_iter()
            .filter(|c| !c.color.is_empty() && c.color.chars().all(|ch| colors.contains(ch)))
            .map(|mut c| {
                c.ever_drawn_win_rate = c.ever_drawn_win_rate.map(|wr| wr + 0.01);
                c.ever_drawn_game_count /= 4;
                c.game_count /= 4;
                c
            })
            .collect())
    }

    fn fetch_trophy_decks(&self, _: &str, _: &str) -> DataResult<Vec<TrophyDeckRecord>> {
        Ok(["WU", "WU", "BG", "WUG"]
            .iter()
            .enumerate()
            .map(|(i, colors)| TrophyDeckRecord {
                aggregate_id: format!("agg{}", i),
                deck_index: 0,
                colors: colors.to_string(),
                wins: 7,
                losses: i as u32 % 3,
                time: "2026-03-01 12:00:00".into(),
            })
            .collect())
    }
}

struct SetText;

impl CardMetadataProvider for SetText {
    fn card_metadata(&self, name: &str, _: &str) -> DataResult<Option<CardMetadata>> {
        let (cost, type_line, cmc) = match name {
            "Thriving Grove" => ("", "Land", 0.0),
            "Azorius Signpost" => ("{1}{W}{U}", "Creature — Human Wizard", 3.0),
            "Golgari Signpost" => ("{B/G}{B/G}", "Creature — Elf", 2.0),
            "Unplayed Rare" => return Ok(None),
            _ => ("{1}{G}", "Creature — Beast", 2.0),
        };
        Ok(Some(CardMetadata {
            mana_cost: Some(cost.to_string()),
            type_line: Some(type_line.to_string()),
            cmc: Some(cmc),
            oracle_text: Some(format!("{} text", name)),
            mana: parse_mana_requirements(cost),
            ..Default::default()
        }))
    }
}

struct CountingGenerator(Rc<Cell<usize>>);

impl TextGenerator for CountingGenerator {
    fn generate_text(&self, _prompt: &str, _system: Option<&str>) -> AiResult<String> {
        self.0.set(self.0.get() + 1);
        Ok("Draft the open lane.".into())
    }
}

fn analyzer(cache_dir: &std::path::Path) -> MetaAnalyzer {
    let mut config = AnalyzerConfig::default();
    config.cache.dir = Some(cache_dir.to_path_buf());
    MetaAnalyzer::new(Box::new(SetFixture), Box::new(SetText), config)
}

fn full_run(cache_dir: &std::path::Path) -> MetaSnapshot {
    analyzer(cache_dir)
        .analyze("TST", "PremierDraft", &AnalysisOptions::default(), &mut NoProgress)
        .unwrap()
}

#[test]
fn test_full_analysis_invariants() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = full_run(dir.path());

    assert_eq!(snapshot.total_cards, 56);
    assert_eq!(snapshot.all_cards.len(), snapshot.total_cards);
    assert_eq!(snapshot.total_games_analyzed, 6_000);

    for card in &snapshot.all_cards {
        assert!(
            (0.0..=100.0).contains(&card.composite_score),
            "{} scored {}",
            card.name(),
            card.composite_score
        );
    }

    assert_eq!(snapshot.no_data_cards.len(), 1);
    let unplayed = &snapshot.no_data_cards[0];
    assert_eq!(unplayed.name(), "Unplayed Rare");
    assert_eq!(unplayed.grade, Grade::NotAvailable);
    assert_eq!(unplayed.irregularity, Irregularity::NoData);

    for card in &snapshot.sleeper_cards {
        assert_eq!(card.irregularity, Irregularity::Sleeper);
        assert!(card.stats.gih_wr.is_some());
        assert!(!snapshot.trap_cards.iter().any(|t| t.name() == card.name()));
    }
    for card in &snapshot.trap_cards {
        assert_eq!(card.irregularity, Irregularity::Trap);
    }
}

#[test]
fn test_colors_and_archetypes() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = full_run(dir.path());

    assert_eq!(snapshot.color_strengths.len(), 5);
    let mut ranks: Vec<usize> = snapshot.color_strengths.iter().map(|c| c.rank).collect();
    ranks.sort_unstable();
    assert_eq!(ranks, vec![1, 2, 3, 4, 5]);

    assert_eq!(snapshot.archetypes.len(), 10);
    for pair in snapshot.archetypes.windows(2) {
        assert!(pair[0].win_rate() >= pair[1].win_rate());
        assert_eq!(pair[0].rank + 1, pair[1].rank);
    }
    for archetype in &snapshot.archetypes {
        for name in &archetype.key_commons {
            assert_ne!(name, "Unplayed Rare");
        }
    }

    let speed = snapshot.format_speed.as_ref().unwrap();
    assert!(speed.tempo_ratio > 0.0);
    assert!(snapshot.splash_indicator.is_some());
}

#[test]
fn test_metadata_attached() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = full_run(dir.path());

    let signpost = snapshot
        .all_cards
        .iter()
        .find(|c| c.name() == "Golgari Signpost")
        .unwrap();
    let meta = signpost.metadata.as_ref().unwrap();
    assert!(meta.mana.is_hybrid);
    assert!(signpost.is_hybrid());

    let unplayed = snapshot
        .all_cards
        .iter()
        .find(|c| c.name() == "Unplayed Rare")
        .unwrap();
    assert!(unplayed.metadata.is_none());
}

#[test]
fn test_trophy_stats_cached_between_runs() {
    let dir = tempfile::tempdir().unwrap();
    let first = full_run(dir.path());
    let trophy = first.trophy_stats.as_ref().unwrap();
    assert_eq!(trophy.analyzed_decks, 4);
    assert!(trophy.archetype_stats.contains_key("WU"));
    assert!(dir.path().join("TST_PremierDraft_trophy_cache.json").exists());

    let second = full_run(dir.path());
    let reloaded = second.trophy_stats.as_ref().unwrap();
    assert_eq!(reloaded.analyzed_decks, trophy.analyzed_decks);
    assert_eq!(
        reloaded.archetype_stats.keys().collect::<Vec<_>>(),
        trophy.archetype_stats.keys().collect::<Vec<_>>()
    );
}

#[test]
fn test_scores_are_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let a = analyzer(dir.path()).quick_analyze("TST", "PremierDraft").unwrap();
    let b = analyzer(dir.path()).quick_analyze("TST", "PremierDraft").unwrap();
    for (x, y) in a.all_cards.iter().zip(&b.all_cards) {
        assert_eq!(x.name(), y.name());
        assert_eq!(x.composite_score, y.composite_score);
        assert_eq!(x.irregularity, y.irregularity);
    }
}

#[test]
fn test_llm_sections_one_call_each() {
    let dir = tempfile::tempdir().unwrap();
    let calls = Rc::new(Cell::new(0));
    let mut analyzer =
        analyzer(dir.path()).with_generator(Box::new(CountingGenerator(calls.clone())));

    struct Count(usize);
    impl ProgressSink for Count {
        fn step(&mut self, _: usize, total: usize, _: &str) {
            self.0 = total;
        }
    }
    let mut sink = Count(0);
    let options = AnalysisOptions {
        no_trophy: true,
        ..Default::default()
    };
    let snapshot = analyzer.analyze("TST", "PremierDraft", &options, &mut sink).unwrap();

    assert_eq!(sink.0, 9);
    assert_eq!(calls.get(), 5);
    assert_eq!(
        snapshot.llm.format_overview.as_deref(),
        Some("Draft the open lane.")
    );
    assert!(snapshot.llm.archetype_deep_dive.is_some());
}

#[test]
fn test_every_report_format_renders() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = full_run(dir.path());

    for format in [
        OutputFormat::Text,
        OutputFormat::Json,
        OutputFormat::Markdown,
        OutputFormat::Html,
    ] {
        let out = report_with_format(&snapshot, format).unwrap();
        assert!(out.contains("TST"), "{} report lacks the set code", format);
    }

    let json: serde_json::Value =
        serde_json::from_str(&report_with_format(&snapshot, OutputFormat::Json).unwrap()).unwrap();
    assert_eq!(json["total_cards"], 56);

    let out = dir.path().join("reports");
    let html = write_report(&snapshot, OutputFormat::Html, &out).unwrap();
    let saved = write_snapshot(&snapshot, &out).unwrap();
    assert!(html.exists());
    let reloaded: MetaSnapshot =
        serde_json::from_str(&std::fs::read_to_string(saved).unwrap()).unwrap();
    assert_eq!(reloaded.all_cards.len(), snapshot.all_cards.len());
}
