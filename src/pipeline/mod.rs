//! Meta analysis pipeline
//!
//! Orchestrates one (expansion, format) run:
//! 1. Load card ratings and color pairs (with the card-data fallback)
//! 2. Detect archetype structure and calibrate thresholds
//! 3. Score cards and attach card text
//! 4. Per-archetype viability and sleeper/trap detection
//! 5. Archetypes, format speed, splash and color strengths
//! 6. Trophy statistics and LLM sections, both optional
//!
//! Every stage consumes the full output of the previous one. Only the card
//! ratings are required; every other upstream failure degrades to empty input.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::ai::{LlmEnricher, TextGenerator};
use crate::analysis::{
    calculate_format_speed, calculate_splash_indicator, MetadataIndex, TrophyAnalyzer,
    TrophyCacheStore,
};
use crate::cache::{get_responses_dir, ResponseCache};
use crate::calibrate::Calibrator;
use crate::config::AnalyzerConfig;
use crate::data::{
    compute_color_pairs_from_cards, fetch_all_archetype_ratings, total_games, ArchetypeRatings,
    CardMetadataCache, CardMetadataProvider, ColorRecord, DraftDataSource, ScryfallClient,
    SeventeenLandsClient,
};
use crate::models::{CardStats, ColorPair, MetaSnapshot, TrophyStats};
use crate::scoring::{
    build_all_archetypes, detect_archetype_structure, enrich_cards_with_viability, CardScorer,
    ColorScorer, CompositeScorer, IrregularityClassifier, IrregularityDetector,
    DEFAULT_VIABILITY_MIN_GAMES,
};

/// Share of all games a color combination needs to count as a main archetype
pub const STRUCTURE_MIN_SHARE: f64 = 0.02;

const BASE_STEPS: usize = 8;

/// Switches for the optional stages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalysisOptions {
    pub no_llm: bool,
    pub no_trophy: bool,
    /// Ignore saved trophy statistics
    pub refresh_trophy: bool,
}

impl AnalysisOptions {
    /// Card scoring only
    pub fn quick() -> Self {
        Self {
            no_llm: true,
            no_trophy: true,
            refresh_trophy: false,
        }
    }
}

/// Receives `[step/total]` progress from [`MetaAnalyzer::analyze`]
pub trait ProgressSink {
    fn step(&mut self, step: usize, total: usize, message: &str);

    fn finish(&mut self) {}
}

/// Discards progress; the log still gets every step
#[derive(Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn step(&mut self, _step: usize, _total: usize, _message: &str) {}
}

struct Progress<'a> {
    sink: &'a mut dyn ProgressSink,
    step: usize,
    total: usize,
}

impl Progress<'_> {
    fn advance(&mut self, message: &str) {
        self.step += 1;
        info!("[{}/{}] {}", self.step, self.total, message);
        self.sink.step(self.step, self.total, message);
    }
}

/// Runs the full analysis against a data source and a card-text provider
pub struct MetaAnalyzer {
    source: Box<dyn DraftDataSource>,
    metadata: Box<dyn CardMetadataProvider>,
    metadata_cache: CardMetadataCache,
    generator: Option<Box<dyn TextGenerator>>,
    trophy_store: TrophyCacheStore,
    config: AnalyzerConfig,
}

impl MetaAnalyzer {
    pub fn new(
        source: Box<dyn DraftDataSource>,
        metadata: Box<dyn CardMetadataProvider>,
        config: AnalyzerConfig,
    ) -> Self {
        let trophy_store = TrophyCacheStore::new(config.cache.dir(), config.trophy.max_age_days);
        Self {
            source,
            metadata,
            metadata_cache: CardMetadataCache::new(),
            generator: None,
            trophy_store,
            config,
        }
    }

    /// 17lands and Scryfall clients sharing the configured response cache
    pub fn from_config(config: AnalyzerConfig) -> Self {
        let responses = get_responses_dir(&config.cache.dir());
        let cache = ResponseCache::new(responses, config.cache.ttl_hours);
        Self::new(
            Box::new(SeventeenLandsClient::new(Some(cache.clone()))),
            Box::new(ScryfallClient::new(Some(cache))),
            config,
        )
    }

    pub fn with_generator(mut self, generator: Box<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    /// Drop all card text looked up so far
    pub fn clear_metadata_cache(&mut self) {
        self.metadata_cache.clear();
    }

    fn total_steps(&self, options: &AnalysisOptions) -> usize {
        let mut total = BASE_STEPS;
        if !options.no_trophy {
            total += 1;
        }
        if !options.no_llm && self.generator.is_some() {
            total += 1;
        }
        total
    }

    /// Analysis without trophy statistics or LLM sections
    pub fn quick_analyze(&mut self, expansion: &str, format: &str) -> Result<MetaSnapshot> {
        self.analyze(expansion, format, &AnalysisOptions::quick(), &mut NoProgress)
    }

    /// Run the complete analysis for one set and format
    pub fn analyze(
        &mut self,
        expansion: &str,
        format: &str,
        options: &AnalysisOptions,
        sink: &mut dyn ProgressSink,
    ) -> Result<MetaSnapshot> {
        let mut progress = Progress {
            total: self.total_steps(options),
            step: 0,
            sink,
        };

        progress.advance(&format!("Loading card ratings for {} {}", expansion, format));
        let records = self
            .source
            .fetch_card_ratings(expansion, format)
            .with_context(|| format!("Failed to load card ratings for {} {}", expansion, format))?;
        if records.is_empty() {
            error!("No card ratings for {} {}", expansion, format);
            bail!("No card ratings available for {} {}", expansion, format);
        }
        let card_stats: Vec<CardStats> = records.iter().map(CardStats::from).collect();

        progress.advance("Loading color pair ratings");
        let color_pairs = self.load_color_pairs(expansion, format, &card_stats);
        let structure = detect_archetype_structure(&color_pairs, STRUCTURE_MIN_SHARE);
        info!(
            "Detected {} main archetypes and {} variants",
            structure.main_pairs.len(),
            structure.variants.values().map(Vec::len).sum::<usize>()
        );

        progress.advance("Calibrating thresholds from data distribution");
        let calibration = Calibrator::new(self.config.calibration)
            .calibrate_with_stats(&card_stats);
        debug!("{}", calibration.distribution_report());
        let thresholds = calibration.thresholds;
        let detector = IrregularityDetector::from_thresholds(&thresholds);

        progress.advance("Scoring cards");
        let mut cards =
            CardScorer::new(self.config.scoring.clone()).score_all_cards(&card_stats);

        progress.advance("Enriching cards with Scryfall data");
        let names: Vec<String> = cards.iter().map(|c| c.stats.name.clone()).collect();
        let metadata: MetadataIndex =
            self.metadata_cache
                .get_or_fetch(self.metadata.as_ref(), expansion, &names);
        let mut hybrid = 0usize;
        for card in cards.iter_mut() {
            if let Some(meta) = metadata.get(&card.stats.name) {
                hybrid += usize::from(meta.mana.is_hybrid);
                card.metadata = Some(meta.clone());
            }
        }
        info!(
            "Enriched {}/{} cards with card text ({} hybrid)",
            metadata.len(),
            cards.len(),
            hybrid
        );

        progress.advance("Analyzing archetype viability");
        let ratings: ArchetypeRatings = fetch_all_archetype_ratings(
            self.source.as_ref(),
            expansion,
            format,
            &structure.main_two_color_codes(),
        );
        let cards = enrich_cards_with_viability(cards, &ratings, DEFAULT_VIABILITY_MIN_GAMES);

        progress.advance("Detecting sleeper and trap cards");
        let analysis = detector.analyze_all_cards(cards);

        progress.advance("Building archetype analysis");
        let mut archetypes = build_all_archetypes(&analysis.all_cards, &structure.main_pairs);
        for archetype in archetypes.iter_mut() {
            let mut variants = structure.variants_of(archetype.colors()).to_vec();
            variants.sort_by(|a, b| b.win_rate.total_cmp(&a.win_rate));
            archetype.variants = variants;
        }

        let play_draw = match self.source.fetch_play_draw_stats(expansion, format) {
            Ok(stats) => stats,
            Err(e) => {
                warn!("Play/draw stats unavailable: {}", e);
                None
            }
        };
        let format_speed = calculate_format_speed(&analysis.all_cards, play_draw.as_ref());
        let splash_indicator =
            calculate_splash_indicator(&analysis.all_cards, Some(&structure.variants));
        let color_strengths = ColorScorer::new(self.config.color_strength.clone())
            .calculate_all_color_strengths(&analysis.all_cards, &color_pairs);

        let trophy_stats = if options.no_trophy {
            None
        } else {
            progress.advance("Analyzing trophy decks");
            self.trophy_stats(expansion, format, options.refresh_trophy, &ratings, &metadata)
        };

        let snapshot = MetaSnapshot {
            expansion: expansion.to_string(),
            format: format.to_string(),
            timestamp: Utc::now(),
            thresholds,
            total_cards: analysis.all_cards.len(),
            total_games_analyzed: total_games(&card_stats),
            all_cards: analysis.all_cards,
            sleeper_cards: analysis.sleepers,
            trap_cards: analysis.traps,
            no_data_cards: analysis.no_data,
            color_strengths,
            archetypes,
            format_speed: Some(format_speed),
            splash_indicator: Some(splash_indicator),
            trophy_stats,
            llm: Default::default(),
        };

        let snapshot = match self.generator.as_deref() {
            Some(generator) if !options.no_llm => {
                progress.advance("Generating LLM analysis");
                let sections = LlmEnricher::new(generator).enrich(&snapshot);
                snapshot.with_llm(sections)
            }
            _ => snapshot,
        };

        progress.sink.finish();
        info!(
            "Analysis complete: {} cards, {} sleepers, {} traps",
            snapshot.total_cards,
            snapshot.sleeper_cards.len(),
            snapshot.trap_cards.len()
        );
        Ok(snapshot)
    }

    /// Color pairs from the API, or estimated from card data when that fails
    fn load_color_pairs(
        &self,
        expansion: &str,
        format: &str,
        card_stats: &[CardStats],
    ) -> Vec<ColorPair> {
        let pairs: Vec<ColorPair> = match self.source.fetch_color_ratings(expansion, format) {
            Ok(records) => records.iter().filter_map(ColorRecord::to_color_pair).collect(),
            Err(e) => {
                warn!("Color ratings request failed: {}", e);
                Vec::new()
            }
        };
        if !pairs.is_empty() {
            return pairs;
        }
        warn!("No color ratings for {} {}, estimating from card data", expansion, format);
        compute_color_pairs_from_cards(card_stats)
    }

    /// Saved trophy statistics when fresh, otherwise a new analysis
    fn trophy_stats(
        &self,
        expansion: &str,
        format: &str,
        refresh: bool,
        ratings: &ArchetypeRatings,
        metadata: &MetadataIndex,
    ) -> Option<TrophyStats> {
        if !refresh {
            if let Some(cached) = self.trophy_store.load(expansion, format) {
                info!("Using cached trophy analysis for {}", expansion);
                return Some(cached);
            }
        }

        let analyzer = TrophyAnalyzer::new(self.config.trophy.max_decks);
        match analyzer.analyze(self.source.as_ref(), expansion, format, ratings, metadata) {
            Ok(stats) => {
                if stats.analyzed_decks > 0 {
                    if let Err(e) = self.trophy_store.save(&stats) {
                        warn!("Failed to save trophy cache: {:#}", e);
                    }
                }
                Some(stats)
            }
            Err(e) => {
                warn!("Trophy analysis failed: {}", e);
                None
            }
        }
    }
}
