//! One generation call per report section
//!
//! Each section has its own focused prompt, so a failed or truncated call
//! only costs that section. Nothing is split out of a combined response.

use super::{PromptBuilder, TextGenerator};
use crate::models::{LlmSections, MetaSnapshot};
use tracing::{info, warn};

/// LLM-written report sections, in generation order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    FormatCharacteristics,
    ArchetypeDeepDive,
    ColorStrategy,
    StrategyTips,
    FormatOverview,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::FormatCharacteristics,
        Section::ArchetypeDeepDive,
        Section::ColorStrategy,
        Section::StrategyTips,
        Section::FormatOverview,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Section::FormatCharacteristics => "format characteristics",
            Section::ArchetypeDeepDive => "archetype deep dive",
            Section::ColorStrategy => "color strategy",
            Section::StrategyTips => "strategy tips",
            Section::FormatOverview => "format overview",
        }
    }

    fn prompt(&self, builder: &PromptBuilder, snapshot: &MetaSnapshot) -> String {
        match self {
            Section::FormatCharacteristics => builder.format_characteristics(snapshot),
            Section::ArchetypeDeepDive => builder.archetype_deep_dive(snapshot),
            Section::ColorStrategy => builder.color_strategy(snapshot),
            Section::StrategyTips => builder.strategy_tips(snapshot),
            Section::FormatOverview => builder.format_overview(snapshot),
        }
    }

    fn slot<'a>(&self, sections: &'a mut LlmSections) -> &'a mut Option<String> {
        match self {
            Section::FormatCharacteristics => &mut sections.format_characteristics,
            Section::ArchetypeDeepDive => &mut sections.archetype_deep_dive,
            Section::ColorStrategy => &mut sections.color_strategy,
            Section::StrategyTips => &mut sections.strategy_tips,
            Section::FormatOverview => &mut sections.format_overview,
        }
    }
}

pub struct LlmEnricher<'a> {
    generator: &'a dyn TextGenerator,
    builder: PromptBuilder,
    sections: Vec<Section>,
}

impl<'a> LlmEnricher<'a> {
    pub fn new(generator: &'a dyn TextGenerator) -> Self {
        Self {
            generator,
            builder: PromptBuilder::new(),
            sections: Section::ALL.to_vec(),
        }
    }

    /// Restrict generation to `sections`
    pub fn with_sections(mut self, sections: &[Section]) -> Self {
        self.sections = sections.to_vec();
        self
    }

    /// Generate every configured section. Failures are logged and leave the
    /// section empty.
    pub fn enrich(&self, snapshot: &MetaSnapshot) -> LlmSections {
        let mut sections = LlmSections::default();
        let system = self.builder.system_prompt();

        for section in &self.sections {
            info!("Generating {} for {}", section.name(), snapshot.expansion);
            let prompt = section.prompt(&self.builder, snapshot);
            match self.generator.generate_text(&prompt, Some(system)) {
                Ok(text) if !text.trim().is_empty() => {
                    *section.slot(&mut sections) = Some(text.trim().to_string());
                }
                Ok(_) => warn!("Empty LLM response for {}", section.name()),
                Err(e) => warn!("LLM generation failed for {}: {}", section.name(), e),
            }
        }
        sections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AiError, AiResult};
    use crate::models::ThresholdConfig;
    use chrono::Utc;
    use std::cell::RefCell;

    /// Echoes the first prompt line; fails on the strategy-tips prompt
    struct ScriptedGenerator {
        prompts: RefCell<Vec<String>>,
    }

    impl TextGenerator for ScriptedGenerator {
        fn generate_text(&self, prompt: &str, system: Option<&str>) -> AiResult<String> {
            assert!(system.is_some());
            self.prompts.borrow_mut().push(prompt.to_string());
            if prompt.contains("actionable draft tips") {
                return Err(AiError::ApiError {
                    status: 503,
                    message: "overloaded".into(),
                });
            }
            Ok(format!("  {}  ", prompt.lines().next().unwrap_or_default()))
        }
    }

    fn snapshot() -> MetaSnapshot {
        MetaSnapshot {
            expansion: "FDN".into(),
            format: "PremierDraft".into(),
            timestamp: Utc::now(),
            thresholds: ThresholdConfig::default(),
            all_cards: vec![],
            sleeper_cards: vec![],
            trap_cards: vec![],
            no_data_cards: vec![],
            color_strengths: vec![],
            archetypes: vec![],
            total_cards: 0,
            total_games_analyzed: 0,
            format_speed: None,
            splash_indicator: None,
            trophy_stats: None,
            llm: Default::default(),
        }
    }

    #[test]
    fn test_one_call_per_section() {
        let generator = ScriptedGenerator {
            prompts: RefCell::new(Vec::new()),
        };
        let sections = LlmEnricher::new(&generator).enrich(&snapshot());

        assert_eq!(generator.prompts.borrow().len(), 5);
        assert!(sections.strategy_tips.is_none());
        assert_eq!(
            sections.color_strategy.as_deref(),
            Some("You are an expert MTG draft analyst. Analyze the following color data for FDN PremierDraft.")
        );
        assert!(sections.format_characteristics.is_some());
        assert!(sections.archetype_deep_dive.is_some());
        assert!(sections.format_overview.is_some());
        assert!(!sections.is_empty());
    }

    #[test]
    fn test_section_subset() {
        let generator = ScriptedGenerator {
            prompts: RefCell::new(Vec::new()),
        };
        let sections = LlmEnricher::new(&generator)
            .with_sections(&[Section::StrategyTips])
            .enrich(&snapshot());
        assert_eq!(generator.prompts.borrow().len(), 1);
        assert!(sections.is_empty());
    }
}
