//! Mana cost parsing with hybrid symbols kept apart from gold ones

use crate::models::{canonical_colors, ManaRequirements};
use regex::Regex;
use std::sync::OnceLock;

fn hybrid_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\{([WUBRG2])/([WUBRG])\}").expect("hybrid mana pattern is valid")
    })
}

fn single_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)\{([WUBRG])\}").expect("mana pattern is valid"))
}

/// Split a mana cost into required colors and hybrid choices.
///
/// `{W}{R}` needs both colors; `{W/R}{W/R}` needs either. `{2/W}` counts as
/// a hybrid symbol payable only by W. The minimum color set is greedy: a
/// hybrid symbol already covered by a chosen color adds nothing, otherwise
/// its alphabetically first option is added.
pub fn parse_mana_requirements(mana_cost: &str) -> ManaRequirements {
    if mana_cost.is_empty() {
        return ManaRequirements::default();
    }

    let without_hybrid = hybrid_pattern().replace_all(mana_cost, "");
    let required: String = single_pattern()
        .captures_iter(&without_hybrid)
        .map(|cap| cap[1].to_uppercase())
        .collect();
    let required_colors = canonical_colors(&required);

    let hybrid_options: Vec<String> = hybrid_pattern()
        .captures_iter(mana_cost)
        .map(|cap| canonical_colors(&format!("{}{}", &cap[1], &cap[2])))
        .filter(|options| !options.is_empty())
        .collect();

    let mut chosen = required_colors.clone();
    for options in &hybrid_options {
        if options.chars().any(|c| chosen.contains(c)) {
            continue;
        }
        if let Some(first) = options.chars().min() {
            chosen.push(first);
        }
    }

    ManaRequirements {
        is_hybrid: !hybrid_options.is_empty(),
        required_colors,
        hybrid_options,
        min_colors: canonical_colors(&chosen),
    }
}
