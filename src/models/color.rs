//! Color identity helpers

/// The five colors in canonical WUBRG order
pub const COLORS: [char; 5] = ['W', 'U', 'B', 'R', 'G'];

/// The ten two-color pairs, each spelled in canonical order
pub const COLOR_PAIRS: [&str; 10] = [
    "WU", "UB", "BR", "RG", "WG", "WB", "UR", "BG", "WR", "UG",
];

/// Basic land names, excluded from usage lists and fixer heuristics
pub const BASIC_LANDS: [&str; 5] = ["Plains", "Island", "Swamp", "Mountain", "Forest"];

/// Guild name of a two-color pair, if it is one
pub fn guild_name(colors: &str) -> Option<&'static str> {
    match canonical_colors(colors).as_str() {
        "WU" => Some("Azorius"),
        "UB" => Some("Dimir"),
        "BR" => Some("Rakdos"),
        "RG" => Some("Gruul"),
        "WG" => Some("Selesnya"),
        "WB" => Some("Orzhov"),
        "UR" => Some("Izzet"),
        "BG" => Some("Golgari"),
        "WR" => Some("Boros"),
        "UG" => Some("Simic"),
        _ => None,
    }
}

/// Deduplicate and reorder color letters into WUBRG order.
///
/// Anything that is not a color letter is dropped, so `"gw"` and `"G W"`
/// both become `"WG"`.
pub fn canonical_colors(colors: &str) -> String {
    let upper = colors.to_uppercase();
    COLORS.iter().filter(|c| upper.contains(**c)).collect()
}

/// Normalize an upstream color label such as `"Azorius (WU)"` or `"GW"`.
///
/// When the label carries a parenthesized code, only that code is read so
/// letters inside the guild name are ignored.
pub fn normalize_color_pair(label: &str) -> String {
    let code = match (label.find('('), label.rfind(')')) {
        (Some(open), Some(close)) if close > open => &label[open + 1..close],
        _ => label,
    };
    // Bare labels are only trusted when they are made of color letters.
    if code.chars().all(|c| c.is_whitespace() || "WUBRGwubrg".contains(c)) {
        canonical_colors(code)
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_colors() {
        assert_eq!(canonical_colors("GW"), "WG");
        assert_eq!(canonical_colors("rUb"), "UBR");
        assert_eq!(canonical_colors(""), "");
    }

    #[test]
    fn test_normalize_color_pair() {
        assert_eq!(normalize_color_pair("Azorius (WU)"), "WU");
        assert_eq!(normalize_color_pair("GW"), "WG");
        assert_eq!(normalize_color_pair("Mono-Red"), "");
        assert_eq!(normalize_color_pair("Abzan (WBG)"), "WBG");
    }

    #[test]
    fn test_guild_name() {
        assert_eq!(guild_name("UW"), Some("Azorius"));
        assert_eq!(guild_name("BG"), Some("Golgari"));
        assert_eq!(guild_name("WUB"), None);
    }

    #[test]
    fn test_color_pairs_are_canonical() {
        for pair in COLOR_PAIRS {
            assert_eq!(canonical_colors(pair), pair);
        }
    }
}
