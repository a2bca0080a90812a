//! Habitat features a water creature can have.
//!
//! Every feature enum is spelled in data files as an uppercase token
//! (`SALT`, `CORAL_REEF`, ...). Creature files may use any case; the tokens
//! are uppercased before matching.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A closed set of habitat values addressed by uppercase tokens
pub trait Feature: Copy + PartialEq + 'static {
    /// Every member, in declaration order
    const ALL: &'static [Self];

    /// Human-readable name used in log messages
    const LABEL: &'static str;

    /// The uppercase token used in data files
    fn token(self) -> &'static str;

    /// Exact token lookup (no case folding)
    fn from_token(token: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|member| member.token() == token)
    }
}

/// Parse a list of raw strings into features, dropping unknown tokens.
///
/// Tokens are uppercased before lookup. Invalid tokens are logged and
/// skipped; duplicates are collapsed, keeping the first occurrence.
pub fn parse_feature_list<T: Feature>(values: &[String]) -> Vec<T> {
    let mut parsed: Vec<T> = Vec::with_capacity(values.len());
    for value in values {
        match T::from_token(&value.to_uppercase()) {
            Some(member) => {
                if !parsed.contains(&member) {
                    parsed.push(member);
                }
            }
            None => tracing::warn!("Invalid {} {}", T::LABEL, value),
        }
    }
    parsed
}

// ============================================================================
// Water
// ============================================================================

/// Primary water type
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WaterType {
    Salt,
    Fresh,
}

impl Feature for WaterType {
    const ALL: &'static [Self] = &[WaterType::Salt, WaterType::Fresh];
    const LABEL: &'static str = "water type";

    fn token(self) -> &'static str {
        match self {
            WaterType::Salt => "SALT",
            WaterType::Fresh => "FRESH",
        }
    }
}

/// Specific aquatic environment
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WaterSubtype {
    Deepsea,
    Coast,
    OpenOcean,
    CoralReef,
    Lake,
    River,
    KelpForest,
}

impl WaterSubtype {
    /// Phrase used when describing where a creature lives
    pub fn habitat_phrase(self) -> &'static str {
        match self {
            WaterSubtype::Deepsea => "deep sea areas",
            WaterSubtype::Coast => "coastal waters",
            WaterSubtype::OpenOcean => "the open ocean",
            WaterSubtype::CoralReef => "coral reefs",
            WaterSubtype::Lake => "lakes",
            WaterSubtype::River => "rivers",
            WaterSubtype::KelpForest => "kelp forests",
        }
    }
}

impl Feature for WaterSubtype {
    const ALL: &'static [Self] = &[
        WaterSubtype::Deepsea,
        WaterSubtype::Coast,
        WaterSubtype::OpenOcean,
        WaterSubtype::CoralReef,
        WaterSubtype::Lake,
        WaterSubtype::River,
        WaterSubtype::KelpForest,
    ];
    const LABEL: &'static str = "water subtype";

    fn token(self) -> &'static str {
        match self {
            WaterSubtype::Deepsea => "DEEPSEA",
            WaterSubtype::Coast => "COAST",
            WaterSubtype::OpenOcean => "OPEN_OCEAN",
            WaterSubtype::CoralReef => "CORAL_REEF",
            WaterSubtype::Lake => "LAKE",
            WaterSubtype::River => "RIVER",
            WaterSubtype::KelpForest => "KELP_FOREST",
        }
    }
}

/// Water temperature band
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WaterTemperature {
    Cold,
    Medium,
    Warm,
}

impl Feature for WaterTemperature {
    const ALL: &'static [Self] = &[
        WaterTemperature::Cold,
        WaterTemperature::Medium,
        WaterTemperature::Warm,
    ];
    const LABEL: &'static str = "water temperature";

    fn token(self) -> &'static str {
        match self {
            WaterTemperature::Cold => "COLD",
            WaterTemperature::Medium => "MEDIUM",
            WaterTemperature::Warm => "WARM",
        }
    }
}

// ============================================================================
// Size
// ============================================================================

/// Size class derived from a creature's average length
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SizeCategory {
    Small,
    Medium,
    Big,
    Undefined,
}

impl SizeCategory {
    /// Adjective used in the journal ("making it a small fish")
    pub fn descriptive_word(self) -> &'static str {
        match self {
            SizeCategory::Small => "small",
            SizeCategory::Medium => "medium sized",
            SizeCategory::Big => "big",
            SizeCategory::Undefined => "",
        }
    }
}

impl Feature for SizeCategory {
    const ALL: &'static [Self] = &[
        SizeCategory::Small,
        SizeCategory::Medium,
        SizeCategory::Big,
        SizeCategory::Undefined,
    ];
    const LABEL: &'static str = "size category";

    fn token(self) -> &'static str {
        match self {
            SizeCategory::Small => "SMALL",
            SizeCategory::Medium => "MEDIUM",
            SizeCategory::Big => "BIG",
            SizeCategory::Undefined => "UNDEFINED",
        }
    }
}

/// Length range of a creature in centimetres.
///
/// A zero on either bound marks the size as undefined and forces both
/// bounds to zero.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CreatureSize {
    range_start: u32,
    range_end: u32,
}

impl CreatureSize {
    pub fn new(range_start: u32, range_end: u32) -> Self {
        if range_start == 0 || range_end == 0 {
            Self::default()
        } else {
            Self {
                range_start,
                range_end,
            }
        }
    }

    pub fn range_start(&self) -> u32 {
        self.range_start
    }

    pub fn range_end(&self) -> u32 {
        self.range_end
    }

    /// Floor of the mean of both bounds
    pub fn average(&self) -> u32 {
        ((u64::from(self.range_start) + u64::from(self.range_end)) / 2) as u32
    }

    pub fn category(&self) -> SizeCategory {
        match self.average() {
            0 => SizeCategory::Undefined,
            1..=29 => SizeCategory::Small,
            30..=99 => SizeCategory::Medium,
            _ => SizeCategory::Big,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.category() != SizeCategory::Undefined
    }
}

macro_rules! display_as_token {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.token())
            }
        })*
    };
}

display_as_token!(WaterType, WaterSubtype, WaterTemperature, SizeCategory);

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_zero_bound_forces_undefined() {
        for (a, b) in [(0, 0), (0, 50), (120, 0)] {
            let size = CreatureSize::new(a, b);
            assert_eq!(size.range_start(), 0);
            assert_eq!(size.range_end(), 0);
            assert_eq!(size.category(), SizeCategory::Undefined);
            assert!(!size.is_valid());
        }
    }

    #[test]
    fn test_category_boundaries() {
        assert_eq!(CreatureSize::new(1, 1).category(), SizeCategory::Small);
        assert_eq!(CreatureSize::new(29, 29).category(), SizeCategory::Small);
        assert_eq!(CreatureSize::new(29, 30).category(), SizeCategory::Small); // avg 29
        assert_eq!(CreatureSize::new(30, 30).category(), SizeCategory::Medium);
        assert_eq!(CreatureSize::new(99, 99).category(), SizeCategory::Medium);
        assert_eq!(CreatureSize::new(99, 100).category(), SizeCategory::Medium); // avg 99
        assert_eq!(CreatureSize::new(100, 100).category(), SizeCategory::Big);
        assert_eq!(CreatureSize::new(300, 600).category(), SizeCategory::Big);
    }

    #[test]
    fn test_average_is_floored() {
        assert_eq!(CreatureSize::new(1, 2).average(), 1);
        assert_eq!(CreatureSize::new(10, 25).average(), 17);
        assert_eq!(CreatureSize::new(u32::MAX, u32::MAX).average(), u32::MAX);
    }

    #[test]
    fn test_parse_list_drops_invalid_tokens() {
        let parsed: Vec<WaterType> = parse_feature_list(&strings(&["salt", "brackish", "FRESH"]));
        assert_eq!(parsed, vec![WaterType::Salt, WaterType::Fresh]);
    }

    #[test]
    fn test_parse_list_collapses_duplicates() {
        let parsed: Vec<WaterTemperature> =
            parse_feature_list(&strings(&["cold", "COLD", "Warm"]));
        assert_eq!(parsed, vec![WaterTemperature::Cold, WaterTemperature::Warm]);
    }

    #[test]
    fn test_from_token_is_exact() {
        assert_eq!(
            WaterSubtype::from_token("KELP_FOREST"),
            Some(WaterSubtype::KelpForest)
        );
        assert_eq!(WaterSubtype::from_token("kelp_forest"), None);
        assert_eq!(SizeCategory::from_token("HUGE"), None);
    }

    #[test]
    fn test_tokens_match_serde_names() {
        for subtype in WaterSubtype::ALL {
            let json = serde_json::to_string(subtype).unwrap();
            assert_eq!(json, format!("\"{}\"", subtype.token()));
        }
    }
}
