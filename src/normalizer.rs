//! Normalizer - patterns → canonical fingerprints
//!
//! A fingerprint is plain string composition of `type`, `intent`, the
//! bucketed field count and `context`. No hashing, no case folding: callers
//! are expected to hand over canonical strings.

use crate::scanner::{Pattern, PatternType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse bucket for the number of inputs in a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldCountRange {
    /// 1 to 3 fields
    #[serde(rename = "1-3")]
    Few,
    /// 4 to 6 fields
    #[serde(rename = "4-6")]
    Several,
    /// 7 or more fields
    #[serde(rename = "7+")]
    Many,
}

impl FieldCountRange {
    /// Bucket a field count. Zero lands in the lowest bucket.
    pub fn from_count(count: usize) -> Self {
        match count {
            0..=3 => Self::Few,
            4..=6 => Self::Several,
            _ => Self::Many,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Few => "1-3",
            Self::Several => "4-6",
            Self::Many => "7+",
        }
    }
}

impl fmt::Display for FieldCountRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bucket label for a field count (`"1-3"`, `"4-6"` or `"7+"`)
pub fn field_count_range(count: usize) -> &'static str {
    FieldCountRange::from_count(count).as_str()
}

/// Derived, immutable view of a pattern used for grouping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedPattern {
    /// Id of the source pattern
    pub pattern_id: String,
    pub fingerprint: String,
    #[serde(rename = "type")]
    pub pattern_type: PatternType,
    pub field_count_range: FieldCountRange,
    pub behavior: String,
    pub intent: String,
    pub context: String,
}

impl NormalizedPattern {
    /// Compose the grouping key `{type}-{intent}-{fieldCountRange}-{context}`
    pub fn fingerprint_of(
        pattern_type: PatternType,
        intent: &str,
        range: FieldCountRange,
        context: &str,
    ) -> String {
        format!("{}-{}-{}-{}", pattern_type, intent, range, context)
    }
}

/// Normalize a single pattern
pub fn normalize_pattern(pattern: &Pattern) -> NormalizedPattern {
    let range = FieldCountRange::from_count(pattern.inputs().len());

    NormalizedPattern {
        pattern_id: pattern.id().to_string(),
        fingerprint: NormalizedPattern::fingerprint_of(
            pattern.pattern_type(),
            pattern.intent(),
            range,
            pattern.context(),
        ),
        pattern_type: pattern.pattern_type(),
        field_count_range: range,
        behavior: pattern.behavior().to_string(),
        intent: pattern.intent().to_string(),
        context: pattern.context().to_string(),
    }
}

/// Normalize every pattern, preserving order
pub fn normalize_patterns(patterns: &[Pattern]) -> Vec<NormalizedPattern> {
    patterns.iter().map(normalize_pattern).collect()
}
