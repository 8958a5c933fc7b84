//! Reverse lookup from a rendered segment to the canonical option it came from.

use crate::domain::schema::{replace_whitespace_runs, CaseTransform};
use serde::Serialize;

/// Outcome of resolving one segment.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum MatchResult {
    /// Canonical option, case preserved as declared.
    Matched(String),
    /// No option fits; the raw segment is a custom value.
    Unmatched(String),
    /// Free-text field, taken as-is without matching.
    Verbatim(String),
}

impl MatchResult {
    pub fn value(&self) -> &str {
        match self {
            MatchResult::Matched(v) | MatchResult::Unmatched(v) | MatchResult::Verbatim(v) => v,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, MatchResult::Matched(_))
    }

    pub fn into_value(self) -> String {
        match self {
            MatchResult::Matched(v) | MatchResult::Unmatched(v) | MatchResult::Verbatim(v) => v,
        }
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Finds the option `segment` was rendered from.
///
/// Three passes over `options` in declared order, first hit wins:
/// plain comparison, comparison after the case transform, and comparison after
/// whitespace runs were replaced by `separator` (with and without the case
/// transform). All comparisons are trimmed and case-insensitive.
pub fn match_option(
    segment: &str,
    options: &[String],
    case_transform: CaseTransform,
    separator: &str,
) -> MatchResult {
    let target = normalize(segment);
    let hits = |candidate: &str| normalize(candidate) == target;

    let found = options
        .iter()
        .find(|option| hits(option))
        .or_else(|| {
            options
                .iter()
                .find(|option| hits(&case_transform.apply(option)))
        })
        .or_else(|| {
            options.iter().find(|option| {
                let joined = replace_whitespace_runs(option.trim(), separator);
                hits(&joined) || hits(&case_transform.apply(&joined))
            })
        });

    match found {
        Some(option) => MatchResult::Matched(option.clone()),
        None => MatchResult::Unmatched(segment.to_string()),
    }
}
