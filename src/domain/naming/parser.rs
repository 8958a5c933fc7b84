//! Positional reconstruction of field values from a rendered file name.
//!
//! Segments carry no field markers and values are not escaped, so a dropped
//! field, a value containing the separator, or a schema edited after the name
//! was generated shifts every later position. The parser keeps that
//! positional behaviour and reports the segment-count mismatch through
//! [`Alignment`] instead of guessing.

use crate::domain::naming::matcher::{match_option, MatchResult};
use crate::domain::record::Metadata;
use crate::domain::schema::{Schema, VariableKind};
use serde::Serialize;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Alignment {
    /// One segment per variable.
    Exact,
    /// Fewer segments than variables; trailing variables got nothing.
    Fewer { missing: usize },
    /// More segments than variables; the surplus was ignored.
    More { surplus: usize },
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub segments: Vec<String>,
    /// Resolved fields in schema order; variables without a segment are absent.
    pub fields: Vec<(String, MatchResult)>,
    pub alignment: Alignment,
}

impl ParsedName {
    pub fn get(&self, variable_id: &str) -> Option<&MatchResult> {
        self.fields
            .iter()
            .find(|(id, _)| id == variable_id)
            .map(|(_, result)| result)
    }

    pub fn metadata(&self) -> Metadata {
        self.fields
            .iter()
            .map(|(id, result)| (id.clone(), result.value().to_string()))
            .collect()
    }
}

fn split_segments(file_name: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return vec![file_name.to_string()];
    }
    file_name.split(separator).map(str::to_string).collect()
}

/// Maps the i-th segment of `file_name` onto the i-th schema variable.
pub fn parse(file_name: &str, schema: &Schema) -> ParsedName {
    let segments = split_segments(file_name, &schema.separator);

    let fields = schema
        .variables
        .iter()
        .zip(segments.iter())
        .filter(|(_, segment)| !segment.is_empty())
        .map(|(variable, segment)| {
            let result = match variable.kind {
                VariableKind::FreeText => MatchResult::Verbatim(segment.clone()),
                VariableKind::SingleSelect | VariableKind::MultiSelect => match_option(
                    segment,
                    &variable.options,
                    schema.case_transform,
                    &schema.separator,
                ),
            };
            (variable.id.clone(), result)
        })
        .collect();

    let expected = schema.variables.len();
    let alignment = match segments.len() {
        n if n == expected => Alignment::Exact,
        n if n < expected => Alignment::Fewer {
            missing: expected - n,
        },
        n => Alignment::More {
            surplus: n - expected,
        },
    };

    ParsedName {
        segments,
        fields,
        alignment,
    }
}
