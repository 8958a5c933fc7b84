//! Multi-select fan-out: one generation action, one or more records.

use crate::domain::naming::compose::compose;
use crate::domain::naming::selection::{Selection, Selections};
use crate::domain::record::GeneratedRecord;
use crate::domain::schema::Schema;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Could not generate filename from provided values")]
pub struct NothingToGenerate;

/// Records from one generation action; they share `timestamp`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct GeneratedBatch {
    pub timestamp: i64,
    pub records: Vec<GeneratedRecord>,
}

impl GeneratedBatch {
    pub fn file_names(&self) -> Vec<String> {
        self.records.iter().map(|r| r.file_name.clone()).collect()
    }
}

/// Expands `selections` into one selection set per compose call.
///
/// The first multi-select variable of the schema drives the expansion: each of
/// its selected values gets its own set with every other field held fixed.
/// With no multi-select variable, or nothing selected in it, there is exactly
/// one set.
pub fn plan(schema: &Schema, selections: &Selections) -> Vec<Selections> {
    let Some(driver) = schema.first_multi_select() else {
        return vec![selections.clone()];
    };

    match selections.get(&driver.id) {
        Some(Selection::Many(values)) if !values.is_empty() => values
            .iter()
            .map(|value| {
                selections
                    .clone()
                    .with(driver.id.clone(), Selection::Many(vec![value.clone()]))
            })
            .collect(),
        _ => vec![selections.clone()],
    }
}

/// Composes every planned set; sets that render empty are skipped.
pub fn generate(
    schema: &Schema,
    selections: &Selections,
    timestamp: i64,
) -> Result<GeneratedBatch, NothingToGenerate> {
    let records: Vec<GeneratedRecord> = plan(schema, selections)
        .into_iter()
        .filter_map(|set| {
            let file_name = compose(schema, &set);
            if file_name.is_empty() {
                return None;
            }
            Some(GeneratedRecord::new(
                file_name,
                set.to_metadata(schema),
                timestamp,
            ))
        })
        .collect();

    if records.is_empty() {
        return Err(NothingToGenerate);
    }
    Ok(GeneratedBatch { timestamp, records })
}
