use crate::domain::naming::{match_option, parse, MatchResult};
use crate::domain::record::{GeneratedRecord, Metadata};
use crate::domain::schema::{Schema, VariableDefinition, VariableKind, FREE_ENTRY_SENTINEL};
use crate::domain::usage::stats::VariableUsageStats;

fn has_value(metadata: &Metadata, id: &str) -> bool {
    metadata.get(id).is_some_and(|v| !v.trim().is_empty())
}

/// Metadata to aggregate for `record`.
///
/// Stored metadata is used as-is when every schema variable has a non-empty
/// value. Otherwise the file name is parsed and the stored non-empty values
/// are laid over the parsed ones.
pub fn effective_metadata(schema: &Schema, record: &GeneratedRecord) -> Metadata {
    let complete = schema
        .variables
        .iter()
        .all(|variable| has_value(&record.metadata, &variable.id));
    if complete {
        return record.metadata.clone();
    }

    let mut merged = parse(&record.file_name, schema).metadata();
    for (id, value) in &record.metadata {
        if !value.trim().is_empty() {
            merged.insert(id.clone(), value.clone());
        }
    }
    merged
}

fn tally_option(schema: &Schema, variable: &VariableDefinition, stats: &mut VariableUsageStats, value: &str) {
    match match_option(value, &variable.options, schema.case_transform, &schema.separator) {
        MatchResult::Matched(option) => stats.record(&option, false),
        other => stats.record(other.value(), true),
    }
}

/// Folds `records` into per-variable usage, busiest variable first.
///
/// Variables nobody used are left out. Ties keep schema order.
pub fn aggregate(schema: &Schema, records: &[GeneratedRecord]) -> Vec<VariableUsageStats> {
    let mut stats: Vec<VariableUsageStats> = schema
        .variables
        .iter()
        .map(VariableUsageStats::new)
        .collect();

    for record in records {
        let metadata = effective_metadata(schema, record);
        for (variable, variable_stats) in schema.variables.iter().zip(stats.iter_mut()) {
            // Only multi-select pieces are trimmed; other values are counted as stored.
            let Some(value) = metadata.get(&variable.id).map(String::as_str) else {
                continue;
            };
            if value.trim().is_empty() {
                continue;
            }

            match variable.kind {
                VariableKind::MultiSelect => {
                    for piece in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                        tally_option(schema, variable, variable_stats, piece);
                    }
                }
                VariableKind::SingleSelect => {
                    if value.trim() == FREE_ENTRY_SENTINEL {
                        continue;
                    }
                    tally_option(schema, variable, variable_stats, value);
                }
                VariableKind::FreeText => variable_stats.record(value, true),
            }
        }
    }

    stats.retain(|s| s.total_usage > 0);
    stats.sort_by(|a, b| b.total_usage.cmp(&a.total_usage));
    stats
}
