use crate::domain::naming::selection::{Selection, Selections};
use crate::domain::schema::{replace_whitespace_runs, Schema, VariableDefinition, VariableKind};

/// Renders a file name from `selections`, in schema order.
///
/// Fields that contribute nothing are skipped without leaving an empty segment.
/// An empty return value means there was nothing to generate.
pub fn compose(schema: &Schema, selections: &Selections) -> String {
    let segments: Vec<String> = schema
        .variables
        .iter()
        .filter_map(|variable| contributing_value(variable, selections.get(&variable.id)?))
        .map(|value| replace_whitespace_runs(value.trim(), &schema.separator))
        .filter(|segment| !segment.is_empty())
        .collect();

    if segments.is_empty() {
        return String::new();
    }

    segments
        .iter()
        .map(|segment| schema.case_transform.apply(segment))
        .collect::<Vec<_>>()
        .join(&schema.separator)
}

/// Only the first multi-select value is rendered; fan-out is the batch planner's job.
fn contributing_value<'a>(variable: &VariableDefinition, selection: &'a Selection) -> Option<&'a str> {
    match (variable.kind, selection) {
        (VariableKind::MultiSelect, Selection::Many(values)) => values.first().map(String::as_str),
        (VariableKind::SingleSelect, Selection::Selected(value))
        | (VariableKind::SingleSelect, Selection::FreeEntry(value))
        | (VariableKind::FreeText, Selection::Selected(value))
        | (VariableKind::FreeText, Selection::FreeEntry(value)) => Some(value.as_str()),
        _ => None,
    }
}
