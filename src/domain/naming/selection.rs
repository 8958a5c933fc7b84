//! Per-field selections, as sent by clients and as consumed by the composer.

use crate::domain::record::Metadata;
use crate::domain::schema::{Schema, VariableKind, FREE_ENTRY_SENTINEL};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Wire payload for one field: a string, or an array for multi-selects.
///
/// Anything else (null, numbers, mixed arrays) lands in `Other` and is
/// ignored when decoding, so one bad field does not reject the request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum SelectionValue {
    Single(String),
    Multi(Vec<String>),
    Other(serde_json::Value),
}

/// Wire map from variable id (or `"{id}_free"` companion slot) to its payload.
pub type SelectionValues = HashMap<String, SelectionValue>;

/// What a field contributes, resolved against the variable's kind.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Unset,
    /// A canonical option, or the text of a free-text field.
    Selected(String),
    /// Text typed into a single-select's free-entry slot.
    FreeEntry(String),
    /// Multi-select values in selection order.
    Many(Vec<String>),
}

impl Selection {
    /// Raw value stored in record metadata; multi-select values are comma-joined.
    pub fn metadata_value(&self) -> String {
        match self {
            Selection::Unset => String::new(),
            Selection::Selected(v) | Selection::FreeEntry(v) => v.clone(),
            Selection::Many(values) => values.join(","),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selections {
    by_id: HashMap<String, Selection>,
}

impl Selections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: impl Into<String>, selection: Selection) -> Self {
        self.set(id, selection);
        self
    }

    pub fn set(&mut self, id: impl Into<String>, selection: Selection) {
        self.by_id.insert(id.into(), selection);
    }

    pub fn get(&self, id: &str) -> Option<&Selection> {
        self.by_id.get(id)
    }

    /// Decodes client values against `schema`.
    ///
    /// Shapes that do not fit the variable kind are dropped. A single-select set
    /// to the free-entry sentinel takes its text from the `"{id}_free"` slot and
    /// stays unset when that slot is missing or not a string.
    pub fn from_wire(schema: &Schema, values: &SelectionValues) -> Self {
        let mut selections = Self::new();
        for variable in &schema.variables {
            let selection = match (variable.kind, values.get(&variable.id)) {
                (VariableKind::MultiSelect, Some(SelectionValue::Multi(list))) => {
                    Selection::Many(list.clone())
                }
                (VariableKind::FreeText, Some(SelectionValue::Single(text))) => {
                    Selection::Selected(text.clone())
                }
                (VariableKind::SingleSelect, Some(SelectionValue::Single(value)))
                    if value == FREE_ENTRY_SENTINEL =>
                {
                    match values.get(&variable.free_entry_key()) {
                        Some(SelectionValue::Single(text)) => Selection::FreeEntry(text.clone()),
                        _ => Selection::Unset,
                    }
                }
                (VariableKind::SingleSelect, Some(SelectionValue::Single(value))) => {
                    Selection::Selected(value.clone())
                }
                _ => Selection::Unset,
            };
            if selection != Selection::Unset {
                selections.set(variable.id.clone(), selection);
            }
        }
        selections
    }

    /// Rebuilds selections from stored record metadata.
    pub fn from_metadata(schema: &Schema, metadata: &Metadata) -> Self {
        let mut selections = Self::new();
        for variable in &schema.variables {
            let Some(value) = metadata.get(&variable.id) else {
                continue;
            };
            let selection = match variable.kind {
                VariableKind::MultiSelect => Selection::Many(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|piece| !piece.is_empty())
                        .map(str::to_string)
                        .collect(),
                ),
                VariableKind::SingleSelect if value == FREE_ENTRY_SENTINEL => Selection::Unset,
                _ if value.trim().is_empty() => Selection::Unset,
                _ => Selection::Selected(value.clone()),
            };
            selections.set(variable.id.clone(), selection);
        }
        selections
    }

    /// Metadata snapshot with one entry per schema variable (empty when unset).
    pub fn to_metadata(&self, schema: &Schema) -> Metadata {
        schema
            .variables
            .iter()
            .map(|variable| {
                let value = self
                    .get(&variable.id)
                    .map(Selection::metadata_value)
                    .unwrap_or_default();
                (variable.id.clone(), value)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::VariableDefinition;

    fn schema() -> Schema {
        Schema {
            variables: vec![
                VariableDefinition::new("hook", "Hook", VariableKind::SingleSelect)
                    .with_options(["Problem", "Story"])
                    .with_free_entry(),
                VariableDefinition::new("arch", "Archetype", VariableKind::MultiSelect)
                    .with_options(["Hero", "Sage"]),
                VariableDefinition::new("note", "Note", VariableKind::FreeText),
            ],
            ..Schema::default()
        }
    }

    fn wire(raw: serde_json::Value) -> SelectionValues {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn sentinel_resolves_to_free_entry() {
        let values = wire(serde_json::json!({
            "hook": "{free_input}",
            "hook_free": "Hello World",
            "arch": ["Hero", "Sage"],
            "note": "launch"
        }));
        let selections = Selections::from_wire(&schema(), &values);
        assert_eq!(
            selections.get("hook"),
            Some(&Selection::FreeEntry("Hello World".into()))
        );
        assert_eq!(
            selections.get("arch"),
            Some(&Selection::Many(vec!["Hero".into(), "Sage".into()]))
        );
        assert_eq!(selections.get("note"), Some(&Selection::Selected("launch".into())));
    }

    #[test]
    fn sentinel_without_companion_stays_unset() {
        let values = wire(serde_json::json!({ "hook": "{free_input}" }));
        let selections = Selections::from_wire(&schema(), &values);
        assert_eq!(selections.get("hook"), None);
    }

    #[test]
    fn mismatched_shapes_are_dropped() {
        let values = wire(serde_json::json!({ "hook": ["Story"], "arch": "Hero" }));
        let selections = Selections::from_wire(&schema(), &values);
        assert_eq!(selections, Selections::new());
    }

    #[test]
    fn malformed_fields_are_skipped() {
        let values = wire(serde_json::json!({
            "hook": "Story",
            "arch": null,
            "note": 5,
            "unknown": ["Hero", 3]
        }));
        assert_eq!(values.get("note"), Some(&SelectionValue::Other(serde_json::json!(5))));

        let selections = Selections::from_wire(&schema(), &values);
        assert_eq!(selections, Selections::new().with("hook", Selection::Selected("Story".into())));
        assert_eq!(crate::domain::naming::compose(&schema(), &selections), "Story");
    }

    #[test]
    fn free_entry_companion_must_be_text() {
        let values = wire(serde_json::json!({ "hook": "{free_input}", "hook_free": 12 }));
        assert_eq!(Selections::from_wire(&schema(), &values).get("hook"), None);
    }

    #[test]
    fn metadata_has_every_variable() {
        let selections = Selections::new()
            .with("hook", Selection::FreeEntry("custom hook".into()))
            .with("arch", Selection::Many(vec!["Hero".into(), "Sage".into()]));
        let metadata = selections.to_metadata(&schema());
        assert_eq!(metadata["hook"], "custom hook");
        assert_eq!(metadata["arch"], "Hero,Sage");
        assert_eq!(metadata["note"], "");

        let back = Selections::from_metadata(&schema(), &metadata);
        assert_eq!(
            back.get("arch"),
            Some(&Selection::Many(vec!["Hero".into(), "Sage".into()]))
        );
        assert_eq!(back.get("note"), Some(&Selection::Unset));
    }
}
