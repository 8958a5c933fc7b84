//! Variable schema ("config") shared by the composer, parser and aggregator.
//!
//! Field names on the wire are the ones the stored configs have always used
//! (`type`, `values`, `allowFreeInput`, `caseTransform`), so existing JSON keeps
//! deserializing unchanged.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

pub mod seed;

pub use seed::example_schema;

/// Reserved option value that marks a single-select as "value comes from the free slot".
///
/// Only meaningful at the wire boundary and in legacy history; the typed
/// selection model uses `Selection::FreeEntry` instead.
pub const FREE_ENTRY_SENTINEL: &str = "{free_input}";

/// Suffix of the companion slot that carries free-entry text (`"{id}_free"`).
pub const FREE_ENTRY_SUFFIX: &str = "_free";

/// How a variable takes its value.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    #[serde(rename = "dropdown", alias = "single-select")]
    SingleSelect,
    #[serde(rename = "multiselect", alias = "multi-select")]
    MultiSelect,
    #[serde(rename = "input", alias = "free-text")]
    FreeText,
}

/// Case policy applied to every composed segment.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CaseTransform {
    Uppercase,
    Lowercase,
    #[default]
    None,
}

impl CaseTransform {
    pub fn apply(self, value: &str) -> String {
        match self {
            CaseTransform::Uppercase => value.to_uppercase(),
            CaseTransform::Lowercase => value.to_lowercase(),
            CaseTransform::None => value.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VariableDefinition {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: VariableKind,
    #[serde(rename = "values", alias = "options", default)]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_descriptions: Option<BTreeMap<String, String>>,
    #[serde(
        rename = "allowFreeInput",
        alias = "allowFreeEntry",
        default,
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub allow_free_entry: bool,
}

impl VariableDefinition {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: VariableKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            options: Vec::new(),
            description: None,
            option_descriptions: None,
            allow_free_entry: false,
        }
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_free_entry(mut self) -> Self {
        self.allow_free_entry = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Key of the companion free-entry slot in wire-level selection values.
    pub fn free_entry_key(&self) -> String {
        format!("{}{}", self.id, FREE_ENTRY_SUFFIX)
    }
}

/// The ordered variable list plus the rendering policy.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    pub variables: Vec<VariableDefinition>,
    #[serde(default)]
    pub case_transform: CaseTransform,
    #[serde(default = "default_separator")]
    pub separator: String,
    /// Editing gate for clients; no effect on naming.
    #[serde(default)]
    pub locked: bool,
}

fn default_separator() -> String {
    "_".to_string()
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            variables: Vec::new(),
            case_transform: CaseTransform::None,
            separator: default_separator(),
            locked: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("Separator must be a single non-whitespace character, got {0:?}")]
    InvalidSeparator(String),

    #[error("Variable at position {index} has an empty id")]
    EmptyId { index: usize },

    #[error("Duplicate variable id '{id}'")]
    DuplicateId { id: String },

    #[error("Variable '{id}' needs a label")]
    EmptyLabel { id: String },

    #[error("Variable '{id}' needs at least one option")]
    NoOptions { id: String },

    #[error("Free-text variable '{id}' cannot declare options")]
    UnexpectedOptions { id: String },

    #[error("Variable '{id}' has an empty option")]
    EmptyOption { id: String },

    #[error("Variable '{id}' has options '{first}' and '{second}' that render identically")]
    DuplicateOption {
        id: String,
        first: String,
        second: String,
    },

    #[error("Variable '{id}' uses the reserved value '{{free_input}}' as an option")]
    ReservedOption { id: String },
}

impl Schema {
    pub fn variable(&self, id: &str) -> Option<&VariableDefinition> {
        self.variables.iter().find(|v| v.id == id)
    }

    /// The variable that drives batch fan-out, if any.
    pub fn first_multi_select(&self) -> Option<&VariableDefinition> {
        self.variables
            .iter()
            .find(|v| v.kind == VariableKind::MultiSelect)
    }

    /// Renders an option the way the composer would emit it as a segment.
    pub fn render_option(&self, option: &str) -> String {
        self.case_transform
            .apply(&replace_whitespace_runs(option.trim(), &self.separator))
    }

    /// Checks the invariants a saved schema must hold.
    ///
    /// The composer and parser never call this; they degrade instead.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut sep_chars = self.separator.chars();
        match (sep_chars.next(), sep_chars.next()) {
            (Some(c), None) if !c.is_whitespace() => {}
            _ => return Err(SchemaError::InvalidSeparator(self.separator.clone())),
        }

        let mut seen_ids = HashSet::new();
        for (index, variable) in self.variables.iter().enumerate() {
            if variable.id.trim().is_empty() {
                return Err(SchemaError::EmptyId { index });
            }
            if !seen_ids.insert(variable.id.as_str()) {
                return Err(SchemaError::DuplicateId {
                    id: variable.id.clone(),
                });
            }
            if variable.label.trim().is_empty() {
                return Err(SchemaError::EmptyLabel {
                    id: variable.id.clone(),
                });
            }
            self.validate_options(variable)?;
        }
        Ok(())
    }

    fn validate_options(&self, variable: &VariableDefinition) -> Result<(), SchemaError> {
        match variable.kind {
            VariableKind::FreeText => {
                if !variable.options.is_empty() {
                    return Err(SchemaError::UnexpectedOptions {
                        id: variable.id.clone(),
                    });
                }
                return Ok(());
            }
            VariableKind::SingleSelect if variable.allow_free_entry => {}
            _ => {
                if variable.options.is_empty() {
                    return Err(SchemaError::NoOptions {
                        id: variable.id.clone(),
                    });
                }
            }
        }

        let mut rendered: Vec<(String, &str)> = Vec::with_capacity(variable.options.len());
        for option in &variable.options {
            if option == FREE_ENTRY_SENTINEL {
                return Err(SchemaError::ReservedOption {
                    id: variable.id.clone(),
                });
            }
            if option.trim().is_empty() {
                return Err(SchemaError::EmptyOption {
                    id: variable.id.clone(),
                });
            }
            let folded = self.render_option(option).to_lowercase();
            if let Some((_, first)) = rendered.iter().find(|(r, _)| *r == folded) {
                return Err(SchemaError::DuplicateOption {
                    id: variable.id.clone(),
                    first: first.to_string(),
                    second: option.clone(),
                });
            }
            rendered.push((folded, option));
        }
        Ok(())
    }
}

/// Replaces every run of whitespace in `value` with `separator`.
pub fn replace_whitespace_runs(value: &str, separator: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_run = false;
    for c in value.chars() {
        if c.is_whitespace() {
            if !in_run {
                out.push_str(separator);
                in_run = true;
            }
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}
