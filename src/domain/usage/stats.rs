use crate::domain::schema::{VariableDefinition, VariableKind};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct OptionCount {
    pub value: String,
    pub count: u64,
}

/// Per-variable usage, derived on demand and never stored.
///
/// `counts` keeps values in the order they were first observed; that order is
/// the tie-break for [`most_used`](Self::most_used) and
/// [`least_used`](Self::least_used).
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VariableUsageStats {
    pub variable_id: String,
    pub label: String,
    pub kind: VariableKind,
    pub counts: Vec<OptionCount>,
    pub total_usage: u64,
    pub custom_values: BTreeSet<String>,
}

impl VariableUsageStats {
    pub fn new(variable: &VariableDefinition) -> Self {
        Self {
            variable_id: variable.id.clone(),
            label: variable.label.clone(),
            kind: variable.kind,
            counts: Vec::new(),
            total_usage: 0,
            custom_values: BTreeSet::new(),
        }
    }

    /// Counts one contributing piece.
    pub fn record(&mut self, value: &str, custom: bool) {
        if custom {
            self.custom_values.insert(value.to_string());
        }
        match self.counts.iter_mut().find(|c| c.value == value) {
            Some(entry) => entry.count += 1,
            None => self.counts.push(OptionCount {
                value: value.to_string(),
                count: 1,
            }),
        }
        self.total_usage += 1;
    }

    pub fn count_of(&self, value: &str) -> u64 {
        self.counts
            .iter()
            .find(|c| c.value == value)
            .map_or(0, |c| c.count)
    }

    pub fn is_custom(&self, value: &str) -> bool {
        self.custom_values.contains(value)
    }

    pub fn most_used(&self) -> Option<&OptionCount> {
        self.counts.iter().fold(None, |best, candidate| match best {
            Some(b) if b.count >= candidate.count => Some(b),
            _ => Some(candidate),
        })
    }

    pub fn least_used(&self) -> Option<&OptionCount> {
        self.counts.iter().fold(None, |best, candidate| match best {
            Some(b) if b.count <= candidate.count => Some(b),
            _ => Some(candidate),
        })
    }

    /// Share of total usage in percent, rounded to one decimal place.
    pub fn share_percent(&self, value: &str) -> Option<f64> {
        if self.total_usage == 0 {
            return None;
        }
        let count = self.counts.iter().find(|c| c.value == value)?.count;
        let percent = count as f64 / self.total_usage as f64 * 100.0;
        Some((percent * 10.0).round() / 10.0)
    }
}
