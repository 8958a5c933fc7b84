//! Usage statistics over generated-name history.

pub mod aggregate;
pub mod stats;

pub use aggregate::{aggregate, effective_metadata};
pub use stats::{OptionCount, VariableUsageStats};
