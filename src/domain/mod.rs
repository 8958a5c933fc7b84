//! Naming domain: schema, composition, parsing, history and usage statistics.

pub mod naming;
pub mod record;
pub mod schema;
pub mod usage;
