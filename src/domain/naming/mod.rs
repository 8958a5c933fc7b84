//! File-name composition and best-effort reverse parsing.
//!
//! Everything here is synchronous and infallible: malformed input degrades to
//! an empty name, an unmatched segment or a missing field, never to an error.

pub mod batch;
pub mod compose;
pub mod matcher;
pub mod parser;
pub mod selection;

pub use batch::{generate, plan, GeneratedBatch, NothingToGenerate};
pub use compose::compose;
pub use matcher::{match_option, MatchResult};
pub use parser::{parse, Alignment, ParsedName};
pub use selection::{Selection, SelectionValue, SelectionValues, Selections};
