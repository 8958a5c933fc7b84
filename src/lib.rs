pub mod app;
pub mod crypto;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::errors::ServiceError;
pub use app::naming_service::{NamingService, Owner};
pub use domain::naming::{compose, generate, match_option, parse, MatchResult, Selection, Selections};
pub use domain::record::{GeneratedRecord, Metadata};
pub use domain::schema::{CaseTransform, Schema, VariableDefinition, VariableKind};
pub use domain::usage::{aggregate, VariableUsageStats};
pub use storage::kv::{KvStore, MemoryKvStore, PostgresKvStore};
