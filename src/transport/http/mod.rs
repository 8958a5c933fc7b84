pub mod router;
pub mod types;
pub mod handlers {
    pub mod common;
    pub mod config;
    pub mod generate;
    pub mod health;
    pub mod keys;
    pub mod names;
    pub mod report;
    pub mod seed;
}

pub use router::{create_router, ApiDoc};
pub use types::AppState;
