//! Checks the environment (and optionally a config file) before starting the server.

use adtax::infra::config;
use adtax::storage::kv::{KvStore, MemoryKvStore, PostgresKvStore};
use adtax::Schema;
use std::sync::Arc;

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight -- [--schema <config.json>]\n\
         \n\
         Reads env vars (all optional):\n\
           DATABASE_URL, BIND_ADDR, SEED_KEY, API_KEY_TTL_SECS\n\
         With --schema, validates a config file in the stored JSON shape.\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }
    let schema_path = match args.iter().position(|a| a == "--schema") {
        Some(i) => match args.get(i + 1) {
            Some(path) => Some(path.clone()),
            None => usage_and_exit(),
        },
        None => None,
    };

    let database_url = config::database_url();
    println!("> Preflight:");
    println!("  BIND_ADDR={}", config::bind_addr());
    println!(
        "  DATABASE_URL={}",
        if database_url.is_some() { "<set>" } else { "<unset: in-memory store>" }
    );
    println!("  API_KEY_TTL_SECS={}", config::api_key_ttl().as_secs());
    if config::seed_key() == "seed-me" {
        println!("  SEED_KEY uses the default value; set SEED_KEY before exposing /api/seed");
    }

    let store: Arc<dyn KvStore> = match database_url {
        Some(url) => Arc::new(PostgresKvStore::connect(&url).await?),
        None => Arc::new(MemoryKvStore::new()),
    };
    store.ping().await?;
    println!("> Store reachable.");

    if let Some(path) = schema_path {
        let raw = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path, e))?;
        let schema: Schema = serde_json::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("{} is not a config document: {}", path, e))?;
        schema.validate()?;
        println!(
            "> {}: {} variables, separator {:?}, case {:?} - OK",
            path,
            schema.variables.len(),
            schema.separator,
            schema.case_transform
        );
    }

    println!("> Preflight OK.");
    Ok(())
}
