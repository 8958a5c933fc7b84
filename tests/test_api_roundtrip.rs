//! End-to-end flow against an in-process server backed by the in-memory store:
//! 1) Save a config for a session and generate names (with multi-select fan-out).
//! 2) Read, parse, trim and migrate history; build the usage report.
//! 3) Create an API key, sync the session config to it and generate with the key.
//! 4) Revoke the key and seed the example config.

use adtax::infra::config::ServiceConfig;
use adtax::transport::http::{create_router, AppState};
use adtax::{MemoryKvStore, NamingService};
use serde_json::{json, Value};
use std::sync::Arc;

const SESSION: &str = "session-e2e";

async fn spawn_server() -> Result<String, Box<dyn std::error::Error>> {
    let service = NamingService::new(Arc::new(MemoryKvStore::new()), ServiceConfig::default());
    let router = create_router(AppState {
        service: Arc::new(service),
    });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    Ok(format!("http://{}", addr))
}

fn config() -> Value {
    json!({
        "variables": [
            {"id": "size", "label": "Size", "type": "dropdown", "values": ["1080x1080", "1920x1080"]},
            {"id": "arch", "label": "Archetype", "type": "multiselect", "values": ["Hero", "Sage"]},
            {"id": "hook", "label": "Hook", "type": "dropdown", "values": ["Problem"], "allowFreeInput": true}
        ],
        "caseTransform": "lowercase",
        "separator": "_",
        "locked": false
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_session_and_api_key_flow() -> Result<(), Box<dyn std::error::Error>> {
    let base = spawn_server().await?;
    let client = reqwest::Client::new();

    let health = client.get(format!("{}/health", base)).send().await?;
    assert_eq!(health.status(), 200);

    // --- Config ---
    let anonymous = client
        .get(format!("{}/api/config", base))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(anonymous["value"], Value::Null);

    let no_session = client
        .post(format!("{}/api/config", base))
        .json(&json!({ "value": config() }))
        .send()
        .await?;
    assert_eq!(no_session.status(), 400);
    assert_eq!(no_session.json::<Value>().await?["code"], "SESSION_REQUIRED");

    let mut bad = config();
    bad["separator"] = json!("  ");
    let invalid = client
        .post(format!("{}/api/config", base))
        .header("x-session-id", SESSION)
        .json(&json!({ "value": bad }))
        .send()
        .await?;
    assert_eq!(invalid.status(), 400);
    assert_eq!(invalid.json::<Value>().await?["code"], "INVALID_SCHEMA");

    let saved = client
        .post(format!("{}/api/config", base))
        .header("x-session-id", SESSION)
        .json(&json!({ "value": config() }))
        .send()
        .await?;
    assert_eq!(saved.status(), 200);

    let stored = client
        .get(format!("{}/api/config", base))
        .header("x-session-id", SESSION)
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(stored["value"]["variables"][1]["type"], "multiselect");

    // --- Generate ---
    let generated = client
        .post(format!("{}/api/names/generate", base))
        .header("x-session-id", SESSION)
        .json(&json!({
            "variableValues": {
                "size": "1080x1080",
                "arch": ["Hero", "Sage"],
                "hook": "{free_input}",
                "hook_free": "Big Reveal"
            }
        }))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(generated["fileName"], "1080x1080_hero_big_reveal");
    assert_eq!(
        generated["fileNames"],
        json!(["1080x1080_hero_big_reveal", "1080x1080_sage_big_reveal"])
    );
    assert_eq!(generated["records"][1]["metadata"]["hook"], "Big Reveal");

    // Session passed as a query parameter; not saved.
    let preview = client
        .post(format!("{}/api/names/generate?sessionId={}", base, SESSION))
        .json(&json!({ "variableValues": { "size": "1920x1080" }, "save": false }))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(preview["fileName"], "1920x1080");

    // Fields of the wrong shape are skipped, not rejected.
    let loose = client
        .post(format!("{}/api/names/generate", base))
        .header("x-session-id", SESSION)
        .json(&json!({ "variableValues": { "size": "1920x1080", "arch": null, "hook": 7 }, "save": false }))
        .send()
        .await?;
    assert_eq!(loose.status(), 200);
    assert_eq!(loose.json::<Value>().await?["fileName"], "1920x1080");

    let nothing = client
        .post(format!("{}/api/names/generate", base))
        .header("x-session-id", SESSION)
        .json(&json!({ "variableValues": { "size": "   " } }))
        .send()
        .await?;
    assert_eq!(nothing.status(), 400);
    assert_eq!(nothing.json::<Value>().await?["code"], "NOTHING_TO_GENERATE");

    let malformed = client
        .post(format!("{}/api/names/generate", base))
        .header("x-session-id", SESSION)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(malformed.status(), 422);

    // --- History ---
    let names = client
        .get(format!("{}/api/names", base))
        .header("x-session-id", SESSION)
        .send()
        .await?
        .json::<Value>()
        .await?;
    let history = names["value"].as_array().cloned().unwrap_or_default();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["fileName"], "1080x1080_hero_big_reveal");

    let parsed = client
        .post(format!("{}/api/names/parse", base))
        .header("x-session-id", SESSION)
        .json(&json!({ "fileName": "1920x1080_sage_problem" }))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(parsed["data"]["metadata"]["arch"], "Sage");
    assert_eq!(parsed["data"]["metadata"]["hook"], "Problem");
    assert_eq!(parsed["data"]["alignment"]["kind"], "exact");

    // --- Report ---
    let report = client
        .get(format!("{}/api/report", base))
        .header("x-session-id", SESSION)
        .send()
        .await?
        .json::<Value>()
        .await?;
    let variables = report["variables"].as_array().cloned().unwrap_or_default();
    assert_eq!(variables.len(), 3);
    let size = variables
        .iter()
        .find(|v| v["variableId"] == "size")
        .cloned()
        .unwrap_or_default();
    assert_eq!(size["totalUsage"], 2);
    assert_eq!(size["mostUsed"], "1080x1080");
    assert_eq!(size["options"][0]["percent"], 100.0);
    let hook = variables
        .iter()
        .find(|v| v["variableId"] == "hook")
        .cloned()
        .unwrap_or_default();
    assert_eq!(hook["customValues"], json!(["Big Reveal"]));

    let out_of_range = client
        .delete(format!("{}/api/names/7", base))
        .header("x-session-id", SESSION)
        .send()
        .await?;
    assert_eq!(out_of_range.status(), 404);

    let removed = client
        .delete(format!("{}/api/names/0", base))
        .header("x-session-id", SESSION)
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(removed["data"]["fileName"], "1080x1080_hero_big_reveal");

    let migrated = client
        .post(format!("{}/api/names/migrate", base))
        .header("x-session-id", SESSION)
        .json(&json!({ "value": ["1920x1080_hero_problem", {"fileName": "1080x1080", "timestamp": 5}] }))
        .send()
        .await?
        .json::<Value>()
        .await?;
    let migrated = migrated["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(migrated.len(), 2);
    assert_eq!(migrated[0]["metadata"]["size"], "1920x1080");
    assert_eq!(migrated[1]["timestamp"], 5);

    // --- API keys ---
    let created = client
        .post(format!("{}/api/keys", base))
        .json(&json!({ "name": "CI", "environment": "test" }))
        .send()
        .await?
        .json::<Value>()
        .await?;
    let api_key = created["data"]["apiKey"].as_str().unwrap_or_default().to_string();
    let key_id = created["data"]["keyId"].as_str().unwrap_or_default().to_string();
    assert!(api_key.starts_with("adtax_test_"));

    let bad_env = client
        .post(format!("{}/api/keys", base))
        .json(&json!({ "environment": "staging" }))
        .send()
        .await?;
    assert_eq!(bad_env.status(), 400);

    // Key has no config of its own yet.
    let before_sync = client
        .post(format!("{}/api/names/generate", base))
        .header("x-api-key", &api_key)
        .json(&json!({ "variableValues": { "size": "1080x1080" } }))
        .send()
        .await?;
    assert_eq!(before_sync.status(), 404);

    let synced = client
        .post(format!("{}/api/keys/{}/sync-config", base, key_id))
        .header("x-session-id", SESSION)
        .send()
        .await?;
    assert_eq!(synced.status(), 200);

    let with_key = client
        .post(format!("{}/api/names/generate", base))
        .header("authorization", format!("Bearer {}", api_key))
        .json(&json!({ "variableValues": { "size": "1080x1080", "arch": ["Sage"] } }))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(with_key["fileName"], "1080x1080_sage");

    // Key history is separate from the session's.
    let key_names = client
        .get(format!("{}/api/names", base))
        .header("x-api-key", &api_key)
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(key_names["value"].as_array().map(Vec::len), Some(1));

    let listed = client
        .get(format!("{}/api/keys", base))
        .send()
        .await?
        .json::<Value>()
        .await?;
    let keys = listed["data"]["keys"].as_array().cloned().unwrap_or_default();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0]["name"], "CI");
    assert!(keys[0].get("apiKey").is_none());
    assert!(keys[0]["usageCount"].as_u64().unwrap_or(0) >= 3);

    let revoked = client
        .delete(format!("{}/api/keys/{}", base, key_id))
        .send()
        .await?;
    assert_eq!(revoked.status(), 200);

    let after_revoke = client
        .get(format!("{}/api/config", base))
        .header("x-api-key", &api_key)
        .send()
        .await?;
    assert_eq!(after_revoke.status(), 401);

    let revoke_again = client
        .delete(format!("{}/api/keys/{}", base, key_id))
        .send()
        .await?;
    assert_eq!(revoke_again.status(), 404);

    // --- Seed ---
    let unauthorized = client
        .post(format!("{}/api/seed", base))
        .header("authorization", "Bearer wrong")
        .send()
        .await?;
    assert_eq!(unauthorized.status(), 401);

    let seeded = client
        .post(format!("{}/api/seed", base))
        .header("authorization", format!("Bearer {}", ServiceConfig::default().seed_key))
        .header("x-session-id", "fresh")
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(seeded["data"]["existing"], false);
    assert_eq!(seeded["data"]["config"]["variables"][0]["label"], "Size");

    let reseeded = client
        .post(format!("{}/api/seed", base))
        .header("authorization", format!("Bearer {}", ServiceConfig::default().seed_key))
        .header("x-session-id", "fresh")
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(reseeded["data"]["existing"], true);

    Ok(())
}
