// API key generation and the hashing used to look keys up.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::distributions::Alphanumeric;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

const KEY_PREFIX: &str = "adtax";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum KeyEnvironment {
    #[default]
    Live,
    Test,
}

impl KeyEnvironment {
    pub fn as_str(self) -> &'static str {
        match self {
            KeyEnvironment::Live => "live",
            KeyEnvironment::Test => "test",
        }
    }
}

impl fmt::Display for KeyEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "live" => Ok(KeyEnvironment::Live),
            "test" => Ok(KeyEnvironment::Test),
            other => Err(format!("Environment must be 'live' or 'test', got '{}'", other)),
        }
    }
}

/// Generates `adtax_{env}_{base64url(32 random bytes)}`.
///
/// The plain key is shown to the caller once; only its hash is stored.
pub fn generate_api_key(environment: KeyEnvironment) -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!(
        "{}_{}_{}",
        KEY_PREFIX,
        environment,
        URL_SAFE_NO_PAD.encode(bytes)
    )
}

/// Hex SHA-256 of the plain key; the storage lookup id.
pub fn hash_api_key(api_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(api_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Opaque id for key metadata, e.g. `key_1718000000000_k3j9x0a2q`.
pub fn generate_key_id(now_millis: i64) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(Alphanumeric)
        .take(9)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("key_{}_{}", now_millis, suffix)
}
