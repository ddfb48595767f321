//! Explorer Configuration
//!
//! Endpoints, airdrop type and request timeout. Loaded from defaults, an
//! optional TOML file, then `EXPLORER_*` environment overrides.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::identifier::TypeFilter;
use crate::presenter::AmountPolicy;

pub const DEFAULT_RPC_URL: &str = "https://fullnode.mainnet.sui.io:443";
pub const DEFAULT_NAME_FALLBACK_URL: &str = "https://suins-api.k-g.me";
pub const DEFAULT_AIRDROP_TYPE: &str =
    "0x98af8b8fde88f3c4bdf0fcedcf9afee7d10f66d480b74fb5a3a2e23dc7f5a564::airdrop::WALAirdrop";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Ledger JSON-RPC endpoint, also the primary name service
    pub rpc_url: String,

    /// Base URL of the REST name resolver tried when the primary fails
    pub name_fallback_url: String,

    /// Struct type of the airdrop objects to list
    pub airdrop_type: TypeFilter,

    /// Per-request timeout applied to every outbound call
    pub timeout_ms: u64,

    /// Ordered content-field keys that may hold the raw amount
    pub amount_fields: Vec<String>,

    /// Bind address for `serve`
    pub listen_addr: String,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            name_fallback_url: DEFAULT_NAME_FALLBACK_URL.to_string(),
            airdrop_type: default_airdrop_type(),
            timeout_ms: 8000,
            amount_fields: AmountPolicy::default().candidates().to_vec(),
            listen_addr: "127.0.0.1:7171".to_string(),
        }
    }
}

fn default_airdrop_type() -> TypeFilter {
    DEFAULT_AIRDROP_TYPE
        .parse()
        .expect("built-in airdrop type parses")
}

impl ExplorerConfig {
    /// Load config from a TOML file; missing keys keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
        toml::from_str(&content)
            .map_err(|e| format!("Failed to parse config {}: {}", path.display(), e))
    }

    /// Defaults, optional file, then environment overrides, validated
    pub fn load(path: Option<&Path>) -> Result<Self, String> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to config
    pub fn apply_env_overrides(&mut self) -> Result<(), String> {
        if let Ok(val) = env::var("EXPLORER_RPC_URL") {
            self.rpc_url = val.trim().to_string();
        }

        if let Ok(val) = env::var("EXPLORER_NAME_FALLBACK_URL") {
            self.name_fallback_url = val.trim().to_string();
        }

        if let Ok(val) = env::var("EXPLORER_AIRDROP_TYPE") {
            self.airdrop_type = val.parse()?;
        }

        if let Ok(val) = env::var("EXPLORER_TIMEOUT_MS") {
            self.timeout_ms = val
                .trim()
                .parse()
                .map_err(|e| format!("Invalid EXPLORER_TIMEOUT_MS '{}': {}", val, e))?;
        }

        if let Ok(val) = env::var("EXPLORER_LISTEN") {
            self.listen_addr = val.trim().to_string();
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), String> {
        for (key, value) in [
            ("rpc_url", &self.rpc_url),
            ("name_fallback_url", &self.name_fallback_url),
        ] {
            let parsed = url::Url::parse(value)
                .map_err(|e| format!("Invalid {} '{}': {}", key, value, e))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(format!("Invalid {} '{}': must be http(s)", key, value));
            }
        }

        if self.timeout_ms == 0 {
            return Err("timeout_ms must be greater than zero".to_string());
        }

        if self.amount_fields.iter().all(|f| f.trim().is_empty()) {
            return Err("amount_fields must name at least one field".to_string());
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn amount_policy(&self) -> AmountPolicy {
        AmountPolicy::new(self.amount_fields.clone())
    }
}
