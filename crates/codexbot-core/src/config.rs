use std::collections::HashMap;

use anyhow::{bail, Result};

/// Runtime configuration, sourced from the environment with `.env`
/// fallback and validated once at startup. Sensitive values (secrets, API
/// keys) never leave this struct.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared secret used to verify inbound webhook signatures.
    pub webhook_secret: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: String,
    pub port: u16,
    /// Path or name of the codex executable.
    pub codex_bin: String,
    /// Optional error-telemetry collector endpoint.
    pub telemetry_endpoint: Option<String>,
}

fn parse_dotenv() -> HashMap<String, String> {
    let mut map = HashMap::new();
    let Ok(contents) = std::fs::read_to_string(".env") else {
        return map;
    };
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((k, v)) = line.split_once('=') {
            map.insert(k.trim().to_string(), v.trim().to_string());
        }
    }
    map
}

fn get(key: &str, dotenv: &HashMap<String, String>) -> Option<String> {
    std::env::var(key).ok().or_else(|| dotenv.get(key).cloned())
}

fn get_str(key: &str, dotenv: &HashMap<String, String>, default: &str) -> String {
    get(key, dotenv).unwrap_or_else(|| default.to_string())
}

fn get_u16(key: &str, dotenv: &HashMap<String, String>, default: u16) -> u16 {
    get(key, dotenv)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let dotenv = parse_dotenv();

        let openai_api_key = get_str("OPENAI_API_KEY", &dotenv, "");
        if openai_api_key.is_empty() {
            bail!("OPENAI_API_KEY is not set");
        }

        Ok(Config {
            webhook_secret: get_str("AUTOMA_WEBHOOK_SECRET", &dotenv, "atma_whsec_codex"),
            openai_api_key,
            openai_model: get_str("OPENAI_MODEL", &dotenv, "gpt-4.1-mini"),
            openai_base_url: get_str("OPENAI_BASE_URL", &dotenv, "https://api.openai.com/v1"),
            port: get_u16("PORT", &dotenv, 5007),
            codex_bin: get_str("CODEX_BIN", &dotenv, "codex"),
            telemetry_endpoint: get("TELEMETRY_ENDPOINT", &dotenv).filter(|s| !s.is_empty()),
        })
    }
}
