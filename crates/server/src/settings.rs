//! Server settings
//!
//! Loaded from `config/server.yaml` (optional) with `FRONTDESK_`
//! environment overrides, e.g. `FRONTDESK_SERVER__PORT=8080` or
//! `FRONTDESK_LLM__API_KEY=sk-...`.

use serde::{Deserialize, Serialize};

use crate::ServerError;

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// LLM backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
        }
    }
}

/// Top-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: HttpSettings,
    /// Directory holding `defaults.yaml`, `companies/`, `variables/`
    #[serde(default = "default_config_dir")]
    pub config_dir: String,
    #[serde(default)]
    pub llm: LlmSettings,
    /// Whole-turn deadline
    #[serde(default = "default_turn_deadline_ms")]
    pub turn_deadline_ms: u64,
}

fn default_config_dir() -> String {
    "config".to_string()
}

fn default_turn_deadline_ms() -> u64 {
    8_000
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: HttpSettings::default(),
            config_dir: default_config_dir(),
            llm: LlmSettings::default(),
            turn_deadline_ms: default_turn_deadline_ms(),
        }
    }
}

impl Settings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Load settings from file and environment
pub fn load_settings() -> Result<Settings, ServerError> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name("config/server").required(false))
        .add_source(
            config::Environment::with_prefix("FRONTDESK")
                .separator("__")
                .try_parsing(true),
        );

    builder
        .build()
        .and_then(|c| c.try_deserialize())
        .map_err(|e| ServerError::Config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.bind_address(), "0.0.0.0:8080");
        assert_eq!(settings.turn_deadline_ms, 8_000);
        assert_eq!(settings.config_dir, "config");
    }

    #[test]
    fn test_deserialization_with_partial_fields() {
        let settings: Settings =
            serde_yaml::from_str("server:\n  port: 9090\nturn_deadline_ms: 5000\n").unwrap();
        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.turn_deadline_ms, 5000);
    }
}
