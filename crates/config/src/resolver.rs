//! Configuration loading and merging
//!
//! Bundles are assembled from two YAML layers: shared defaults and the
//! per-company override file. Overrides win key-by-key; sequences are
//! replaced wholesale. The merged document deserializes into
//! [`CompanyConfig`] and is cached until a reload.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_yaml::Value;

use frontdesk_core::Result;

use crate::company::CompanyConfig;
use crate::validator::Validator;
use crate::ConfigError;

/// Read-only snapshot source for company bundles
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn load(&self, company_id: &str) -> Result<Arc<CompanyConfig>>;
}

/// Deep-merge `overlay` onto `base`. Mappings merge recursively;
/// everything else is replaced by the overlay value.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(mut base_map), Value::Mapping(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Mapping(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Directory-backed store:
/// `defaults.yaml` plus `companies/{company_id}.yaml`
pub struct FileConfigStore {
    dir: PathBuf,
    cache: RwLock<HashMap<String, Arc<CompanyConfig>>>,
}

impl FileConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Drop all cached bundles; next load re-reads from disk
    pub fn reload(&self) {
        self.cache.write().clear();
        tracing::info!("Company configuration cache cleared");
    }

    /// Company ids with an override file on disk
    pub fn known_companies(&self) -> Vec<String> {
        let companies_dir = self.dir.join("companies");
        let Ok(entries) = std::fs::read_dir(&companies_dir) else {
            return Vec::new();
        };
        let mut ids: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                let name = e.file_name().to_string_lossy().to_string();
                name.strip_suffix(".yaml").map(|s| s.to_string())
            })
            .collect();
        ids.sort();
        ids
    }

    fn read_yaml(path: &Path) -> std::result::Result<Option<Value>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileNotFound(format!("{}: {}", path.display(), e)))?;
        let value = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;
        Ok(Some(value))
    }

    fn load_from_disk(&self, company_id: &str) -> std::result::Result<CompanyConfig, ConfigError> {
        let defaults = Self::read_yaml(&self.dir.join("defaults.yaml"))?;
        let overrides =
            Self::read_yaml(&self.dir.join("companies").join(format!("{company_id}.yaml")))?;

        let merged = match (defaults, overrides) {
            (Some(base), Some(overlay)) => deep_merge(base, overlay),
            (Some(base), None) => base,
            (None, Some(overlay)) => overlay,
            (None, None) => return Err(ConfigError::UnknownCompany(company_id.to_string())),
        };

        let mut config: CompanyConfig = serde_yaml::from_value(merged)
            .map_err(|e| ConfigError::ParseError(format!("{company_id}: {e}")))?;
        config.company_id = company_id.to_string();

        let report = Validator::new().validate(&config);
        report.log();
        if !report.is_ok() {
            return Err(ConfigError::InvalidValue {
                field: company_id.to_string(),
                message: format!("{} critical validation failures", report.critical_count()),
            });
        }

        Ok(config)
    }
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn load(&self, company_id: &str) -> Result<Arc<CompanyConfig>> {
        if let Some(config) = self.cache.read().get(company_id) {
            return Ok(Arc::clone(config));
        }

        let config = Arc::new(self.load_from_disk(company_id)?);
        self.cache
            .write()
            .insert(company_id.to_string(), Arc::clone(&config));
        tracing::info!(
            company_id = %company_id,
            config_hash = %config.config_hash(),
            cards = config.triggers.len(),
            "Loaded company configuration"
        );
        Ok(config)
    }
}

/// Fixed in-memory store for tests and embedded use
#[derive(Default)]
pub struct StaticConfigStore {
    configs: RwLock<HashMap<String, Arc<CompanyConfig>>>,
}

impl StaticConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, config: CompanyConfig) {
        self.configs
            .write()
            .insert(config.company_id.clone(), Arc::new(config));
    }
}

#[async_trait]
impl ConfigStore for StaticConfigStore {
    async fn load(&self, company_id: &str) -> Result<Arc<CompanyConfig>> {
        self.configs
            .read()
            .get(company_id)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownCompany(company_id.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_merge_mappings() {
        let base: Value = serde_yaml::from_str(
            r#"
behavior:
  ack_word: "Okay."
  use_caller_name: true
playbook:
  no_match_answer: "default answer"
"#,
        )
        .unwrap();
        let overlay: Value = serde_yaml::from_str(
            r#"
behavior:
  ack_word: "Sure."
"#,
        )
        .unwrap();

        let merged = deep_merge(base, overlay);
        let behavior = merged.get("behavior").unwrap();
        assert_eq!(
            behavior.get("ack_word").and_then(|v| v.as_str()),
            Some("Sure.")
        );
        // Untouched sibling keys survive
        assert_eq!(
            behavior.get("use_caller_name").and_then(|v| v.as_bool()),
            Some(true)
        );
        assert!(merged.get("playbook").is_some());
    }

    #[test]
    fn test_deep_merge_sequences_replaced() {
        let base: Value = serde_yaml::from_str("global_negatives: [a, b]").unwrap();
        let overlay: Value = serde_yaml::from_str("global_negatives: [c]").unwrap();
        let merged = deep_merge(base, overlay);
        let negatives = merged.get("global_negatives").unwrap().as_sequence().unwrap();
        assert_eq!(negatives.len(), 1);
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("companies")).unwrap();
        std::fs::write(
            dir.path().join("defaults.yaml"),
            "company_id: placeholder\nbehavior:\n  ack_word: \"Okay.\"\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("companies").join("acme.yaml"),
            "updated_at: 7\nbehavior:\n  ack_word: \"Sure.\"\n",
        )
        .unwrap();

        let store = FileConfigStore::new(dir.path());
        let config = store.load("acme").await.unwrap();
        assert_eq!(config.company_id, "acme");
        assert_eq!(config.behavior.ack_word, "Sure.");
        assert_eq!(config.updated_at, 7);

        assert_eq!(store.known_companies(), vec!["acme".to_string()]);

        // A company without an override file gets the shared defaults
        let plain = store.load("no-overrides").await.unwrap();
        assert_eq!(plain.behavior.ack_word, "Okay.");
    }

    #[tokio::test]
    async fn test_static_store() {
        let store = StaticConfigStore::new();
        store.insert(CompanyConfig::bare("acme"));
        assert!(store.load("acme").await.is_ok());
        assert!(store.load("other").await.is_err());
    }
}
