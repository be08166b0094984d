//! Production sink implementations
//!
//! Events and usage records flow into the tracing pipeline as
//! structured JSON lines; a downstream collector ships them wherever
//! they need to go. Trigger variables load from per-company YAML files.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;

use frontdesk_core::{Event, EventSink, LlmUsageRecord, Result, UsageLogger, VariableStore};

/// Writes each event batch as JSON lines under the `frontdesk::events`
/// target
#[derive(Default)]
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn write(&self, events: &[Event]) -> Result<()> {
        for event in events {
            match serde_json::to_string(event) {
                Ok(json) => {
                    tracing::info!(target: "frontdesk::events", event = %json);
                }
                Err(e) => {
                    tracing::warn!(target: "frontdesk::events", error = %e, "Unserializable event");
                }
            }
        }
        Ok(())
    }
}

/// Writes usage records under the `frontdesk::usage` target
#[derive(Default)]
pub struct TracingUsageLogger;

#[async_trait]
impl UsageLogger for TracingUsageLogger {
    async fn log(&self, record: LlmUsageRecord) -> Result<()> {
        match serde_json::to_string(&record) {
            Ok(json) => tracing::info!(target: "frontdesk::usage", record = %json),
            Err(e) => tracing::warn!(target: "frontdesk::usage", error = %e, "Unserializable record"),
        }
        Ok(())
    }
}

/// Loads `{config_dir}/variables/{company_id}.yaml` as a flat map.
/// A missing file simply means no variables.
pub struct FileVariableStore {
    dir: PathBuf,
}

impl FileVariableStore {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: config_dir.into().join("variables"),
        }
    }
}

#[async_trait]
impl VariableStore for FileVariableStore {
    async fn load(&self, company_id: &str) -> Result<HashMap<String, String>> {
        let path = self.dir.join(format!("{company_id}.yaml"));
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let content = std::fs::read_to_string(&path)
            .map_err(|e| frontdesk_core::Error::Config(format!("{}: {e}", path.display())))?;
        serde_yaml::from_str(&content)
            .map_err(|e| frontdesk_core::Error::Config(format!("{}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_variables_file_is_empty_map() {
        let store = FileVariableStore::new("/nonexistent");
        let vars = store.load("acme").await.unwrap();
        assert!(vars.is_empty());
    }

    #[tokio::test]
    async fn test_variables_load_from_yaml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("variables")).unwrap();
        std::fs::write(
            dir.path().join("variables").join("acme.yaml"),
            "diagnosticfee: \"80 dollars\"\nbrandname: \"Acme Air\"\n",
        )
        .unwrap();

        let store = FileVariableStore::new(dir.path());
        let vars = store.load("acme").await.unwrap();
        assert_eq!(vars.get("diagnosticfee").map(|s| s.as_str()), Some("80 dollars"));
        assert_eq!(vars.len(), 2);
    }
}
