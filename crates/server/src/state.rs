//! Application state
//!
//! Shared across all handlers: the turn runner, the config store for
//! reloads, and the settings the process started with.

use std::sync::Arc;
use std::time::Duration;

use frontdesk_config::FileConfigStore;
use frontdesk_engine::{TurnRunner, TurnRunnerBuilder};
use frontdesk_llm::{HttpLlmClient, HttpLlmConfig};

use crate::settings::Settings;
use crate::sink::{FileVariableStore, TracingEventSink, TracingUsageLogger};
use crate::ServerError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub runner: Arc<TurnRunner>,
    pub config_store: Arc<FileConfigStore>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Wire the runner from settings
    pub fn new(settings: Settings) -> Result<Self, ServerError> {
        let config_store = Arc::new(FileConfigStore::new(&settings.config_dir));

        let llm = HttpLlmClient::new(HttpLlmConfig {
            endpoint: settings.llm.endpoint.clone(),
            api_key: settings.llm.api_key.clone(),
            ..HttpLlmConfig::default()
        })
        .map_err(|e| ServerError::Startup(e.to_string()))?;

        let runner = TurnRunnerBuilder::new(
            config_store.clone(),
            Arc::new(llm),
            Arc::new(TracingEventSink),
            Arc::new(TracingUsageLogger),
            Arc::new(FileVariableStore::new(&settings.config_dir)),
        )
        .with_turn_deadline(Duration::from_millis(settings.turn_deadline_ms))
        .build();

        Ok(Self {
            runner: Arc::new(runner),
            config_store,
            settings: Arc::new(settings),
        })
    }

    /// Re-read company bundles from disk on the next load
    pub fn reload_config(&self) {
        self.config_store.reload();
    }
}
