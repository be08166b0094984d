//! HTTP surface for the dialog orchestrator
//!
//! Exposes the single `process_turn` operation plus call lifecycle,
//! health, and config reload endpoints. Telephony ingress (speech to
//! text, audio playback) lives upstream and talks to this service.

pub mod http;
pub mod settings;
pub mod sink;
pub mod state;

pub use http::router;
pub use settings::{load_settings, LlmSettings, Settings};
pub use sink::{FileVariableStore, TracingEventSink, TracingUsageLogger};
pub use state::AppState;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Startup error: {0}")]
    Startup(String),
}
