//! Optional scenario-fallback seam
//!
//! Consulted only when a configuration explicitly enables the scenario
//! fallback branch. The engine uses the pick only when its confidence
//! clears the configured threshold and its type is allow-listed.

use async_trait::async_trait;

use crate::error::Result;

/// A scenario engine selection
#[derive(Debug, Clone)]
pub struct ScenarioPick {
    pub scenario_type: String,
    pub response: String,
    pub confidence: f32,
}

/// External scenario selector
#[async_trait]
pub trait ScenarioSelector: Send + Sync {
    async fn select(&self, company_id: &str, text: &str) -> Result<Option<ScenarioPick>>;
}
