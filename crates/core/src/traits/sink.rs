//! Event and usage sinks
//!
//! Both sinks are fire-and-forget from the engine's point of view: a
//! failing sink never affects the turn that produced the records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::event::Event;

/// Destination for the per-turn audit event batch
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Called once per turn with the full ordered batch
    async fn write(&self, events: &[Event]) -> Result<()>;
}

/// One LLM invocation, for billing and audit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmUsageRecord {
    pub call_id: String,
    pub company_id: String,
    pub turn_index: u32,
    pub mode: String,
    pub model: String,
    pub tokens_in: u32,
    pub tokens_out: u32,
    pub latency_ms: u64,
    /// Whether the validated output was actually spoken
    pub accepted: bool,
    pub timestamp: DateTime<Utc>,
}

/// Append-only usage log
#[async_trait]
pub trait UsageLogger: Send + Sync {
    async fn log(&self, record: LlmUsageRecord) -> Result<()>;
}
