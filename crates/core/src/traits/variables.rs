//! Trigger-variable store seam

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;

/// Named string substitutions for trigger answers,
/// e.g. `{diagnosticfee}` -> `"80 dollars"`
#[async_trait]
pub trait VariableStore: Send + Sync {
    async fn load(&self, company_id: &str) -> Result<HashMap<String, String>>;
}
