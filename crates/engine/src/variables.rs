//! Trigger-variable cache and substitution
//!
//! Variables are per-company name/value pairs substituted into trigger
//! answers (`{diagnosticfee}` -> `"80 dollars"`). The cache is
//! read-mostly and keyed by company id; a per-entry latch makes sure a
//! cold key is loaded exactly once even under concurrent turns, and a
//! config version bump invalidates the entry.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use frontdesk_core::VariableStore;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::sync::OnceCell;

static VARIABLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([a-zA-Z0-9_]+)\}").expect("variable pattern is valid"));

struct CacheEntry {
    version: u64,
    cell: OnceCell<Arc<HashMap<String, String>>>,
}

/// Shared read-mostly cache with single-loader-per-key semantics
#[derive(Default)]
pub struct TriggerVariableCache {
    entries: DashMap<String, Arc<CacheEntry>>,
}

impl TriggerVariableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Variables for a company at a config version. A load failure is
    /// tolerated: substitution simply has nothing to substitute.
    pub async fn get(
        &self,
        store: &dyn VariableStore,
        company_id: &str,
        version: u64,
    ) -> Arc<HashMap<String, String>> {
        let entry = {
            let current = self.entries.get(company_id).map(|e| Arc::clone(&e));
            match current {
                Some(entry) if entry.version == version => entry,
                _ => {
                    let fresh = Arc::new(CacheEntry {
                        version,
                        cell: OnceCell::new(),
                    });
                    self.entries
                        .insert(company_id.to_string(), Arc::clone(&fresh));
                    fresh
                }
            }
        };

        entry
            .cell
            .get_or_init(|| async {
                match store.load(company_id).await {
                    Ok(vars) => {
                        tracing::debug!(
                            company_id = %company_id,
                            count = vars.len(),
                            "Loaded trigger variables"
                        );
                        Arc::new(vars)
                    }
                    Err(e) => {
                        tracing::warn!(
                            company_id = %company_id,
                            error = %e,
                            "Trigger variable load failed; substitution disabled this entry"
                        );
                        Arc::new(HashMap::new())
                    }
                }
            })
            .await
            .clone()
    }
}

/// Replace `{name}` markers with their values; unknown names stay put
pub fn substitute(text: &str, variables: &HashMap<String, String>) -> String {
    VARIABLE_RE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            match variables.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            }
        })
        .to_string()
}
