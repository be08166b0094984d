//! Per-call state registry
//!
//! Concurrent map from call id to call state. Work is parallel across
//! calls and strictly serialized within a call: each state sits behind
//! an async mutex held for the whole turn, so no two turns for the same
//! call ever run concurrently and state is never observed mid-mutation.

use std::sync::Arc;

use dashmap::DashMap;
use frontdesk_core::CallState;
use tokio::sync::Mutex;

/// The registry; owned by the runner, shared across request handlers
#[derive(Default)]
pub struct CallRegistry {
    calls: DashMap<String, Arc<Mutex<CallState>>>,
}

impl CallRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the slot for a call, creating state on the first turn
    pub fn checkout(&self, call_id: &str, company_id: &str) -> Arc<Mutex<CallState>> {
        self.calls
            .entry(call_id.to_string())
            .or_insert_with(|| {
                tracing::debug!(call_id = %call_id, company_id = %company_id, "Creating call state");
                Arc::new(Mutex::new(CallState::new(call_id, company_id)))
            })
            .clone()
    }

    /// Discard state at hangup. In-flight work for the call finishes
    /// against its own copy and is dropped with the slot.
    pub fn end_call(&self, call_id: &str) -> bool {
        let removed = self.calls.remove(call_id).is_some();
        if removed {
            tracing::debug!(call_id = %call_id, "Call state discarded");
        }
        removed
    }

    pub fn active_calls(&self) -> usize {
        self.calls.len()
    }

    /// Clone a call's current state, waiting out any in-flight turn
    pub async fn snapshot(&self, call_id: &str) -> Option<CallState> {
        let slot = self.calls.get(call_id).map(|s| Arc::clone(&s))?;
        let state = slot.lock().await;
        Some(state.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_checkout_creates_once() {
        let registry = CallRegistry::new();
        let slot = registry.checkout("call-1", "acme");
        {
            let mut state = slot.lock().await;
            state.greeted = true;
        }

        // Second checkout sees the same state
        let again = registry.checkout("call-1", "acme");
        assert!(again.lock().await.greeted);
        assert_eq!(registry.active_calls(), 1);
    }

    #[tokio::test]
    async fn test_end_call_discards() {
        let registry = CallRegistry::new();
        registry.checkout("call-1", "acme");
        assert!(registry.end_call("call-1"));
        assert!(!registry.end_call("call-1"));
        assert_eq!(registry.active_calls(), 0);
    }

    #[tokio::test]
    async fn test_per_call_serialization() {
        let registry = Arc::new(CallRegistry::new());
        let slot = registry.checkout("call-1", "acme");

        // Hold the slot as a turn would; a second turn must wait
        let guard = slot.lock().await;
        let slot2 = registry.checkout("call-1", "acme");
        assert!(slot2.try_lock().is_err());
        drop(guard);
        assert!(slot2.try_lock().is_ok());
    }
}
