//! Per-turn event buffer
//!
//! Events are buffered in arrival order during a turn and flushed to the
//! external sink exactly once at turn end. A failing sink never affects
//! the turn.

use frontdesk_core::{Event, EventSink};

/// Ordered per-turn buffer; stamps config hash and turn index on every
/// event it accepts
pub struct EventBus {
    config_hash: String,
    turn_index: u32,
    events: Vec<Event>,
}

impl EventBus {
    pub fn new(config_hash: impl Into<String>, turn_index: u32) -> Self {
        Self {
            config_hash: config_hash.into(),
            turn_index,
            events: Vec::new(),
        }
    }

    /// Buffer an event, stamping turn context onto it
    pub fn emit(&mut self, mut event: Event) {
        event.config_hash = self.config_hash.clone();
        event.turn_index = self.turn_index;
        tracing::trace!(
            event_type = %event.event_type,
            turn_index = self.turn_index,
            "event"
        );
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Flush the batch to the sink; sink errors are swallowed.
    /// Returns the batch for attachment to the turn outcome.
    pub async fn drain_to(self, sink: &dyn EventSink) -> Vec<Event> {
        if let Err(e) = sink.write(&self.events).await {
            tracing::warn!(error = %e, "Event sink write failed; batch dropped downstream");
        }
        self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use frontdesk_core::{EventType, Result};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        batches: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl EventSink for RecordingSink {
        async fn write(&self, events: &[Event]) -> Result<()> {
            self.batches.lock().unwrap().push(events.len());
            Ok(())
        }
    }

    struct FailingSink;

    #[async_trait]
    impl EventSink for FailingSink {
        async fn write(&self, _events: &[Event]) -> Result<()> {
            Err(frontdesk_core::Error::Sink("down".to_string()))
        }
    }

    #[tokio::test]
    async fn test_events_stamped_and_ordered() {
        let mut bus = EventBus::new("abc123", 4);
        bus.emit(Event::new(EventType::TurnGate));
        bus.emit(Event::new(EventType::ResponseReady));

        let sink = RecordingSink::default();
        let events = bus.drain_to(&sink).await;
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.config_hash == "abc123" && e.turn_index == 4));
        assert_eq!(events[0].event_type, EventType::TurnGate);
        assert_eq!(events[1].event_type, EventType::ResponseReady);
        assert_eq!(*sink.batches.lock().unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn test_sink_failure_swallowed() {
        let mut bus = EventBus::new("abc123", 1);
        bus.emit(Event::new(EventType::TurnGate));
        let events = bus.drain_to(&FailingSink).await;
        assert_eq!(events.len(), 1);
    }
}
