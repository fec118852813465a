//! Event publication.
//!
//! Events collected while a message runs are handed to the sink only after
//! the message's writes have been committed.

use academic_ledger_core::Event;
use async_trait::async_trait;
use tokio::sync::Mutex;

/// Receives the events of committed messages, in emission order.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, events: &[Event]);
}

/// Logs every event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

#[async_trait]
impl EventSink for TracingSink {
    async fn publish(&self, events: &[Event]) {
        for event in events {
            let attributes = event
                .attributes
                .iter()
                .map(|a| format!("{}={}", a.key, a.value))
                .collect::<Vec<_>>()
                .join(" ");
            tracing::info!(kind = %event.kind, %attributes, "event");
        }
    }
}

/// Keeps every published event in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Event>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<Event> {
        self.events.lock().await.clone()
    }

    pub async fn kinds(&self) -> Vec<String> {
        self.events
            .lock()
            .await
            .iter()
            .map(|e| e.kind.clone())
            .collect()
    }

    pub async fn clear(&self) {
        self.events.lock().await.clear();
    }
}

#[async_trait]
impl EventSink for MemorySink {
    async fn publish(&self, events: &[Event]) {
        self.events.lock().await.extend_from_slice(events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_sink_keeps_order() {
        let sink = MemorySink::new();
        sink.publish(&[Event::new("a"), Event::new("b")]).await;
        sink.publish(&[Event::new("c").attr("index", "x-1")]).await;

        assert_eq!(sink.kinds().await, ["a", "b", "c"]);
        assert_eq!(sink.events().await[2].get("index"), Some("x-1"));

        sink.clear().await;
        assert!(sink.events().await.is_empty());
    }
}
