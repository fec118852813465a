//! Per-message execution context.
//!
//! Bundles the store view a handler runs against (normally a
//! [`Transaction`](crate::Transaction)), the block time and the events the
//! handler emits. Events are only published if the message commits.

use academic_ledger_core::{format_timestamp, Event};
use chrono::{DateTime, Utc};

use crate::traits::KvStore;

pub struct Context<'a> {
    store: &'a dyn KvStore,
    block_time: DateTime<Utc>,
    events: Vec<Event>,
}

impl<'a> Context<'a> {
    pub fn new(store: &'a dyn KvStore, block_time: DateTime<Utc>) -> Self {
        Self {
            store,
            block_time,
            events: Vec::new(),
        }
    }

    pub fn store(&self) -> &'a dyn KvStore {
        self.store
    }

    pub fn block_time(&self) -> DateTime<Utc> {
        self.block_time
    }

    /// Block time formatted as `2006-01-02T15:04:05Z`.
    pub fn timestamp(&self) -> String {
        format_timestamp(self.block_time)
    }

    pub fn emit(&mut self, event: Event) {
        tracing::debug!(kind = %event.kind, "event emitted");
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}
