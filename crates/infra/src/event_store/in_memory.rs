use std::sync::{Arc, RwLock};

use serde_json::Value as JsonValue;

use tillstream_core::{EventId, StreamId};
use tillstream_events::{EventBus, EventEnvelope, InMemoryEventBus};

use super::r#trait::{EventStore, EventStoreError};

/// In-memory append-only event store.
///
/// A single insertion-ordered log behind an `RwLock`. Concurrent appends
/// serialize on the write lock; readers take the read lock and copy, so a
/// read never observes a partially written envelope and never blocks on a
/// stream filter.
///
/// An optional bus turns the store into a publisher: after a successful
/// append the envelope is published *while the write lock is still held*,
/// so subscribers observe envelopes in exact append order.
#[derive(Debug)]
pub struct InMemoryEventStore<B = InMemoryEventBus<EventEnvelope<JsonValue>>>
where
    B: EventBus<EventEnvelope<JsonValue>>,
{
    log: RwLock<Vec<EventEnvelope<JsonValue>>>,
    bus: Option<Arc<B>>,
}

impl InMemoryEventStore {
    /// A store without a bus; reads are the only way to consume events.
    pub fn new() -> Self {
        Self {
            log: RwLock::new(Vec::new()),
            bus: None,
        }
    }
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> InMemoryEventStore<B>
where
    B: EventBus<EventEnvelope<JsonValue>>,
{
    /// A store that publishes every appended envelope to `bus`.
    pub fn with_bus(bus: Arc<B>) -> Self {
        Self {
            log: RwLock::new(Vec::new()),
            bus: Some(bus),
        }
    }

    /// Number of envelopes in the log.
    pub fn len(&self) -> usize {
        self.log.read().map(|log| log.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<B> EventStore for InMemoryEventStore<B>
where
    B: EventBus<EventEnvelope<JsonValue>>,
{
    fn append(
        &self,
        stream_id: StreamId,
        event_id: EventId,
        event_type: &str,
        payload: JsonValue,
    ) -> Result<EventEnvelope<JsonValue>, EventStoreError> {
        let mut log = self
            .log
            .write()
            .map_err(|_| EventStoreError::InvalidAppend("lock poisoned".to_string()))?;

        // Positions are 1-based and assigned in insertion order.
        let position = log.len() as u64 + 1;
        let envelope = EventEnvelope::new(event_id, stream_id, position, event_type, payload);
        log.push(envelope.clone());

        // Published under the write lock so no later append can publish
        // first; the log order and the bus order are the same order.
        if let Some(bus) = &self.bus {
            bus.publish(envelope.clone())
                .map_err(|e| EventStoreError::Publish(format!("{e:?}")))?;
        }

        Ok(envelope)
    }

    fn get_all(&self) -> Result<Vec<EventEnvelope<JsonValue>>, EventStoreError> {
        let log = self
            .log
            .read()
            .map_err(|_| EventStoreError::InvalidAppend("lock poisoned".to_string()))?;

        Ok(log.clone())
    }

    fn get_for_stream(
        &self,
        stream_id: StreamId,
    ) -> Result<Vec<EventEnvelope<JsonValue>>, EventStoreError> {
        let log = self
            .log
            .read()
            .map_err(|_| EventStoreError::InvalidAppend("lock poisoned".to_string()))?;

        Ok(log
            .iter()
            .filter(|envelope| envelope.stream_id() == stream_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    use tillstream_purchase::{PurchaseEvent, PurchaseId, PurchaseMade, PurchaseRequested};

    fn made(purchase_id: PurchaseId, amount_minor: u64) -> PurchaseEvent {
        PurchaseEvent::Made(PurchaseMade::new(purchase_id, amount_minor))
    }

    #[test]
    fn append_grows_the_log_by_one() {
        let store = InMemoryEventStore::new();
        let purchase_id = PurchaseId::new(StreamId::new());

        assert!(store.is_empty());
        store
            .append_event(purchase_id.stream_id(), &made(purchase_id, 100))
            .unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn get_all_returns_envelopes_in_append_order() {
        let store = InMemoryEventStore::new();
        let a = PurchaseId::new(StreamId::new());
        let b = PurchaseId::new(StreamId::new());

        let first = store.append_event(a.stream_id(), &made(a, 1)).unwrap();
        let second = store.append_event(b.stream_id(), &made(b, 2)).unwrap();
        let third = store.append_event(a.stream_id(), &made(a, 3)).unwrap();

        let all = store.get_all().unwrap();
        assert_eq!(all, vec![first, second, third]);
        assert_eq!(
            all.iter().map(|e| e.position()).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn get_for_stream_preserves_relative_order() {
        let store = InMemoryEventStore::new();
        let a = PurchaseId::new(StreamId::new());
        let b = PurchaseId::new(StreamId::new());

        store.append_event(a.stream_id(), &made(a, 1)).unwrap();
        store.append_event(b.stream_id(), &made(b, 2)).unwrap();
        store
            .append_event(
                a.stream_id(),
                &PurchaseEvent::Requested(PurchaseRequested::new(a, 3, vec![])),
            )
            .unwrap();

        let stream = store.get_for_stream(a.stream_id()).unwrap();
        assert_eq!(stream.len(), 2);
        assert!(stream.iter().all(|e| e.stream_id() == a.stream_id()));
        assert!(stream[0].position() < stream[1].position());
    }

    #[test]
    fn unknown_stream_reads_empty_not_error() {
        let store = InMemoryEventStore::new();
        let purchase_id = PurchaseId::new(StreamId::new());
        store
            .append_event(purchase_id.stream_id(), &made(purchase_id, 100))
            .unwrap();

        let never_appended = StreamId::new();
        assert!(store.get_for_stream(never_appended).unwrap().is_empty());
    }

    #[test]
    fn reads_are_idempotent_between_appends() {
        let store = InMemoryEventStore::new();
        let purchase_id = PurchaseId::new(StreamId::new());
        store
            .append_event(purchase_id.stream_id(), &made(purchase_id, 100))
            .unwrap();

        assert_eq!(store.get_all().unwrap(), store.get_all().unwrap());
        assert_eq!(
            store.get_for_stream(purchase_id.stream_id()).unwrap(),
            store.get_for_stream(purchase_id.stream_id()).unwrap()
        );
    }

    #[test]
    fn mutating_a_read_does_not_touch_the_store() {
        let store = InMemoryEventStore::new();
        let purchase_id = PurchaseId::new(StreamId::new());
        store
            .append_event(purchase_id.stream_id(), &made(purchase_id, 100))
            .unwrap();

        let mut copy = store.get_all().unwrap();
        copy.clear();

        assert_eq!(store.len(), 1);
    }

    proptest! {
        /// For any append sequence, `get_all` returns exactly the appended
        /// envelopes in order, and `get_for_stream(id)` equals the
        /// `stream_id == id` subsequence of `get_all`.
        #[test]
        fn log_order_and_stream_filter_laws(
            appends in prop::collection::vec((0usize..4, 1u64..100_000), 0..40)
        ) {
            let store = InMemoryEventStore::new();
            let streams: Vec<PurchaseId> =
                (0..4).map(|_| PurchaseId::new(StreamId::new())).collect();

            let mut expected = Vec::new();
            for (idx, amount) in appends {
                let purchase_id = streams[idx];
                let envelope = store
                    .append_event(purchase_id.stream_id(), &made(purchase_id, amount))
                    .unwrap();
                expected.push(envelope);
            }

            let all = store.get_all().unwrap();
            prop_assert_eq!(&all, &expected);

            for purchase_id in &streams {
                let filtered: Vec<_> = all
                    .iter()
                    .filter(|e| e.stream_id() == purchase_id.stream_id())
                    .cloned()
                    .collect();
                prop_assert_eq!(
                    store.get_for_stream(purchase_id.stream_id()).unwrap(),
                    filtered
                );
            }
        }
    }
}
