use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use thiserror::Error;

use tillstream_core::{EventId, StreamId};
use tillstream_events::{Event, EventEnvelope};

/// Event store operation error.
///
/// Appends to an unbounded in-memory log cannot fail for valid inputs; the
/// remaining failure modes are serialization, lock poisoning, and bus
/// publication after a successful append.
#[derive(Debug, Error)]
pub enum EventStoreError {
    #[error("invalid append: {0}")]
    InvalidAppend(String),

    /// Publication failed after a successful append. The event is in the
    /// log; subscribers can recover by replaying from the store.
    #[error("event publication failed: {0}")]
    Publish(String),
}

/// Append-only, insertion-ordered event store.
///
/// The log is the source of truth. Envelopes are never mutated or removed
/// after insertion; insertion order is preserved and is the only ordering
/// guarantee. A *stream* is not a stored entity but the subsequence of the
/// log sharing a `stream_id`.
///
/// Reads return fresh copies, so callers cannot mutate the store through
/// them, and each read observes a consistent prefix of the log.
pub trait EventStore: Send + Sync {
    /// Wrap an event payload in an envelope and append it to the log.
    ///
    /// The envelope is assigned the next global position. Each append is
    /// atomic with respect to log length and visibility: subsequent reads
    /// include it whole or not at all.
    fn append(
        &self,
        stream_id: StreamId,
        event_id: EventId,
        event_type: &str,
        payload: JsonValue,
    ) -> Result<EventEnvelope<JsonValue>, EventStoreError>;

    /// The full log in insertion order.
    fn get_all(&self) -> Result<Vec<EventEnvelope<JsonValue>>, EventStoreError>;

    /// The subsequence of the log whose envelopes belong to `stream_id`,
    /// relative order preserved. Empty (not an error) for a stream with no
    /// events yet.
    fn get_for_stream(
        &self,
        stream_id: StreamId,
    ) -> Result<Vec<EventEnvelope<JsonValue>>, EventStoreError>;

    /// Append a typed event, deriving the tag from the event itself.
    ///
    /// Keeps callers decoupled from the wire form while still persisting the
    /// event metadata needed for tag-driven decoding later.
    fn append_event<E>(
        &self,
        stream_id: StreamId,
        event: &E,
    ) -> Result<EventEnvelope<JsonValue>, EventStoreError>
    where
        E: Event + Serialize,
        Self: Sized,
    {
        let payload = serde_json::to_value(event).map_err(|e| {
            EventStoreError::InvalidAppend(format!("payload serialization failed: {e}"))
        })?;

        self.append(stream_id, event.event_id(), event.event_type(), payload)
    }
}

impl<S> EventStore for Arc<S>
where
    S: EventStore + ?Sized,
{
    fn append(
        &self,
        stream_id: StreamId,
        event_id: EventId,
        event_type: &str,
        payload: JsonValue,
    ) -> Result<EventEnvelope<JsonValue>, EventStoreError> {
        (**self).append(stream_id, event_id, event_type, payload)
    }

    fn get_all(&self) -> Result<Vec<EventEnvelope<JsonValue>>, EventStoreError> {
        (**self).get_all()
    }

    fn get_for_stream(
        &self,
        stream_id: StreamId,
    ) -> Result<Vec<EventEnvelope<JsonValue>>, EventStoreError> {
        (**self).get_for_stream(stream_id)
    }
}
