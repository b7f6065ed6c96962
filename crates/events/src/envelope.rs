use serde::{Deserialize, Serialize};

use tillstream_core::{EventId, StreamId};

/// Envelope for an event, carrying the stream and type-tag metadata.
///
/// This is the unit actually appended to the log.
///
/// Notes:
/// - **Stream partitioning** happens here via `stream_id`; a stream is the
///   subsequence of the log sharing one `stream_id`.
/// - **Append-only**: `position` is the global insertion index, assigned by
///   the store at append time; it is the only ordering guarantee.
/// - `event_type` must unambiguously identify the payload variant so that a
///   consumer can reinterpret the otherwise-untyped payload. Decoding is
///   driven by this tag, never by the payload's shape.
/// - Created once, at append time; immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: EventId,
    stream_id: StreamId,

    /// Global insertion index in the log (1-based), monotonically increasing.
    position: u64,

    event_type: String,
    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(
        event_id: EventId,
        stream_id: StreamId,
        position: u64,
        event_type: impl Into<String>,
        payload: E,
    ) -> Self {
        Self {
            event_id,
            stream_id,
            position,
            event_type: event_type.into(),
            payload,
        }
    }

    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    pub fn stream_id(&self) -> StreamId {
        self.stream_id
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}
