use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use tillstream_core::{EventId, StreamId};
use tillstream_events::{DecodeError, Event};

/// Purchase identifier. One purchase corresponds to one event stream.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PurchaseId(pub StreamId);

impl PurchaseId {
    pub fn new(id: StreamId) -> Self {
        Self(id)
    }

    pub fn stream_id(&self) -> StreamId {
        self.0
    }
}

impl core::fmt::Display for PurchaseId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A line item on a purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseItem {
    pub item_id: Uuid,
    pub name: String,
    /// Price in smallest currency unit (e.g., cents).
    pub amount_minor: u64,
}

/// Event: a purchase was requested and is now in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRequested {
    pub event_id: EventId,
    pub occurred_at: DateTime<Utc>,
    pub purchase_id: PurchaseId,
    /// Total amount in smallest currency unit (e.g., cents).
    pub amount_minor: u64,
    pub items: Vec<PurchaseItem>,
}

/// Event: a purchase was made (completed at the till).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseMade {
    pub event_id: EventId,
    pub occurred_at: DateTime<Utc>,
    pub purchase_id: PurchaseId,
    pub amount_minor: u64,
}

/// Event: an in-flight purchase request completed successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseSuccessful {
    pub event_id: EventId,
    pub occurred_at: DateTime<Utc>,
    pub purchase_id: PurchaseId,
}

/// Event: a purchase was refunded.
///
/// Same payload shape as [`PurchaseSuccessful`], yet a different fact.
/// Only the type tag tells them apart; that is the point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRefunded {
    pub event_id: EventId,
    pub occurred_at: DateTime<Utc>,
    pub purchase_id: PurchaseId,
}

impl PurchaseRequested {
    pub fn new(purchase_id: PurchaseId, amount_minor: u64, items: Vec<PurchaseItem>) -> Self {
        Self {
            event_id: EventId::new(),
            occurred_at: Utc::now(),
            purchase_id,
            amount_minor,
            items,
        }
    }
}

impl PurchaseMade {
    pub fn new(purchase_id: PurchaseId, amount_minor: u64) -> Self {
        Self {
            event_id: EventId::new(),
            occurred_at: Utc::now(),
            purchase_id,
            amount_minor,
        }
    }
}

impl PurchaseSuccessful {
    pub fn new(purchase_id: PurchaseId) -> Self {
        Self {
            event_id: EventId::new(),
            occurred_at: Utc::now(),
            purchase_id,
        }
    }
}

impl PurchaseRefunded {
    pub fn new(purchase_id: PurchaseId) -> Self {
        Self {
            event_id: EventId::new(),
            occurred_at: Utc::now(),
            purchase_id,
        }
    }
}

/// All purchase domain events, tagged by an explicit discriminant.
///
/// The tag is serialized into the payload (`"type"` field), so a stored
/// payload can never be reinterpreted as a different variant: decoding is
/// driven by the tag, never by field shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PurchaseEvent {
    #[serde(rename = "purchase.requested")]
    Requested(PurchaseRequested),
    #[serde(rename = "purchase.made")]
    Made(PurchaseMade),
    #[serde(rename = "purchase.successful")]
    Successful(PurchaseSuccessful),
    #[serde(rename = "purchase.refunded")]
    Refunded(PurchaseRefunded),
}

impl PurchaseEvent {
    pub const REQUESTED: &'static str = "purchase.requested";
    pub const MADE: &'static str = "purchase.made";
    pub const SUCCESSFUL: &'static str = "purchase.successful";
    pub const REFUNDED: &'static str = "purchase.refunded";

    /// The closed set of tags this registry can decode.
    pub const TYPES: [&'static str; 4] = [
        Self::REQUESTED,
        Self::MADE,
        Self::SUCCESSFUL,
        Self::REFUNDED,
    ];

    /// Whether `tag` names a purchase event. Folds use this to skip
    /// envelopes from event types they do not recognize.
    pub fn is_known_type(tag: &str) -> bool {
        Self::TYPES.contains(&tag)
    }

    pub fn purchase_id(&self) -> PurchaseId {
        match self {
            PurchaseEvent::Requested(e) => e.purchase_id,
            PurchaseEvent::Made(e) => e.purchase_id,
            PurchaseEvent::Successful(e) => e.purchase_id,
            PurchaseEvent::Refunded(e) => e.purchase_id,
        }
    }

    /// Serialize for storage. The type tag is embedded in the payload.
    pub fn encode(&self) -> Result<JsonValue, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Tag-driven decode of a stored payload.
    ///
    /// - A tag outside [`PurchaseEvent::TYPES`] is `UnknownEventType`.
    /// - A payload that decodes as a different variant than the declared tag
    ///   is `TagMismatch`, even when the field shapes are identical.
    /// - A payload that cannot be reconstructed at all is `Payload`.
    pub fn decode(tag: &str, payload: &JsonValue) -> Result<Self, DecodeError> {
        if !Self::is_known_type(tag) {
            return Err(DecodeError::UnknownEventType {
                tag: tag.to_string(),
            });
        }

        let event: PurchaseEvent = serde_json::from_value(payload.clone())?;
        if event.event_type() != tag {
            return Err(DecodeError::TagMismatch {
                expected: tag.to_string(),
                found: event.event_type().to_string(),
            });
        }

        Ok(event)
    }
}

impl Event for PurchaseEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PurchaseEvent::Requested(_) => Self::REQUESTED,
            PurchaseEvent::Made(_) => Self::MADE,
            PurchaseEvent::Successful(_) => Self::SUCCESSFUL,
            PurchaseEvent::Refunded(_) => Self::REFUNDED,
        }
    }

    fn event_id(&self) -> EventId {
        match self {
            PurchaseEvent::Requested(e) => e.event_id,
            PurchaseEvent::Made(e) => e.event_id,
            PurchaseEvent::Successful(e) => e.event_id,
            PurchaseEvent::Refunded(e) => e.event_id,
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            PurchaseEvent::Requested(e) => e.occurred_at,
            PurchaseEvent::Made(e) => e.occurred_at,
            PurchaseEvent::Successful(e) => e.occurred_at,
            PurchaseEvent::Refunded(e) => e.occurred_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_purchase_id() -> PurchaseId {
        PurchaseId::new(StreamId::new())
    }

    #[test]
    fn construction_assigns_id_and_timestamp_once() {
        let purchase_id = test_purchase_id();
        let a = PurchaseRequested::new(purchase_id, 19_900, vec![]);
        let b = PurchaseRequested::new(purchase_id, 19_900, vec![]);

        assert_ne!(a.event_id, b.event_id);
        assert_eq!(a.purchase_id, b.purchase_id);
    }

    #[test]
    fn encode_then_decode_round_trips() {
        let event = PurchaseEvent::Requested(PurchaseRequested::new(
            test_purchase_id(),
            5_055,
            vec![PurchaseItem {
                item_id: Uuid::now_v7(),
                name: "Work Desk".to_string(),
                amount_minor: 5_055,
            }],
        ));

        let payload = event.encode().unwrap();
        let decoded = PurchaseEvent::decode(event.event_type(), &payload).unwrap();
        assert_eq!(event, decoded);
    }

    #[test]
    fn decoding_under_the_wrong_tag_fails() {
        // Successful and Refunded share a payload shape; the tag must still
        // keep them apart.
        let event = PurchaseEvent::Successful(PurchaseSuccessful::new(test_purchase_id()));
        let payload = event.encode().unwrap();

        let err = PurchaseEvent::decode(PurchaseEvent::REFUNDED, &payload).unwrap_err();
        assert!(matches!(err, DecodeError::TagMismatch { .. }));
    }

    #[test]
    fn decoding_an_unknown_tag_fails() {
        let event = PurchaseEvent::Made(PurchaseMade::new(test_purchase_id(), 100));
        let payload = event.encode().unwrap();

        let err = PurchaseEvent::decode("purchase.cancelled", &payload).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownEventType { .. }));
    }

    #[test]
    fn decoding_a_malformed_payload_fails() {
        let payload = serde_json::json!({ "type": "purchase.made" });
        let err = PurchaseEvent::decode(PurchaseEvent::MADE, &payload).unwrap_err();
        assert!(matches!(err, DecodeError::Payload(_)));
    }

    #[test]
    fn each_variant_reports_its_own_tag() {
        let id = test_purchase_id();
        let cases: Vec<(PurchaseEvent, &str)> = vec![
            (
                PurchaseEvent::Requested(PurchaseRequested::new(id, 1, vec![])),
                PurchaseEvent::REQUESTED,
            ),
            (
                PurchaseEvent::Made(PurchaseMade::new(id, 1)),
                PurchaseEvent::MADE,
            ),
            (
                PurchaseEvent::Successful(PurchaseSuccessful::new(id)),
                PurchaseEvent::SUCCESSFUL,
            ),
            (
                PurchaseEvent::Refunded(PurchaseRefunded::new(id)),
                PurchaseEvent::REFUNDED,
            ),
        ];

        for (event, tag) in cases {
            assert_eq!(event.event_type(), tag);
            assert!(PurchaseEvent::is_known_type(tag));
        }
    }
}
