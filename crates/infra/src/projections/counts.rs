use serde_json::Value as JsonValue;

use tillstream_events::{EventEnvelope, Projection};
use tillstream_purchase::PurchaseEvent;

use super::ProjectionError;

/// Counts purchase activity across the whole log.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseCountsProjection {
    requests: u64,
    purchases: u64,
}

impl PurchaseCountsProjection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `purchase.requested` events seen.
    pub fn requests(&self) -> u64 {
        self.requests
    }

    /// Number of `purchase.successful` events seen.
    pub fn purchases(&self) -> u64 {
        self.purchases
    }
}

impl Projection for PurchaseCountsProjection {
    type Ev = JsonValue;
    type Error = ProjectionError;

    fn apply(&mut self, envelope: &EventEnvelope<JsonValue>) -> Result<(), Self::Error> {
        let tag = envelope.event_type();
        if !PurchaseEvent::is_known_type(tag) {
            return Ok(());
        }

        match PurchaseEvent::decode(tag, envelope.payload())? {
            PurchaseEvent::Requested(_) => self.requests += 1,
            PurchaseEvent::Successful(_) => self.purchases += 1,
            PurchaseEvent::Made(_) | PurchaseEvent::Refunded(_) => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tillstream_core::StreamId;
    use tillstream_events::Event;
    use tillstream_purchase::{PurchaseId, PurchaseRequested, PurchaseSuccessful};

    fn envelope(position: u64, event: &PurchaseEvent) -> EventEnvelope<JsonValue> {
        EventEnvelope::new(
            event.event_id(),
            event.purchase_id().stream_id(),
            position,
            event.event_type(),
            event.encode().unwrap(),
        )
    }

    #[test]
    fn three_requests_one_success() {
        let ids: Vec<PurchaseId> = (0..3).map(|_| PurchaseId::new(StreamId::new())).collect();

        let mut history = Vec::new();
        for (i, id) in ids.iter().enumerate() {
            history.push(envelope(
                i as u64 + 1,
                &PurchaseEvent::Requested(PurchaseRequested::new(*id, 100, vec![])),
            ));
        }
        history.push(envelope(
            4,
            &PurchaseEvent::Successful(PurchaseSuccessful::new(ids[0])),
        ));

        let mut counts = PurchaseCountsProjection::new();
        counts.apply_all(&history).unwrap();

        assert_eq!(counts.requests(), 3);
        assert_eq!(counts.purchases(), 1);
    }
}
