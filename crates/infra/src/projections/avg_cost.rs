use serde_json::Value as JsonValue;

use tillstream_events::{EventEnvelope, Projection};
use tillstream_purchase::PurchaseEvent;

use super::ProjectionError;

/// Running average cost of made purchases.
///
/// Keeps a running sum and count, updated in O(1) per event; the average is
/// never recomputed by rescanning history. Suitable as a long-lived "live"
/// projection fed from a bus subscription.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AvgCostProjection {
    sum_minor: u64,
    count: u64,
}

impl AvgCostProjection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn sum_minor(&self) -> u64 {
        self.sum_minor
    }

    /// Average purchase amount in minor units; `None` before any purchase.
    pub fn average_minor(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum_minor as f64 / self.count as f64)
        }
    }
}

impl Projection for AvgCostProjection {
    type Ev = JsonValue;
    type Error = ProjectionError;

    fn apply(&mut self, envelope: &EventEnvelope<JsonValue>) -> Result<(), Self::Error> {
        let tag = envelope.event_type();
        if !PurchaseEvent::is_known_type(tag) {
            return Ok(());
        }

        if let PurchaseEvent::Made(e) = PurchaseEvent::decode(tag, envelope.payload())? {
            self.sum_minor += e.amount_minor;
            self.count += 1;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tillstream_core::StreamId;
    use tillstream_events::Event;
    use tillstream_purchase::{PurchaseId, PurchaseMade, PurchaseRefunded};

    fn made_envelope(position: u64, amount_minor: u64) -> EventEnvelope<JsonValue> {
        let event = PurchaseEvent::Made(PurchaseMade::new(
            PurchaseId::new(StreamId::new()),
            amount_minor,
        ));
        EventEnvelope::new(
            event.event_id(),
            event.purchase_id().stream_id(),
            position,
            event.event_type(),
            event.encode().unwrap(),
        )
    }

    #[test]
    fn average_updates_incrementally_per_apply() {
        let mut avg = AvgCostProjection::new();
        assert_eq!(avg.average_minor(), None);

        avg.apply(&made_envelope(1, 100)).unwrap();
        assert_eq!(avg.average_minor(), Some(100.0));

        avg.apply(&made_envelope(2, 200)).unwrap();
        assert_eq!(avg.average_minor(), Some(150.0));
        assert_eq!(avg.count(), 2);
        assert_eq!(avg.sum_minor(), 300);
    }

    #[test]
    fn non_made_events_do_not_move_the_average() {
        let purchase_id = PurchaseId::new(StreamId::new());
        let refunded = PurchaseEvent::Refunded(PurchaseRefunded::new(purchase_id));

        let mut avg = AvgCostProjection::new();
        avg.apply(&made_envelope(1, 100)).unwrap();
        avg.apply(&EventEnvelope::new(
            refunded.event_id(),
            purchase_id.stream_id(),
            2,
            refunded.event_type(),
            refunded.encode().unwrap(),
        ))
        .unwrap();

        assert_eq!(avg.average_minor(), Some(100.0));
    }
}
