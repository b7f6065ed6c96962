use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

use tillstream_events::{EventEnvelope, Projection};
use tillstream_purchase::{
    PurchaseEvent, PurchaseId, PurchaseMade, PurchaseRefunded, PurchaseRequested,
    PurchaseSuccessful,
};

use super::ProjectionError;

/// Lifecycle of a single purchase as seen by the overview.
///
/// ```text
/// NotStarted --Requested--> Requested --Successful--> Succeeded
///                               |                        |
///                               +-------Refunded---------+--> Refunded (terminal)
/// ```
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum PurchaseStatus {
    #[default]
    NotStarted,
    Requested,
    Succeeded,
    Refunded,
}

/// General view of one purchase, folded from its stream.
///
/// Scoped to a single stream: feed it `get_for_stream(purchase)` in order.
/// Create a fresh instance per query; determinism makes that cheap and safe.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PurchaseOverviewProjection {
    purchase_id: Option<PurchaseId>,
    amount_minor: u64,
    purchased_at: Option<DateTime<Utc>>,
    status: PurchaseStatus,
}

impl PurchaseOverviewProjection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn purchase_id(&self) -> Option<PurchaseId> {
        self.purchase_id
    }

    pub fn amount_minor(&self) -> u64 {
        self.amount_minor
    }

    pub fn purchased_at(&self) -> Option<DateTime<Utc>> {
        self.purchased_at
    }

    pub fn status(&self) -> PurchaseStatus {
        self.status
    }

    pub fn is_request_in_flight(&self) -> bool {
        self.status == PurchaseStatus::Requested
    }

    pub fn was_refunded(&self) -> bool {
        self.status == PurchaseStatus::Refunded
    }

    fn apply_requested(&mut self, event: PurchaseRequested) {
        self.purchase_id = Some(event.purchase_id);
        self.amount_minor = event.amount_minor;
        self.purchased_at = Some(event.occurred_at);
        self.status = PurchaseStatus::Requested;
    }

    fn apply_made(&mut self, event: PurchaseMade) {
        // A made purchase is complete; there is no in-flight phase.
        self.purchase_id = Some(event.purchase_id);
        self.amount_minor = event.amount_minor;
        self.purchased_at = Some(event.occurred_at);
        self.status = PurchaseStatus::Succeeded;
    }

    fn apply_successful(&mut self, _event: PurchaseSuccessful) {
        // Clears the in-flight flag. Without a prior record there is
        // nothing to clear; the event is ignored.
        if self.status == PurchaseStatus::Requested {
            self.status = PurchaseStatus::Succeeded;
        }
    }

    fn apply_refunded(&mut self, event: PurchaseRefunded) -> Result<(), ProjectionError> {
        if self.purchase_id.is_none() {
            return Err(ProjectionError::UnknownPurchase {
                purchase_id: event.purchase_id,
            });
        }
        self.status = PurchaseStatus::Refunded;
        Ok(())
    }
}

impl Projection for PurchaseOverviewProjection {
    type Ev = JsonValue;
    type Error = ProjectionError;

    fn apply(&mut self, envelope: &EventEnvelope<JsonValue>) -> Result<(), Self::Error> {
        let tag = envelope.event_type();
        if !PurchaseEvent::is_known_type(tag) {
            return Ok(());
        }

        let event = PurchaseEvent::decode(tag, envelope.payload())?;

        // Refunded is terminal for this view.
        if self.status == PurchaseStatus::Refunded {
            return Ok(());
        }

        match event {
            PurchaseEvent::Requested(e) => self.apply_requested(e),
            PurchaseEvent::Made(e) => self.apply_made(e),
            PurchaseEvent::Successful(e) => self.apply_successful(e),
            PurchaseEvent::Refunded(e) => self.apply_refunded(e)?,
        }

        Ok(())
    }
}
