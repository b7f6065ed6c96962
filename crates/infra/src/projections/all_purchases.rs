use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

use tillstream_events::{EventEnvelope, Projection};
use tillstream_purchase::{PurchaseEvent, PurchaseId};

use super::ProjectionError;

/// One row in the store-wide purchase list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseRecord {
    pub purchase_id: PurchaseId,
    pub amount_minor: u64,
    pub purchased_at: DateTime<Utc>,
    pub was_refunded: bool,
}

/// Store-wide list of purchases, in first-seen order.
///
/// Feed it the whole log (`get_all`); it picks out the purchase events it
/// cares about and ignores everything else.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AllPurchasesProjection {
    purchases: Vec<PurchaseRecord>,
    // Index into `purchases` by id; the Vec keeps first-seen order for reads.
    by_id: HashMap<PurchaseId, usize>,
}

impl AllPurchasesProjection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn purchases(&self) -> &[PurchaseRecord] {
        &self.purchases
    }

    pub fn get(&self, purchase_id: PurchaseId) -> Option<&PurchaseRecord> {
        self.by_id.get(&purchase_id).map(|&i| &self.purchases[i])
    }

    pub fn len(&self) -> usize {
        self.purchases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.purchases.is_empty()
    }

    fn upsert(&mut self, purchase_id: PurchaseId, amount_minor: u64, at: DateTime<Utc>) {
        match self.by_id.get(&purchase_id) {
            Some(&i) => {
                let record = &mut self.purchases[i];
                record.amount_minor = amount_minor;
                record.purchased_at = at;
            }
            None => {
                self.by_id.insert(purchase_id, self.purchases.len());
                self.purchases.push(PurchaseRecord {
                    purchase_id,
                    amount_minor,
                    purchased_at: at,
                    was_refunded: false,
                });
            }
        }
    }

    fn mark_refunded(&mut self, purchase_id: PurchaseId) -> Result<(), ProjectionError> {
        match self.by_id.get(&purchase_id) {
            Some(&i) => {
                self.purchases[i].was_refunded = true;
                Ok(())
            }
            None => Err(ProjectionError::UnknownPurchase { purchase_id }),
        }
    }
}

impl Projection for AllPurchasesProjection {
    type Ev = JsonValue;
    type Error = ProjectionError;

    fn apply(&mut self, envelope: &EventEnvelope<JsonValue>) -> Result<(), Self::Error> {
        let tag = envelope.event_type();
        if !PurchaseEvent::is_known_type(tag) {
            return Ok(());
        }

        match PurchaseEvent::decode(tag, envelope.payload())? {
            PurchaseEvent::Requested(e) => {
                self.upsert(e.purchase_id, e.amount_minor, e.occurred_at)
            }
            PurchaseEvent::Made(e) => self.upsert(e.purchase_id, e.amount_minor, e.occurred_at),
            PurchaseEvent::Successful(_) => {}
            PurchaseEvent::Refunded(e) => self.mark_refunded(e.purchase_id)?,
        }

        Ok(())
    }
}
