//! Projection implementations (read model builders).
//!
//! Projections consume stored purchase envelopes and build query-optimized
//! read models. All projections here are:
//! - **Rebuildable**: replaying the same history from a fresh instance
//!   yields the same state
//! - **Forward-compatible**: envelopes with tags outside the purchase
//!   registry are skipped, never an error
//! - **Loud on broken references**: an event pointing at a purchase the
//!   projection has never seen is a typed failure, not silent corruption

pub mod all_purchases;
pub mod avg_cost;
pub mod counts;
pub mod overview;

use thiserror::Error;

use tillstream_events::DecodeError;
use tillstream_purchase::PurchaseId;

pub use all_purchases::{AllPurchasesProjection, PurchaseRecord};
pub use avg_cost::AvgCostProjection;
pub use counts::PurchaseCountsProjection;
pub use overview::{PurchaseOverviewProjection, PurchaseStatus};

/// Failure while folding envelopes into a purchase read model.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// A known tag whose payload could not be reconstructed.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Referential-integrity violation: the event references a purchase the
    /// projection has no record of (e.g. a refund for an unknown purchase).
    #[error("event references unknown purchase {purchase_id}")]
    UnknownPurchase { purchase_id: PurchaseId },
}
