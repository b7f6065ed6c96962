//! Purchase domain: the facts a point-of-sale purchase can emit.

pub mod events;

pub use events::{
    PurchaseEvent, PurchaseId, PurchaseItem, PurchaseMade, PurchaseRefunded, PurchaseRequested,
    PurchaseSuccessful,
};
