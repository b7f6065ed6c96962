//! Infrastructure layer: the in-memory event store, concrete projections,
//! background projection workers, and telemetry setup.

pub mod event_store;
pub mod projections;
pub mod telemetry;
pub mod workers;


pub use event_store::{EventStore, EventStoreError, InMemoryEventStore};
pub use projections::{
    AllPurchasesProjection, AvgCostProjection, ProjectionError, PurchaseCountsProjection,
    PurchaseOverviewProjection, PurchaseRecord, PurchaseStatus,
};
pub use workers::{LiveApplyError, ProjectionWorker, WorkerHandle};
