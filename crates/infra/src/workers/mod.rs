//! Background workers keeping long-lived projections in sync with the log.

pub mod projection_worker;

pub use projection_worker::{LiveApplyError, ProjectionWorker, WorkerHandle};
