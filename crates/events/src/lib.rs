//! Event-sourcing mechanics: events, envelopes, pub/sub, projections.
//!
//! This crate is domain-agnostic. It knows nothing about purchases; it only
//! defines how facts are wrapped, distributed, and folded into read models.

pub mod bus;
pub mod envelope;
pub mod error;
pub mod event;
pub mod in_memory_bus;
pub mod projection;
pub mod runner;

pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use error::DecodeError;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
pub use projection::Projection;
pub use runner::{ProjectionCursor, ProjectionRunner, RunnerError};
