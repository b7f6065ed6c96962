use chrono::{DateTime, Utc};

use tillstream_core::EventId;

/// A domain-agnostic event.
///
/// Events are:
/// - **immutable** (treat them as facts)
/// - **append-only** (never updated or deleted once stored)
/// - identified by an explicit **type tag**, never by payload shape
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name/type identifier (e.g. "purchase.requested").
    ///
    /// Two events may share a payload shape yet represent distinct facts;
    /// the tag is what distinguishes them, at write time and at decode time.
    fn event_type(&self) -> &'static str;

    /// Globally unique identifier, assigned exactly once at creation.
    fn event_id(&self) -> EventId;

    /// When the event occurred (business time), assigned at creation.
    fn occurred_at(&self) -> DateTime<Utc>;
}
