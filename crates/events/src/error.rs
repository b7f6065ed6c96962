//! Decode error taxonomy for the tag-driven serialization boundary.

use thiserror::Error;

/// Failure to reconstruct a typed event from a stored envelope.
///
/// Decoding is driven by the envelope's type tag, never by payload shape.
/// These errors surface to the caller; they are never silently defaulted.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The tag is present but not known to the decoding registry.
    #[error("unknown event type tag '{tag}'")]
    UnknownEventType { tag: String },

    /// The payload decodes as a different variant than the tag declares.
    ///
    /// Guards against the bug class where two variants share a field shape
    /// and a payload is silently reinterpreted as the wrong fact.
    #[error("event type tag mismatch: envelope declares '{expected}', payload is '{found}'")]
    TagMismatch { expected: String, found: String },

    /// The payload cannot be reconstructed for its declared tag.
    #[error("failed to decode event payload: {0}")]
    Payload(#[from] serde_json::Error),
}
