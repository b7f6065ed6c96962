use crate::EventEnvelope;

/// A projection builds a read model by folding an ordered event sequence.
///
/// Projections are the read side of the log: given the same envelope
/// sequence in the same order, a fresh instance must always produce the same
/// derived state. That determinism is what makes read models disposable --
/// they can be rebuilt, cached, or computed on demand, while the log remains
/// the source of truth.
///
/// Contract:
/// - Envelopes are consumed strictly in the order given.
/// - Dispatch is on the envelope's type tag. Tags the projection does not
///   recognize are silently skipped; event types added later must not break
///   existing read models.
/// - Referential-integrity violations (an event referencing a record the
///   projection has never seen) fail loudly via `Error` rather than
///   silently corrupting state.
///
/// A projection may be created fresh per query and fed history from the
/// store, or kept long-lived and updated incrementally from a bus
/// subscription. Both must agree on the same history.
pub trait Projection {
    /// Payload type of the envelopes this projection folds.
    type Ev;
    /// Failure signal for decode and integrity errors.
    type Error: core::fmt::Debug + Send + Sync + 'static;

    /// Apply a single envelope, updating the read model.
    fn apply(&mut self, envelope: &EventEnvelope<Self::Ev>) -> Result<(), Self::Error>;

    /// Fold an ordered sequence of envelopes, stopping at the first error.
    fn apply_all<'a>(
        &mut self,
        envelopes: impl IntoIterator<Item = &'a EventEnvelope<Self::Ev>>,
    ) -> Result<(), Self::Error>
    where
        Self::Ev: 'a,
    {
        for envelope in envelopes {
            self.apply(envelope)?;
        }
        Ok(())
    }
}
