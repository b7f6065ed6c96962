//! Projection runner utilities (read model builders).
//!
//! Read models are **disposable**; events are the source of truth. This
//! module provides deterministic replay plus cursor tracking so a long-lived
//! projection cannot silently fold the log out of order.

use thiserror::Error;

use crate::{EventEnvelope, Projection};

/// Tracks how far into the log a projection has folded.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ProjectionCursor {
    last_position: u64,
}

impl ProjectionCursor {
    pub fn last_position(&self) -> u64 {
        self.last_position
    }
}

#[derive(Debug, Error)]
pub enum RunnerError<E> {
    /// The envelope's log position does not strictly increase the cursor.
    #[error("non-monotonic log position (last={last}, found={found})")]
    NonMonotonicPosition { last: u64, found: u64 },

    /// The underlying projection rejected the envelope.
    #[error("projection failed: {0:?}")]
    Projection(E),
}

/// Runs envelopes through a projection and tracks progress.
#[derive(Debug)]
pub struct ProjectionRunner<P>
where
    P: Projection,
{
    projection: P,
    cursor: Option<ProjectionCursor>,
}

impl<P> ProjectionRunner<P>
where
    P: Projection,
{
    pub fn new(projection: P) -> Self {
        Self {
            projection,
            cursor: None,
        }
    }

    pub fn projection(&self) -> &P {
        &self.projection
    }

    pub fn into_projection(self) -> P {
        self.projection
    }

    /// Current cursor for this projection (if any envelopes were applied).
    pub fn cursor(&self) -> Option<ProjectionCursor> {
        self.cursor
    }

    /// Apply a single envelope, enforcing strictly increasing log positions.
    pub fn apply(
        &mut self,
        envelope: &EventEnvelope<P::Ev>,
    ) -> Result<(), RunnerError<P::Error>> {
        let found = envelope.position();

        if let Some(cursor) = self.cursor {
            if found <= cursor.last_position {
                return Err(RunnerError::NonMonotonicPosition {
                    last: cursor.last_position,
                    found,
                });
            }
        }

        self.projection
            .apply(envelope)
            .map_err(RunnerError::Projection)?;

        self.cursor = Some(ProjectionCursor {
            last_position: found,
        });
        Ok(())
    }

    /// Apply many envelopes in order.
    pub fn run<'a>(
        &mut self,
        envelopes: impl IntoIterator<Item = &'a EventEnvelope<P::Ev>>,
    ) -> Result<(), RunnerError<P::Error>>
    where
        P::Ev: 'a,
    {
        for env in envelopes {
            self.apply(env)?;
        }
        Ok(())
    }

    /// Rebuild a projection from scratch by replaying the full event history.
    ///
    /// The factory is used to create a fresh projection instance.
    pub fn rebuild_from_scratch<'a>(
        factory: impl FnOnce() -> P,
        envelopes: impl IntoIterator<Item = &'a EventEnvelope<P::Ev>>,
    ) -> Result<(P, Option<ProjectionCursor>), RunnerError<P::Error>>
    where
        P::Ev: 'a,
    {
        let mut runner = ProjectionRunner::new(factory());
        runner.run(envelopes)?;
        Ok((runner.projection, runner.cursor))
    }
}
