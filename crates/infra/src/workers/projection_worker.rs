use std::sync::mpsc;
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::Duration;

use serde_json::Value as JsonValue;
use tracing::warn;

use tillstream_events::{EventBus, EventEnvelope, Projection, Subscription};

/// Handle to control and join a background worker.
#[derive(Debug)]
pub struct WorkerHandle {
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl WorkerHandle {
    /// Request graceful shutdown and wait for the worker to stop.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

/// Failure while applying a bus message to a live projection.
#[derive(Debug)]
pub enum LiveApplyError<E> {
    /// The projection lock was poisoned by a panicking holder.
    Poisoned,
    /// The projection itself rejected the envelope.
    Projection(E),
}

/// Generic projection worker loop.
///
/// The event-driven alternative to rebuilding a projection per query: a
/// long-lived projection instance, explicitly owned by the caller, updated
/// from a bus subscription. Because the store publishes in append order and
/// the subscription preserves that order, the worker folds exactly the same
/// sequence a replay from the log would, so both paths agree.
///
/// - Subscribes to the bus before returning (no events are missed between
///   spawn and the first recv)
/// - Applies an idempotent handler for each message
/// - Supports graceful shutdown
#[derive(Debug)]
pub struct ProjectionWorker;

impl ProjectionWorker {
    /// Spawn a worker thread that processes events from the bus subscription.
    ///
    /// `handler` must be idempotent (at-least-once delivery safe). Handler
    /// failures are logged and the worker keeps going; the projection can be
    /// rebuilt from the store if its state is in doubt.
    pub fn spawn<M, B, H, E>(name: &'static str, bus: B, mut handler: H) -> WorkerHandle
    where
        M: Send + 'static,
        B: EventBus<M> + Send + Sync + 'static,
        H: FnMut(M) -> Result<(), E> + Send + 'static,
        E: core::fmt::Debug + Send + 'static,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let sub: Subscription<M> = bus.subscribe();

        let join = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || worker_loop(name, sub, shutdown_rx, &mut handler))
            .expect("failed to spawn projection worker thread");

        WorkerHandle {
            shutdown: shutdown_tx,
            join: Some(join),
        }
    }

    /// Spawn a worker that keeps a shared projection up to date.
    ///
    /// The projection stays owned by the caller (for reads); the worker only
    /// takes the write lock long enough to fold each envelope.
    pub fn spawn_applying<P, B>(
        name: &'static str,
        bus: B,
        projection: Arc<RwLock<P>>,
    ) -> WorkerHandle
    where
        P: Projection<Ev = JsonValue> + Send + Sync + 'static,
        B: EventBus<EventEnvelope<JsonValue>> + Send + Sync + 'static,
    {
        Self::spawn(name, bus, move |envelope: EventEnvelope<JsonValue>| {
            let mut p = projection
                .write()
                .map_err(|_| LiveApplyError::<P::Error>::Poisoned)?;
            p.apply(&envelope).map_err(LiveApplyError::Projection)
        })
    }
}

fn worker_loop<M, H, E>(
    name: &'static str,
    sub: Subscription<M>,
    shutdown_rx: mpsc::Receiver<()>,
    handler: &mut H,
) where
    H: FnMut(M) -> Result<(), E>,
    E: core::fmt::Debug,
{
    let tick = Duration::from_millis(250);

    loop {
        // Shutdown check (non-blocking)
        if shutdown_rx.try_recv().is_ok() {
            break;
        }

        match sub.recv_timeout(tick) {
            Ok(msg) => {
                if let Err(err) = handler(msg) {
                    warn!(worker = name, error = ?err, "projection worker handler failed");
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => continue,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
}
