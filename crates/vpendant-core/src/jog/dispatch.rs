//! Ordered request dispatch
//!
//! The controller submits requests into an unbounded outbox without
//! waiting. A single dispatcher task drains the outbox and drives every
//! send itself, so transport calls begin in submission order on any
//! runtime. Several sends may be in flight and complete in any order.

use futures::stream::{FuturesUnordered, StreamExt};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::traits::{JogTransport, TransportResult};
use crate::data::{JogRequest, JogStopRequest};
use crate::error::TransportError;
use crate::event_bus::{AppEvent, EventBus, RequestKind, TransportEvent};

/// A request waiting to be sent
#[derive(Debug, Clone, PartialEq)]
pub enum Outgoing {
    /// Jog move.
    Jog(JogRequest),
    /// Jog stop.
    Stop(JogStopRequest),
}

impl Outgoing {
    fn axis(&self) -> &str {
        match self {
            Outgoing::Jog(request) => &request.axis,
            Outgoing::Stop(request) => &request.axis,
        }
    }
}

/// Sending half of the dispatch queue
#[derive(Debug)]
pub struct Outbox {
    tx: Mutex<Option<mpsc::UnboundedSender<Outgoing>>>,
    in_flight: Arc<AtomicUsize>,
}

impl Outbox {
    /// Queue a request; returns false once the outbox is closed
    pub fn submit(&self, request: Outgoing) -> bool {
        let guard = self.tx.lock();
        match guard.as_ref() {
            Some(tx) => {
                self.in_flight.fetch_add(1, Ordering::SeqCst);
                if tx.send(request).is_err() {
                    self.in_flight.fetch_sub(1, Ordering::SeqCst);
                    tracing::warn!("Jog dispatcher is gone, request dropped");
                    return false;
                }
                true
            }
            None => {
                tracing::warn!("Outbox closed, dropping {:?}", request);
                false
            }
        }
    }

    /// Stop accepting requests; already queued ones are still sent
    pub fn close(&self) {
        self.tx.lock().take();
    }

    /// Requests submitted but not yet completed
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

/// Spawn the dispatcher task for `transport`
///
/// Must be called from within a tokio runtime. The task ends after the
/// outbox is closed (or dropped) and every queued request has completed.
pub fn spawn_dispatcher(
    transport: Arc<dyn JogTransport>,
    events: Arc<EventBus>,
) -> (Outbox, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<Outgoing>();
    let in_flight = Arc::new(AtomicUsize::new(0));
    let counter = in_flight.clone();

    let handle = tokio::spawn(async move {
        // Pushed futures are first polled in push order.
        let mut sends = FuturesUnordered::new();
        let mut open = true;

        loop {
            tokio::select! {
                biased;
                request = rx.recv(), if open => match request {
                    Some(request) => sends.push(deliver(
                        transport.clone(),
                        events.clone(),
                        counter.clone(),
                        request,
                    )),
                    None => open = false,
                },
                Some(()) = sends.next(), if !sends.is_empty() => {}
                else => break,
            }
        }
        tracing::debug!("Jog dispatcher finished");
    });

    (
        Outbox {
            tx: Mutex::new(Some(tx)),
            in_flight,
        },
        handle,
    )
}

async fn deliver(
    transport: Arc<dyn JogTransport>,
    events: Arc<EventBus>,
    in_flight: Arc<AtomicUsize>,
    request: Outgoing,
) {
    let axis = request.axis().to_string();
    let (kind, result) = match request {
        Outgoing::Jog(request) => (RequestKind::Jog, transport.send_jog(request).await),
        Outgoing::Stop(request) => (RequestKind::Stop, transport.send_jog_stop(request).await),
    };
    report(&events, kind, axis, result);
    in_flight.fetch_sub(1, Ordering::SeqCst);
}

fn report(events: &EventBus, kind: RequestKind, axis: String, result: TransportResult) {
    let failure = match result {
        Ok(response) if response.success => {
            tracing::debug!("{:?} on {} delivered: {}", kind, axis, response.message);
            let _ = events.publish(AppEvent::Transport(TransportEvent::Delivered {
                kind,
                message: response.message,
            }));
            return;
        }
        Ok(response) => TransportError::Rejected {
            message: response.message,
        },
        Err(err) => err,
    };

    tracing::warn!("{:?} on {} failed: {}", kind, axis, failure);
    let error = failure.to_string();
    let event = match kind {
        RequestKind::Jog => TransportEvent::JogFailed { axis, error },
        RequestKind::Stop => TransportEvent::StopFailed { axis, error },
    };
    let _ = events.publish(AppEvent::Transport(event));
}
