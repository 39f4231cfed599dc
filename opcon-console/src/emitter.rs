//! Ordered, fire-and-forget event delivery
//!
//! Session events and end calls go through one FIFO queue drained by a
//! single dispatcher task, so the service sees them in the order the
//! operator acted: every event of a session before its end. Emitting never
//! waits on the network. Delivery failures are logged and dropped; nothing
//! is retried.

use opcon_common::events::{EventRecord, SessionEvent};
use opcon_common::models::SessionId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::client::AggregationService;
use crate::error::{Error, Result};
use crate::session::SessionState;

enum Dispatch {
    Event {
        session_id: SessionId,
        record: EventRecord,
    },
    End {
        session_id: SessionId,
        last_position: f64,
        completed: bool,
        done: oneshot::Sender<Result<()>>,
    },
    Flush {
        done: oneshot::Sender<()>,
    },
}

/// Delivery counters, readable while the dispatcher runs
#[derive(Debug, Default)]
pub struct DispatchCounters {
    delivered: AtomicU64,
    failed: AtomicU64,
}

/// End call queued behind every event emitted before it
pub struct PendingEnd(oneshot::Receiver<Result<()>>);

impl PendingEnd {
    /// Wait for the service's answer to the end call
    pub async fn wait(self) -> Result<()> {
        self.0
            .await
            .unwrap_or_else(|_| Err(Error::Service("Event dispatcher stopped.".to_string())))
    }
}

pub struct EventEmitter {
    tx: mpsc::UnboundedSender<Dispatch>,
    worker: JoinHandle<()>,
    counters: Arc<DispatchCounters>,
}

impl EventEmitter {
    /// Start the dispatcher task. Must be called inside a Tokio runtime.
    pub fn spawn(service: Arc<dyn AggregationService>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let counters = Arc::new(DispatchCounters::default());

        let worker = tokio::spawn(dispatch_worker(service, rx, Arc::clone(&counters)));

        Self { tx, worker, counters }
    }

    /// Queue an event against the active session.
    ///
    /// `position` is the playhead at the moment of the action. Returns false
    /// (and sends nothing) unless `state` is `Active`.
    pub fn emit(&self, state: SessionState, event: &SessionEvent, position: f64) -> bool {
        let Some(session_id) = state.active_session() else {
            debug!(
                event_type = event.event_type().as_str(),
                state = state.name(),
                "No active session, event not dispatched"
            );
            return false;
        };

        let record = event.record(position);
        if self.tx.send(Dispatch::Event { session_id, record }).is_err() {
            warn!(session_id = %session_id, "Event dispatcher stopped, event dropped");
            return false;
        }
        true
    }

    /// Queue the end call for a session
    pub fn end(&self, session_id: SessionId, last_position: f64, completed: bool) -> PendingEnd {
        let (done, rx) = oneshot::channel();
        let dispatch = Dispatch::End {
            session_id,
            last_position,
            completed,
            done,
        };
        if self.tx.send(dispatch).is_err() {
            warn!(session_id = %session_id, "Event dispatcher stopped, end not sent");
        }
        PendingEnd(rx)
    }

    /// Wait until everything queued so far has been delivered or dropped
    pub async fn flush(&self) {
        let (done, rx) = oneshot::channel();
        if self.tx.send(Dispatch::Flush { done }).is_ok() {
            let _ = rx.await;
        }
    }

    pub fn delivered(&self) -> u64 {
        self.counters.delivered.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.counters.failed.load(Ordering::Relaxed)
    }

    /// Drain the queue and stop the dispatcher
    pub async fn shutdown(self) {
        drop(self.tx);
        let _ = self.worker.await;
    }
}

async fn dispatch_worker(
    service: Arc<dyn AggregationService>,
    mut rx: mpsc::UnboundedReceiver<Dispatch>,
    counters: Arc<DispatchCounters>,
) {
    while let Some(dispatch) = rx.recv().await {
        match dispatch {
            Dispatch::Event { session_id, record } => {
                match service.record_event(session_id, &record).await {
                    Ok(()) => {
                        counters.delivered.fetch_add(1, Ordering::Relaxed);
                        debug!(
                            session_id = %session_id,
                            event_type = record.event_type.as_str(),
                            position = record.position,
                            "Event delivered"
                        );
                    }
                    Err(e) => {
                        counters.failed.fetch_add(1, Ordering::Relaxed);
                        warn!(
                            session_id = %session_id,
                            event_type = record.event_type.as_str(),
                            error = %e,
                            "Event delivery failed"
                        );
                    }
                }
            }
            Dispatch::End {
                session_id,
                last_position,
                completed,
                done,
            } => {
                let result = service.end_session(session_id, last_position, completed).await;
                if let Err(e) = &result {
                    warn!(session_id = %session_id, error = %e, "End session failed");
                }
                let _ = done.send(result);
            }
            Dispatch::Flush { done } => {
                let _ = done.send(());
            }
        }
    }
    debug!("Event dispatcher stopped");
}
