//! Best-effort telemetry dispatch.
//!
//! Records are queued to a single dispatcher task so the remote service sees
//! them in submission order. [`TelemetryReporter::send`] never waits: it
//! returns a [`Delivery`] the caller may inspect later. Failures are logged
//! and pushed to an optional failure channel; they never touch engine state.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use crate::core::types::{AttemptId, CompletionRecord, ErrorRecord, InputRecord};
use crate::io::remote::{Ack, NetworkError, RemoteAttemptService};

/// A record addressed to one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelemetryRecord {
    Input {
        attempt_id: AttemptId,
        record: InputRecord,
    },
    Error {
        attempt_id: AttemptId,
        record: ErrorRecord,
    },
    Completion {
        attempt_id: AttemptId,
        record: CompletionRecord,
    },
}

impl TelemetryRecord {
    pub fn attempt_id(&self) -> &AttemptId {
        match self {
            TelemetryRecord::Input { attempt_id, .. }
            | TelemetryRecord::Error { attempt_id, .. }
            | TelemetryRecord::Completion { attempt_id, .. } => attempt_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TelemetryRecord::Input { .. } => "input",
            TelemetryRecord::Error { .. } => "error",
            TelemetryRecord::Completion { .. } => "completion",
        }
    }
}

/// A send that failed, as surfaced on the failure channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryFailure {
    pub record: TelemetryRecord,
    pub error: NetworkError,
}

/// Outcome of a single send, resolved once the dispatcher handled it.
#[derive(Debug)]
pub struct Delivery {
    rx: oneshot::Receiver<Result<Ack, NetworkError>>,
    resolved: Option<Result<Ack, NetworkError>>,
}

impl Delivery {
    fn pending(rx: oneshot::Receiver<Result<Ack, NetworkError>>) -> Self {
        Self { rx, resolved: None }
    }

    fn failed(error: NetworkError) -> Self {
        let (_tx, rx) = oneshot::channel();
        Self {
            rx,
            resolved: Some(Err(error)),
        }
    }

    /// Non-blocking check. `None` while the record is still queued or in flight.
    pub fn try_result(&mut self) -> Option<Result<Ack, NetworkError>> {
        if self.resolved.is_none() {
            match self.rx.try_recv() {
                Ok(result) => self.resolved = Some(result),
                Err(oneshot::error::TryRecvError::Empty) => return None,
                Err(oneshot::error::TryRecvError::Closed) => {
                    self.resolved = Some(Err(NetworkError::new("telemetry dispatcher dropped record")));
                }
            }
        }
        self.resolved.clone()
    }

    /// Wait for the dispatcher to handle the record.
    pub async fn wait(self) -> Result<Ack, NetworkError> {
        if let Some(result) = self.resolved {
            return result;
        }
        self.rx
            .await
            .unwrap_or_else(|_| Err(NetworkError::new("telemetry dispatcher dropped record")))
    }
}

enum Envelope {
    Record {
        record: TelemetryRecord,
        reply: oneshot::Sender<Result<Ack, NetworkError>>,
    },
    Flush(oneshot::Sender<()>),
}

/// Cloneable submission handle for the telemetry dispatcher.
#[derive(Clone)]
pub struct TelemetryReporter {
    tx: mpsc::UnboundedSender<Envelope>,
}

/// Owns the dispatcher task. Joining waits until every reporter is dropped
/// and the queue is drained.
pub struct TelemetryWorker {
    handle: JoinHandle<()>,
}

impl TelemetryWorker {
    pub async fn join(self) {
        if let Err(err) = self.handle.await {
            warn!(error = %err, "telemetry dispatcher panicked");
        }
    }
}

impl TelemetryReporter {
    /// Spawn the dispatcher on the current tokio runtime.
    pub fn spawn(
        service: Arc<dyn RemoteAttemptService>,
        failures: Option<mpsc::UnboundedSender<TelemetryFailure>>,
    ) -> (Self, TelemetryWorker) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(dispatch_loop(service, rx, failures));
        (Self { tx }, TelemetryWorker { handle })
    }

    /// Queue `record` and return immediately.
    pub fn send(&self, record: TelemetryRecord) -> Delivery {
        debug!(kind = record.kind(), attempt_id = %record.attempt_id(), "queue telemetry");
        let (reply, rx) = oneshot::channel();
        match self.tx.send(Envelope::Record { record, reply }) {
            Ok(()) => Delivery::pending(rx),
            Err(mpsc::error::SendError(Envelope::Record { record, .. })) => {
                warn!(kind = record.kind(), attempt_id = %record.attempt_id(), "telemetry dispatcher stopped, record dropped");
                Delivery::failed(NetworkError::new("telemetry dispatcher stopped"))
            }
            Err(_) => Delivery::failed(NetworkError::new("telemetry dispatcher stopped")),
        }
    }

    /// Wait until every record queued before this call has been dispatched.
    pub async fn flush(&self) {
        let (done, rx) = oneshot::channel();
        if self.tx.send(Envelope::Flush(done)).is_ok() {
            let _ = rx.await;
        }
    }
}

async fn dispatch_loop(
    service: Arc<dyn RemoteAttemptService>,
    mut rx: mpsc::UnboundedReceiver<Envelope>,
    failures: Option<mpsc::UnboundedSender<TelemetryFailure>>,
) {
    while let Some(envelope) = rx.recv().await {
        match envelope {
            Envelope::Record { record, reply } => {
                let result = dispatch(service.as_ref(), &record).await;
                if let Err(error) = &result {
                    warn!(
                        kind = record.kind(),
                        attempt_id = %record.attempt_id(),
                        error = %error,
                        "telemetry send failed"
                    );
                    if let Some(failures) = &failures {
                        let _ = failures.send(TelemetryFailure {
                            record: record.clone(),
                            error: error.clone(),
                        });
                    }
                }
                let _ = reply.send(result);
            }
            Envelope::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("telemetry dispatcher stopped");
}

#[instrument(skip_all, fields(kind = record.kind(), attempt_id = %record.attempt_id()))]
async fn dispatch(
    service: &dyn RemoteAttemptService,
    record: &TelemetryRecord,
) -> Result<Ack, NetworkError> {
    match record {
        TelemetryRecord::Input { attempt_id, record } => {
            service.record_input(attempt_id, record).await
        }
        TelemetryRecord::Error { attempt_id, record } => {
            service.record_error(attempt_id, record).await
        }
        TelemetryRecord::Completion { attempt_id, record } => {
            service.complete_attempt(attempt_id, record).await
        }
    }
}
