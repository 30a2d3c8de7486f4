//! Attempt lifecycle: remote creation, record labelling, and exactly-once
//! completion.
//!
//! Attempt state moves `Created → Running → {Succeeded | Failed | Abandoned}`
//! and never leaves a terminal state. At most one attempt is `Running` at a
//! time. [`RunningAttempt`] owns the running attempt and abandons it on drop,
//! so no exit path of the driver leaves an attempt `Running`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::types::{AttemptId, AttemptState, CompletionRecord, StepRecord};
use crate::io::remote::RemoteAttemptService;
use crate::io::telemetry::{Delivery, TelemetryRecord, TelemetryReporter};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptError {
    /// The remote service did not produce a usable attempt id.
    #[error("backend unavailable: {message}")]
    BackendUnavailable { message: String },
    /// Another attempt is still running.
    #[error("attempt {attempt_id} is already running")]
    AlreadyRunning { attempt_id: AttemptId },
    #[error("unknown attempt {attempt_id}")]
    UnknownAttempt { attempt_id: AttemptId },
    #[error("attempt {attempt_id} cannot start from state {from:?}")]
    InvalidTransition {
        attempt_id: AttemptId,
        from: AttemptState,
    },
}

/// Local bookkeeping for one attempt.
#[derive(Debug, Clone)]
struct Attempt {
    state: AttemptState,
    steps_completed: u32,
    errors_count: u32,
    started: Option<Instant>,
}

impl Attempt {
    fn elapsed_ms(&self, now: Instant) -> u64 {
        self.started
            .map(|started| now.saturating_duration_since(started).as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Reference to an attempt owned by an [`AttemptLifecycleManager`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttemptHandle {
    id: AttemptId,
}

impl AttemptHandle {
    pub fn id(&self) -> &AttemptId {
        &self.id
    }
}

pub struct AttemptLifecycleManager {
    service: Arc<dyn RemoteAttemptService>,
    reporter: TelemetryReporter,
    start_timeout: Duration,
    attempts: HashMap<AttemptId, Attempt>,
    running: Option<AttemptId>,
}

impl AttemptLifecycleManager {
    pub fn new(
        service: Arc<dyn RemoteAttemptService>,
        reporter: TelemetryReporter,
        start_timeout: Duration,
    ) -> Self {
        Self {
            service,
            reporter,
            start_timeout,
            attempts: HashMap::new(),
            running: None,
        }
    }

    pub fn reporter(&self) -> &TelemetryReporter {
        &self.reporter
    }

    /// Create the attempt remotely. This is the only call the driver awaits.
    ///
    /// Refused while another attempt is running, before anything is sent.
    pub async fn start(
        &mut self,
        subject_id: &str,
        skill_id: &str,
    ) -> Result<AttemptHandle, AttemptError> {
        if let Some(running) = &self.running {
            return Err(AttemptError::AlreadyRunning {
                attempt_id: running.clone(),
            });
        }
        let started = tokio::time::timeout(
            self.start_timeout,
            self.service.start_attempt(subject_id, skill_id),
        )
        .await;
        let attempt_id = match started {
            Ok(Ok(started)) => started.attempt_id,
            Ok(Err(err)) => {
                warn!(subject_id, skill_id, error = %err, "attempt start failed");
                return Err(AttemptError::BackendUnavailable {
                    message: err.to_string(),
                });
            }
            Err(_) => {
                warn!(
                    subject_id,
                    skill_id,
                    timeout_ms = self.start_timeout.as_millis() as u64,
                    "attempt start timed out"
                );
                return Err(AttemptError::BackendUnavailable {
                    message: format!(
                        "no attempt id within {}ms",
                        self.start_timeout.as_millis()
                    ),
                });
            }
        };
        if attempt_id.as_str().trim().is_empty() {
            return Err(AttemptError::BackendUnavailable {
                message: "remote returned a blank attempt id".to_string(),
            });
        }
        if self.attempts.contains_key(&attempt_id) {
            return Err(AttemptError::BackendUnavailable {
                message: format!("remote reused attempt id {}", attempt_id),
            });
        }

        info!(attempt_id = %attempt_id, subject_id, skill_id, "attempt created");
        self.attempts.insert(
            attempt_id.clone(),
            Attempt {
                state: AttemptState::Created,
                steps_completed: 0,
                errors_count: 0,
                started: None,
            },
        );
        Ok(AttemptHandle { id: attempt_id })
    }

    /// Move a created attempt to `Running` and hand out its guard.
    pub fn begin(&mut self, handle: &AttemptHandle) -> Result<RunningAttempt<'_>, AttemptError> {
        if let Some(running) = &self.running {
            return Err(AttemptError::AlreadyRunning {
                attempt_id: running.clone(),
            });
        }
        let attempt = self.attempt_mut(handle)?;
        if attempt.state != AttemptState::Created {
            return Err(AttemptError::InvalidTransition {
                attempt_id: handle.id.clone(),
                from: attempt.state,
            });
        }
        attempt.state = AttemptState::Running;
        attempt.started = Some(now());
        info!(attempt_id = %handle.id, "attempt running");
        self.running = Some(handle.id.clone());
        Ok(RunningAttempt {
            manager: self,
            handle: handle.clone(),
        })
    }

    /// Label `record` with the attempt id and submit it. Records for attempts
    /// that are not running are dropped.
    pub fn record(&mut self, handle: &AttemptHandle, record: StepRecord) -> Option<Delivery> {
        let attempt = self.attempts.get_mut(&handle.id)?;
        if attempt.state != AttemptState::Running {
            debug!(attempt_id = %handle.id, state = ?attempt.state, "record dropped, attempt not running");
            return None;
        }
        let telemetry = match record {
            StepRecord::Input(record) => {
                if record.is_success() {
                    attempt.steps_completed += 1;
                } else {
                    attempt.errors_count += 1;
                }
                TelemetryRecord::Input {
                    attempt_id: handle.id.clone(),
                    record,
                }
            }
            StepRecord::Error(record) => TelemetryRecord::Error {
                attempt_id: handle.id.clone(),
                record,
            },
        };
        Some(self.reporter.send(telemetry))
    }

    /// Send the attempt's single completion record.
    ///
    /// Returns `Ok(None)` when the attempt already finished.
    pub fn finish(
        &mut self,
        handle: &AttemptHandle,
        success: bool,
    ) -> Result<Option<CompletionRecord>, AttemptError> {
        let next = if success {
            AttemptState::Succeeded
        } else {
            AttemptState::Failed
        };
        self.complete(handle, next)
    }

    /// Give up on the attempt. Sends a `success=false` completion.
    pub fn abandon(
        &mut self,
        handle: &AttemptHandle,
    ) -> Result<Option<CompletionRecord>, AttemptError> {
        self.complete(handle, AttemptState::Abandoned)
    }

    pub fn state_of(&self, handle: &AttemptHandle) -> Option<AttemptState> {
        self.attempts.get(&handle.id).map(|attempt| attempt.state)
    }

    /// Id of the attempt currently `Running`, if any.
    pub fn running(&self) -> Option<&AttemptId> {
        self.running.as_ref()
    }

    fn complete(
        &mut self,
        handle: &AttemptHandle,
        next: AttemptState,
    ) -> Result<Option<CompletionRecord>, AttemptError> {
        let attempt = self.attempt_mut(handle)?;
        if attempt.state.is_terminal() {
            warn!(
                attempt_id = %handle.id,
                state = ?attempt.state,
                "attempt already finished, ignoring"
            );
            return Ok(None);
        }
        let record = CompletionRecord {
            success: next == AttemptState::Succeeded,
            completion_time_ms: attempt.elapsed_ms(now()),
            steps_completed: attempt.steps_completed,
            errors_count: attempt.errors_count,
        };
        attempt.state = next;
        info!(
            attempt_id = %handle.id,
            state = ?next,
            completion_time_ms = record.completion_time_ms,
            steps_completed = record.steps_completed,
            errors_count = record.errors_count,
            "attempt finished"
        );
        if self.running.as_ref() == Some(&handle.id) {
            self.running = None;
        }
        self.reporter.send(TelemetryRecord::Completion {
            attempt_id: handle.id.clone(),
            record: record.clone(),
        });
        Ok(Some(record))
    }

    fn attempt_mut(&mut self, handle: &AttemptHandle) -> Result<&mut Attempt, AttemptError> {
        self.attempts
            .get_mut(&handle.id)
            .ok_or_else(|| AttemptError::UnknownAttempt {
                attempt_id: handle.id.clone(),
            })
    }
}

/// Exclusive access to the running attempt. Dropping it while the attempt is
/// still running abandons the attempt.
pub struct RunningAttempt<'a> {
    manager: &'a mut AttemptLifecycleManager,
    handle: AttemptHandle,
}

impl RunningAttempt<'_> {
    pub fn record(&mut self, record: StepRecord) -> Option<Delivery> {
        self.manager.record(&self.handle, record)
    }

    pub fn finish(mut self, success: bool) -> Result<Option<CompletionRecord>, AttemptError> {
        let handle = self.handle.clone();
        self.manager.finish(&handle, success)
    }

    pub fn abandon(mut self) -> Result<Option<CompletionRecord>, AttemptError> {
        let handle = self.handle.clone();
        self.manager.abandon(&handle)
    }
}

impl Drop for RunningAttempt<'_> {
    fn drop(&mut self) {
        if self.manager.state_of(&self.handle) == Some(AttemptState::Running) {
            warn!(attempt_id = %self.handle.id, "running attempt dropped, abandoning");
            let handle = self.handle.clone();
            if let Err(err) = self.manager.abandon(&handle) {
                warn!(attempt_id = %handle.id, error = %err, "abandon on drop failed");
            }
        }
    }
}

fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}
