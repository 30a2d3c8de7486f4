//! Test-only helpers: a pressable action source, an in-memory remote service,
//! and step builders.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::core::action_monitor::{ActionMonitor, ActionSource};
use crate::core::types::{AttemptId, CompletionRecord, ErrorRecord, InputRecord, Step};
use crate::io::config::CoachConfig;
use crate::io::remote::{Ack, NetworkError, RemoteAttemptService, StartedAttempt};

/// Action source whose asserted set is controlled by the test.
#[derive(Debug, Clone, Default)]
pub struct SharedActions {
    pressed: Arc<Mutex<BTreeSet<String>>>,
}

impl SharedActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self, action: &str) {
        self.lock().insert(action.to_ascii_lowercase());
    }

    pub fn release(&self, action: &str) {
        self.lock().remove(&action.to_ascii_lowercase());
    }

    pub fn release_all(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, BTreeSet<String>> {
        self.pressed.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ActionSource for SharedActions {
    fn is_active(&self, action: &str) -> bool {
        self.lock().contains(&action.to_ascii_lowercase())
    }
}

/// Monitor over the default action catalog.
pub fn default_monitor<S: ActionSource>(source: S) -> ActionMonitor<S> {
    ActionMonitor::new(CoachConfig::default().known_actions(), source)
}

/// Step with a generated instruction.
pub fn step(step_number: u32, expected: &[&str]) -> Step {
    let instruction = format!("step {} instruction", step_number);
    Step::new(step_number, &instruction, expected)
}

/// One call observed by [`RecordingService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Start {
        subject_id: String,
        skill_id: String,
    },
    Input {
        attempt_id: AttemptId,
        record: InputRecord,
    },
    Error {
        attempt_id: AttemptId,
        record: ErrorRecord,
    },
    Complete {
        attempt_id: AttemptId,
        record: CompletionRecord,
    },
}

#[derive(Debug, Default)]
struct RecordingState {
    calls: Vec<RecordedCall>,
    next_id: u32,
    fail_start: bool,
    fail_records: bool,
    blank_ids: bool,
    start_delay: Duration,
}

/// In-memory remote service with failure injection.
#[derive(Debug, Default)]
pub struct RecordingService {
    state: Mutex<RecordingState>,
}

impl RecordingService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    pub fn inputs(&self) -> Vec<InputRecord> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RecordedCall::Input { record, .. } => Some(record),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<ErrorRecord> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RecordedCall::Error { record, .. } => Some(record),
                _ => None,
            })
            .collect()
    }

    pub fn completions(&self) -> Vec<(AttemptId, CompletionRecord)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RecordedCall::Complete { attempt_id, record } => Some((attempt_id, record)),
                _ => None,
            })
            .collect()
    }

    pub fn fail_start(&self, fail: bool) {
        self.lock().fail_start = fail;
    }

    /// Make every record call fail. The call is still logged.
    pub fn fail_records(&self, fail: bool) {
        self.lock().fail_records = fail;
    }

    pub fn blank_ids(&self, blank: bool) {
        self.lock().blank_ids = blank;
    }

    pub fn start_delay(&self, delay: Duration) {
        self.lock().start_delay = delay;
    }

    fn lock(&self) -> MutexGuard<'_, RecordingState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn log_record(&self, call: RecordedCall) -> Result<Ack, NetworkError> {
        let mut state = self.lock();
        state.calls.push(call);
        if state.fail_records {
            return Err(NetworkError::new("injected record failure"));
        }
        Ok(Ack)
    }
}

#[async_trait]
impl RemoteAttemptService for RecordingService {
    async fn start_attempt(
        &self,
        subject_id: &str,
        skill_id: &str,
    ) -> Result<StartedAttempt, NetworkError> {
        let delay = self.lock().start_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.lock();
        state.calls.push(RecordedCall::Start {
            subject_id: subject_id.to_string(),
            skill_id: skill_id.to_string(),
        });
        if state.fail_start {
            return Err(NetworkError::new("injected start failure"));
        }
        state.next_id += 1;
        let id = if state.blank_ids {
            String::new()
        } else {
            format!("attempt-{}", state.next_id)
        };
        Ok(StartedAttempt {
            attempt_id: AttemptId::new(id),
        })
    }

    async fn record_input(
        &self,
        attempt_id: &AttemptId,
        record: &InputRecord,
    ) -> Result<Ack, NetworkError> {
        self.log_record(RecordedCall::Input {
            attempt_id: attempt_id.clone(),
            record: record.clone(),
        })
    }

    async fn record_error(
        &self,
        attempt_id: &AttemptId,
        record: &ErrorRecord,
    ) -> Result<Ack, NetworkError> {
        self.log_record(RecordedCall::Error {
            attempt_id: attempt_id.clone(),
            record: record.clone(),
        })
    }

    async fn complete_attempt(
        &self,
        attempt_id: &AttemptId,
        record: &CompletionRecord,
    ) -> Result<Ack, NetworkError> {
        self.log_record(RecordedCall::Complete {
            attempt_id: attempt_id.clone(),
            record: record.clone(),
        })
    }
}
