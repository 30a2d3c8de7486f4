//! Remote progress service abstraction.
//!
//! The [`RemoteAttemptService`] trait decouples the engine from the transport
//! used to reach the backend. Tests use an in-memory recording service; the
//! CLI uses [`crate::io::journal::JournalService`].

use async_trait::async_trait;
use thiserror::Error;

use crate::core::types::{AttemptId, CompletionRecord, ErrorRecord, InputRecord};

/// Response to a successful attempt creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedAttempt {
    pub attempt_id: AttemptId,
}

/// Acknowledgement of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack;

/// A remote call failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("network error: {message}")]
pub struct NetworkError {
    pub message: String,
}

impl NetworkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Calls the engine makes against the remote progress service.
#[async_trait]
pub trait RemoteAttemptService: Send + Sync {
    async fn start_attempt(
        &self,
        subject_id: &str,
        skill_id: &str,
    ) -> Result<StartedAttempt, NetworkError>;

    async fn record_input(
        &self,
        attempt_id: &AttemptId,
        record: &InputRecord,
    ) -> Result<Ack, NetworkError>;

    async fn record_error(
        &self,
        attempt_id: &AttemptId,
        record: &ErrorRecord,
    ) -> Result<Ack, NetworkError>;

    async fn complete_attempt(
        &self,
        attempt_id: &AttemptId,
        record: &CompletionRecord,
    ) -> Result<Ack, NetworkError>;
}
