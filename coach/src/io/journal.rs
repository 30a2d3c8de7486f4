//! JSONL journal standing in for the remote progress service.
//!
//! Every remote call becomes one JSON object appended to the journal file.
//! The file is opened per call and never created with its parent directory,
//! so an unwritable journal surfaces as a [`NetworkError`] exactly like an
//! unreachable backend. File writes run on the blocking pool, one at a time.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex as AsyncMutex;
use tracing::instrument;

use crate::core::types::{AttemptId, CompletionRecord, ErrorRecord, InputRecord};
use crate::io::remote::{Ack, NetworkError, RemoteAttemptService, StartedAttempt};

#[derive(Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
enum JournalCall<'a> {
    StartAttempt {
        attempt_id: &'a AttemptId,
        subject_id: &'a str,
        skill_id: &'a str,
    },
    RecordInput {
        attempt_id: &'a AttemptId,
        record: &'a InputRecord,
    },
    RecordError {
        attempt_id: &'a AttemptId,
        record: &'a ErrorRecord,
    },
    CompleteAttempt {
        attempt_id: &'a AttemptId,
        record: &'a CompletionRecord,
    },
}

#[derive(Serialize)]
struct JournalEntry<'a> {
    ts: String,
    #[serde(flatten)]
    call: JournalCall<'a>,
}

pub struct JournalService {
    path: PathBuf,
    session: String,
    next_id: Mutex<u32>,
    write_lock: AsyncMutex<()>,
}

impl JournalService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            session: Utc::now().format("%Y%m%dT%H%M%S").to_string(),
            next_id: Mutex::new(0),
            write_lock: AsyncMutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn next_attempt_id(&self) -> AttemptId {
        let mut next = self
            .next_id
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *next += 1;
        AttemptId::new(format!("{}-{:04}", self.session, *next))
    }

    async fn append(&self, call: JournalCall<'_>) -> Result<Ack, NetworkError> {
        let entry = JournalEntry {
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            call,
        };
        let mut line = serde_json::to_string(&entry)
            .map_err(|err| NetworkError::new(format!("encode journal entry: {}", err)))?;
        line.push('\n');

        let _writer = self.write_lock.lock().await;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || append_line(&path, &line))
            .await
            .map_err(|err| NetworkError::new(format!("journal writer: {}", err)))??;
        Ok(Ack)
    }
}

fn append_line(path: &Path, line: &str) -> Result<(), NetworkError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| NetworkError::new(format!("open journal {}: {}", path.display(), err)))?;
    file.write_all(line.as_bytes())
        .map_err(|err| NetworkError::new(format!("write journal {}: {}", path.display(), err)))
}

#[async_trait]
impl RemoteAttemptService for JournalService {
    #[instrument(skip(self))]
    async fn start_attempt(
        &self,
        subject_id: &str,
        skill_id: &str,
    ) -> Result<StartedAttempt, NetworkError> {
        let attempt_id = self.next_attempt_id();
        self.append(JournalCall::StartAttempt {
            attempt_id: &attempt_id,
            subject_id,
            skill_id,
        })
        .await?;
        Ok(StartedAttempt { attempt_id })
    }

    async fn record_input(
        &self,
        attempt_id: &AttemptId,
        record: &InputRecord,
    ) -> Result<Ack, NetworkError> {
        self.append(JournalCall::RecordInput { attempt_id, record })
            .await
    }

    async fn record_error(
        &self,
        attempt_id: &AttemptId,
        record: &ErrorRecord,
    ) -> Result<Ack, NetworkError> {
        self.append(JournalCall::RecordError { attempt_id, record })
            .await
    }

    async fn complete_attempt(
        &self,
        attempt_id: &AttemptId,
        record: &CompletionRecord,
    ) -> Result<Ack, NetworkError> {
        self.append(JournalCall::CompleteAttempt { attempt_id, record })
            .await
    }
}

/// Read a journal back as JSON values, one per line.
pub fn read_journal(path: &Path) -> Result<Vec<Value>> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read journal {}", path.display()))?;
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(idx, line)| {
            serde_json::from_str::<Value>(line)
                .with_context(|| format!("parse journal {} line {}", path.display(), idx + 1))
        })
        .collect()
}
