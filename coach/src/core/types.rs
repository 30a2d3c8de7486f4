//! Shared deterministic types for the step-validation engine.
//!
//! These types define stable contracts between the sequencer, the attempt
//! manager and telemetry. They carry no I/O and serialize to the record shapes
//! the remote progress service expects.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One instructed action the user must perform to progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// 1-based step number, matching the remote numbering.
    pub step_number: u32,
    pub instruction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cue: Option<String>,
    /// Any one of these satisfies the step. Empty means any known action does.
    #[serde(default)]
    pub expected_actions: Vec<String>,
}

impl Step {
    pub fn new(step_number: u32, instruction: &str, expected_actions: &[&str]) -> Self {
        Self {
            step_number,
            instruction: instruction.to_string(),
            cue: None,
            expected_actions: expected_actions.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// True when the step has no expected set and any known action satisfies it.
    pub fn accepts_any(&self) -> bool {
        self.expected_actions.is_empty()
    }

    /// Case-insensitive membership in the expected set.
    pub fn expects(&self, action: &str) -> bool {
        self.accepts_any()
            || self
                .expected_actions
                .iter()
                .any(|expected| expected.eq_ignore_ascii_case(action))
    }

    /// Expected action reported on records when the actual action is wrong.
    pub fn primary_expected(&self) -> &str {
        self.expected_actions
            .first()
            .map(String::as_str)
            .unwrap_or(ANY_ACTION)
    }
}

/// Placeholder reported as the expected action of steps that accept anything.
pub const ANY_ACTION: &str = "any";

/// Lifecycle of a single step inside the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPhase {
    Pending,
    /// Waiting for every action to be released before monitoring starts.
    AwaitingRelease,
    Monitoring,
    Succeeded,
    FailedWrongInput,
    FailedTimeout,
}

impl StepPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            StepPhase::Succeeded | StepPhase::FailedWrongInput | StepPhase::FailedTimeout
        )
    }
}

/// Attempt-level state. Terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptState {
    Created,
    Running,
    Succeeded,
    Failed,
    Abandoned,
}

impl AttemptState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            AttemptState::Succeeded | AttemptState::Failed | AttemptState::Abandoned
        )
    }
}

/// Semantic category of a wrong input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    WrongDirection,
    WrongTurnDirection,
    StoppedInsteadOfMoving,
    MovedInsteadOfStopping,
    MissedPopCasters,
    WrongInput,
}

impl ErrorCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::WrongDirection => "wrong_direction",
            ErrorCategory::WrongTurnDirection => "wrong_turn_direction",
            ErrorCategory::StoppedInsteadOfMoving => "stopped_instead_of_moving",
            ErrorCategory::MovedInsteadOfStopping => "moved_instead_of_stopping",
            ErrorCategory::MissedPopCasters => "missed_pop_casters",
            ErrorCategory::WrongInput => "wrong_input",
        }
    }

    /// Human-readable label, e.g. `wrong direction`.
    pub fn label(self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque attempt identity assigned by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttemptId(String);

impl AttemptId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One step resolution. `expected_action == actual_action` means success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    pub step_number: u32,
    pub expected_action: String,
    pub actual_action: String,
}

impl InputRecord {
    pub fn is_success(&self) -> bool {
        self.expected_action == self.actual_action
    }
}

/// A classified wrong input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub step_number: u32,
    pub error_type: ErrorCategory,
    pub expected_action: String,
    pub actual_action: String,
}

/// Terminal summary sent once per attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub success: bool,
    pub completion_time_ms: u64,
    pub steps_completed: u32,
    pub errors_count: u32,
}

/// Records produced by the sequencer during a tick, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepRecord {
    Input(InputRecord),
    Error(ErrorRecord),
}

/// How a step sequence ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceOutcome {
    /// Every step was satisfied.
    Completed,
    WrongInput {
        step_number: u32,
        category: ErrorCategory,
        expected_action: String,
        actual_action: String,
    },
    Timeout {
        step_number: u32,
    },
}

impl SequenceOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SequenceOutcome::Completed)
    }
}
