//! Session driver: creates the attempt, pumps sequencer ticks, and guarantees
//! a single completion record on every exit path.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::attempt::{AttemptError, AttemptHandle, AttemptLifecycleManager};
use crate::core::action_monitor::{ActionMonitor, ActionSource};
use crate::core::invariants::validate_steps;
use crate::core::types::{CompletionRecord, SequenceOutcome, Step};
use crate::io::config::CoachConfig;
use crate::sequencer::{SequenceStatus, SequencerConfig, StepSequencer, StepView};

/// Who is practising what, and the steps to walk through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRequest {
    pub subject_id: String,
    pub skill_id: String,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub sequencer: SequencerConfig,
    pub tick_interval: Duration,
}

impl SessionOptions {
    pub fn from_config(cfg: &CoachConfig) -> Self {
        Self {
            sequencer: SequencerConfig::from_config(cfg),
            tick_interval: cfg.tick_interval(),
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from_config(&CoachConfig::default())
    }
}

/// Reason why `run_session` stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStop {
    /// The sequencer reached a terminal outcome.
    Finished(SequenceOutcome),
    /// An external stop request was observed before the sequence ended.
    Cancelled { step_number: Option<u32> },
}

/// Summary of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub attempt: AttemptHandle,
    pub stop: SessionStop,
    /// `None` only if the attempt had already been finished elsewhere.
    pub completion: Option<CompletionRecord>,
    pub steps_completed: u32,
    pub errors_count: u32,
    pub ticks: u64,
}

impl SessionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.stop, SessionStop::Finished(SequenceOutcome::Completed))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The step list violates plan invariants; nothing was started.
    #[error("invalid step plan: {}", .0.join("; "))]
    InvalidPlan(Vec<String>),
    #[error(transparent)]
    Attempt(#[from] AttemptError),
}

/// Run one attempt from creation to completion.
///
/// The only await before sequencing is attempt creation. After that the loop
/// checks `cancel` at the top of every tick; cancellation abandons the attempt
/// without completing the current step. Telemetry is submitted, never awaited.
#[instrument(skip_all, fields(subject_id = %request.subject_id, skill_id = %request.skill_id))]
pub async fn run_session<S: ActionSource>(
    manager: &mut AttemptLifecycleManager,
    request: SessionRequest,
    monitor: ActionMonitor<S>,
    options: &SessionOptions,
    cancel: &CancellationToken,
    view: Option<&watch::Sender<StepView>>,
) -> Result<SessionOutcome, SessionError> {
    let known: Vec<&str> = monitor
        .catalog()
        .iter()
        .map(|entry| entry.name.as_str())
        .collect();
    let errors = validate_steps(&request.steps, &known);
    if !errors.is_empty() {
        return Err(SessionError::InvalidPlan(errors));
    }

    let handle = manager
        .start(&request.subject_id, &request.skill_id)
        .await?;
    let mut running = manager.begin(&handle)?;
    let mut sequencer = StepSequencer::new(monitor, request.steps, options.sequencer.clone());

    let mut interval = tokio::time::interval(options.tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut ticks = 0u64;
    let stop = loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                let step_number = sequencer.current_step().map(|step| step.step_number);
                info!(attempt_id = %handle.id(), step_number = ?step_number, "session cancelled");
                break SessionStop::Cancelled { step_number };
            }
            _ = interval.tick() => {}
        }

        let now = Instant::now().into_std();
        let tick = sequencer.tick(now);
        ticks += 1;
        for record in tick.records {
            running.record(record);
        }
        if let Some(view) = view {
            view.send_replace(sequencer.view(now));
        }
        if let SequenceStatus::Finished(outcome) = tick.status {
            break SessionStop::Finished(outcome);
        }
    };

    let completion = match &stop {
        SessionStop::Finished(outcome) => running.finish(outcome.is_success())?,
        SessionStop::Cancelled { .. } => running.abandon()?,
    };
    info!(
        attempt_id = %handle.id(),
        stop = ?stop,
        ticks,
        "session ended"
    );
    Ok(SessionOutcome {
        attempt: handle,
        stop,
        completion,
        steps_completed: sequencer.steps_completed(),
        errors_count: sequencer.errors_count(),
        ticks,
    })
}
