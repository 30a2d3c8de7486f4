//! Tick-driven step sequencer.
//!
//! One [`StepSequencer::tick`] evaluates the active step to completion and
//! returns the records it produced. The sequencer performs no I/O: the caller
//! labels the records with an attempt id and hands them to telemetry.
//!
//! Per step the phases are `Pending → AwaitingRelease → Monitoring →
//! {Succeeded | FailedWrongInput | FailedTimeout}`. Within a monitoring tick
//! the timeout is checked first, then wrong input, then the hold, so a wrong
//! action asserted alongside an expected one always fails the step.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::core::action_monitor::{ActionMonitor, ActionSource};
use crate::core::classifier::classify_error;
use crate::core::hold::{HoldEvent, HoldTracker};
use crate::core::threshold::required_hold;
use crate::core::types::{
    ErrorRecord, InputRecord, SequenceOutcome, Step, StepPhase, StepRecord,
};
use crate::io::config::{CoachConfig, WrongInputPolicy};

/// Tuning for a single sequence run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencerConfig {
    pub base_hold: Duration,
    /// `None` disables the per-step timeout.
    pub step_timeout: Option<Duration>,
    pub release_settle: Duration,
    pub cumulative_hold: bool,
    pub record_errors: bool,
    pub wrong_input: WrongInputPolicy,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self::from_config(&CoachConfig::default())
    }
}

impl SequencerConfig {
    pub fn from_config(cfg: &CoachConfig) -> Self {
        Self {
            base_hold: cfg.base_hold(),
            step_timeout: cfg.step_timeout(),
            release_settle: cfg.release_settle(),
            cumulative_hold: cfg.cumulative_hold,
            record_errors: cfg.record_errors,
            wrong_input: cfg.wrong_input,
        }
    }
}

/// Whether the sequence is still running after a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceStatus {
    Running,
    Finished(SequenceOutcome),
}

/// Result of one tick: records in emission order plus the sequence status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    pub records: Vec<StepRecord>,
    pub status: SequenceStatus,
}

/// Read-only snapshot for a presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepView {
    pub step_number: Option<u32>,
    pub total_steps: usize,
    pub instruction: String,
    pub cue: Option<String>,
    pub input_hint: String,
    pub hold_elapsed: Duration,
    pub hold_required: Duration,
    pub feedback: String,
}

impl StepView {
    /// Hold progress clamped to `0.0..=1.0`.
    pub fn hold_fraction(&self) -> f32 {
        if self.hold_required.is_zero() {
            return 0.0;
        }
        (self.hold_elapsed.as_secs_f32() / self.hold_required.as_secs_f32()).clamp(0.0, 1.0)
    }
}

pub struct StepSequencer<S> {
    monitor: ActionMonitor<S>,
    steps: Vec<Step>,
    config: SequencerConfig,
    index: usize,
    phase: StepPhase,
    hold: HoldTracker,
    previous_action: Option<String>,
    quiet_since: Option<Instant>,
    monitoring_since: Option<Instant>,
    steps_completed: u32,
    errors_count: u32,
    feedback: String,
    outcome: Option<SequenceOutcome>,
}

impl<S: ActionSource> StepSequencer<S> {
    pub fn new(monitor: ActionMonitor<S>, steps: Vec<Step>, config: SequencerConfig) -> Self {
        let hold = HoldTracker::new(config.base_hold);
        Self {
            monitor,
            steps,
            config,
            index: 0,
            phase: StepPhase::Pending,
            hold,
            previous_action: None,
            quiet_since: None,
            monitoring_since: None,
            steps_completed: 0,
            errors_count: 0,
            feedback: String::new(),
            outcome: None,
        }
    }

    /// Evaluate one tick at `now`. After the sequence finishes every further
    /// tick returns the same outcome and no records.
    pub fn tick(&mut self, now: Instant) -> Tick {
        let mut records = Vec::new();
        if self.outcome.is_none() {
            if self.phase == StepPhase::Pending {
                self.activate();
            }
            if self.phase == StepPhase::AwaitingRelease {
                self.await_release(now);
            }
            if self.phase == StepPhase::Monitoring {
                self.monitor_step(now, &mut records);
            }
        }
        let status = match &self.outcome {
            Some(outcome) => SequenceStatus::Finished(outcome.clone()),
            None => SequenceStatus::Running,
        };
        Tick { records, status }
    }

    pub fn phase(&self) -> StepPhase {
        self.phase
    }

    pub fn current_step(&self) -> Option<&Step> {
        if self.outcome.as_ref().is_some_and(SequenceOutcome::is_success) {
            return None;
        }
        self.steps.get(self.index)
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    /// Required hold of the active step.
    pub fn required_hold(&self) -> Duration {
        self.hold.required()
    }

    pub fn hold_elapsed(&self, now: Instant) -> Duration {
        self.hold.elapsed(now)
    }

    pub fn steps_completed(&self) -> u32 {
        self.steps_completed
    }

    pub fn errors_count(&self) -> u32 {
        self.errors_count
    }

    pub fn feedback(&self) -> &str {
        &self.feedback
    }

    pub fn view(&self, now: Instant) -> StepView {
        let Some(step) = self.current_step() else {
            return StepView {
                step_number: None,
                total_steps: self.steps.len(),
                feedback: self.feedback.clone(),
                ..StepView::default()
            };
        };
        StepView {
            step_number: Some(step.step_number),
            total_steps: self.steps.len(),
            instruction: step.instruction.clone(),
            cue: step.cue.clone(),
            input_hint: self.input_hint(step),
            hold_elapsed: self.hold.elapsed(now).min(self.hold.required()),
            hold_required: self.hold.required(),
            feedback: self.feedback.clone(),
        }
    }

    fn input_hint(&self, step: &Step) -> String {
        let keys = if step.accepts_any() {
            "any input".to_string()
        } else {
            step.expected_actions
                .iter()
                .map(|action| self.monitor.label_for(action))
                .collect::<Vec<_>>()
                .join(" OR ")
        };
        format!(
            "Hold {} for {:.1}s",
            keys,
            self.hold.required().as_secs_f32()
        )
    }

    fn activate(&mut self) {
        let Some(step) = self.steps.get(self.index) else {
            self.finish(SequenceOutcome::Completed);
            return;
        };
        let required = required_hold(
            self.config.base_hold,
            step,
            self.previous_action.as_deref(),
            self.config.cumulative_hold,
        );
        info!(
            step = step.step_number,
            expected = ?step.expected_actions,
            required_ms = required.as_millis() as u64,
            "step activated"
        );
        self.hold.restart(required);
        self.quiet_since = None;
        self.monitoring_since = None;
        self.phase = StepPhase::AwaitingRelease;
    }

    fn await_release(&mut self, now: Instant) {
        // A step sent back here after monitoring started keeps its deadline.
        if let Some(timeout) = self.timed_out(now) {
            self.time_out(timeout);
            return;
        }
        if self.monitor.any_active() {
            self.quiet_since = None;
            return;
        }
        let quiet_since = *self.quiet_since.get_or_insert(now);
        if now.saturating_duration_since(quiet_since) < self.config.release_settle {
            return;
        }
        self.hold.reset();
        self.monitoring_since.get_or_insert(now);
        self.phase = StepPhase::Monitoring;
        debug!(step = self.steps[self.index].step_number, "monitoring");
    }

    fn monitor_step(&mut self, now: Instant, records: &mut Vec<StepRecord>) {
        if let Some(timeout) = self.timed_out(now) {
            self.time_out(timeout);
            return;
        }
        let step = self.steps[self.index].clone();

        let wrong = self
            .monitor
            .active_actions()
            .into_iter()
            .find(|action| !step.expects(action))
            .map(str::to_string);
        if let Some(actual) = wrong {
            self.wrong_input(&step, actual, records);
            return;
        }

        let held_still_active = self
            .hold
            .held_action()
            .is_some_and(|action| self.monitor.is_active(action));
        let candidate = self.first_active_expected(&step);
        match self.hold.update(held_still_active, candidate.as_deref(), now) {
            HoldEvent::Completed { action, elapsed } => {
                info!(
                    step = step.step_number,
                    action = %action,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "step complete"
                );
                records.push(StepRecord::Input(InputRecord {
                    step_number: step.step_number,
                    expected_action: action.clone(),
                    actual_action: action.clone(),
                }));
                self.steps_completed += 1;
                self.previous_action = Some(action);
                self.feedback = format!("Step {} complete!", step.step_number);
                self.phase = StepPhase::Succeeded;
                self.index += 1;
                if self.index < self.steps.len() {
                    self.activate();
                } else {
                    self.feedback = "Tutorial completed! Well done!".to_string();
                    self.finish(SequenceOutcome::Completed);
                }
            }
            HoldEvent::Switched { from, to, lost } => {
                debug!(from = %from, to = %to, lost_ms = lost.as_millis() as u64, "action switched, hold restarted");
            }
            HoldEvent::Released { action, lost } => {
                debug!(action = %action, lost_ms = lost.as_millis() as u64, "released, hold reset");
            }
            HoldEvent::Started { .. } | HoldEvent::Continued { .. } | HoldEvent::Idle => {}
        }
    }

    /// The configured timeout, if monitoring has run strictly longer than it.
    fn timed_out(&self, now: Instant) -> Option<Duration> {
        let timeout = self.config.step_timeout?;
        let since = self.monitoring_since?;
        (now.saturating_duration_since(since) > timeout).then_some(timeout)
    }

    fn time_out(&mut self, timeout: Duration) {
        let step_number = self.steps[self.index].step_number;
        info!(step = step_number, timeout_ms = timeout.as_millis() as u64, "step timed out");
        self.feedback = format!("Time is up for step {}.", step_number);
        self.phase = StepPhase::FailedTimeout;
        self.finish(SequenceOutcome::Timeout { step_number });
    }

    fn first_active_expected(&self, step: &Step) -> Option<String> {
        if step.accepts_any() {
            return self
                .monitor
                .active_actions()
                .first()
                .map(|action| action.to_string());
        }
        step.expected_actions
            .iter()
            .find(|action| self.monitor.is_active(action))
            .map(|action| action.trim().to_ascii_lowercase())
    }

    fn wrong_input(&mut self, step: &Step, actual: String, records: &mut Vec<StepRecord>) {
        let expected = step.primary_expected().trim().to_ascii_lowercase();
        let category = classify_error(&expected, &actual);
        warn!(
            step = step.step_number,
            expected = %expected,
            actual = %actual,
            category = %category,
            "wrong input"
        );
        records.push(StepRecord::Input(InputRecord {
            step_number: step.step_number,
            expected_action: expected.clone(),
            actual_action: actual.clone(),
        }));
        if self.config.record_errors {
            records.push(StepRecord::Error(ErrorRecord {
                step_number: step.step_number,
                error_type: category,
                expected_action: expected.clone(),
                actual_action: actual.clone(),
            }));
        }
        self.errors_count += 1;
        self.hold.reset();

        match self.config.wrong_input {
            WrongInputPolicy::Fail => {
                self.feedback = format!("Error recorded: {}.", category.label());
                self.phase = StepPhase::FailedWrongInput;
                self.finish(SequenceOutcome::WrongInput {
                    step_number: step.step_number,
                    category,
                    expected_action: expected,
                    actual_action: actual,
                });
            }
            WrongInputPolicy::RecordAndContinue => {
                self.feedback = format!("Error recorded: {}. Please try again.", category.label());
                self.quiet_since = None;
                self.phase = StepPhase::AwaitingRelease;
            }
        }
    }

    fn finish(&mut self, outcome: SequenceOutcome) {
        debug!(outcome = ?outcome, "sequence finished");
        self.outcome = Some(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{ErrorCategory, StepRecord};
    use crate::test_support::{SharedActions, default_monitor, step};

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn config() -> SequencerConfig {
        SequencerConfig {
            base_hold: ms(1000),
            step_timeout: None,
            release_settle: Duration::ZERO,
            cumulative_hold: true,
            record_errors: true,
            wrong_input: WrongInputPolicy::Fail,
        }
    }

    fn sequencer(
        steps: Vec<Step>,
        config: SequencerConfig,
    ) -> (StepSequencer<SharedActions>, SharedActions) {
        let actions = SharedActions::new();
        let seq = StepSequencer::new(default_monitor(actions.clone()), steps, config);
        (seq, actions)
    }

    fn input(step_number: u32, expected: &str, actual: &str) -> StepRecord {
        StepRecord::Input(InputRecord {
            step_number,
            expected_action: expected.to_string(),
            actual_action: actual.to_string(),
        })
    }

    #[test]
    fn repeated_action_doubles_hold_and_release_resets() {
        let t0 = Instant::now();
        let (mut seq, actions) = sequencer(
            vec![
                step(1, &["move_forward"]),
                step(2, &["move_forward"]),
                step(3, &["brake"]),
            ],
            config(),
        );

        assert_eq!(seq.tick(t0).status, SequenceStatus::Running);
        assert_eq!(seq.phase(), StepPhase::Monitoring);

        actions.press("move_forward");
        assert!(seq.tick(t0 + ms(100)).records.is_empty());
        assert!(seq.tick(t0 + ms(1099)).records.is_empty());
        let tick = seq.tick(t0 + ms(1100));
        assert_eq!(tick.records, vec![input(1, "move_forward", "move_forward")]);
        assert_eq!(seq.current_step().map(|s| s.step_number), Some(2));
        assert_eq!(seq.required_hold(), ms(2000));

        // Still held from step 1: the release barrier keeps step 2 waiting.
        seq.tick(t0 + ms(1150));
        assert_eq!(seq.phase(), StepPhase::AwaitingRelease);
        actions.release("move_forward");
        seq.tick(t0 + ms(1200));
        assert_eq!(seq.phase(), StepPhase::Monitoring);

        // 1.9s then release: not enough.
        actions.press("move_forward");
        seq.tick(t0 + ms(1300));
        assert!(seq.tick(t0 + ms(3200)).records.is_empty());
        actions.release("move_forward");
        assert!(seq.tick(t0 + ms(3250)).records.is_empty());
        assert_eq!(seq.hold_elapsed(t0 + ms(3250)), Duration::ZERO);
        assert_eq!(seq.current_step().map(|s| s.step_number), Some(2));

        // A continuous 2.0s hold succeeds.
        actions.press("move_forward");
        seq.tick(t0 + ms(3300));
        assert!(seq.tick(t0 + ms(5299)).records.is_empty());
        let tick = seq.tick(t0 + ms(5300));
        assert_eq!(tick.records, vec![input(2, "move_forward", "move_forward")]);
        assert_eq!(seq.current_step().map(|s| s.step_number), Some(3));
        assert_eq!(seq.required_hold(), ms(1000));
    }

    #[test]
    fn full_sequence_completes() {
        let t0 = Instant::now();
        let (mut seq, actions) = sequencer(
            vec![step(1, &["move_forward"]), step(2, &["brake"])],
            config(),
        );
        seq.tick(t0);
        actions.press("move_forward");
        seq.tick(t0 + ms(10));
        seq.tick(t0 + ms(1010));
        actions.release_all();
        seq.tick(t0 + ms(1020));
        actions.press("brake");
        seq.tick(t0 + ms(1030));
        let tick = seq.tick(t0 + ms(2030));
        assert_eq!(tick.records, vec![input(2, "brake", "brake")]);
        assert_eq!(tick.status, SequenceStatus::Finished(SequenceOutcome::Completed));
        assert_eq!(seq.steps_completed(), 2);
        assert!(seq.current_step().is_none());
        assert_eq!(seq.feedback(), "Tutorial completed! Well done!");

        // Further ticks are inert.
        let tick = seq.tick(t0 + ms(5000));
        assert!(tick.records.is_empty());
        assert_eq!(tick.status, SequenceStatus::Finished(SequenceOutcome::Completed));
    }

    #[test]
    fn wrong_input_precedes_success_in_same_tick() {
        let t0 = Instant::now();
        let (mut seq, actions) = sequencer(vec![step(1, &["move_forward"])], config());
        seq.tick(t0);
        actions.press("move_forward");
        seq.tick(t0 + ms(10));
        actions.press("brake");
        // The hold would be complete at this tick, but brake is also asserted.
        let tick = seq.tick(t0 + ms(1010));
        assert_eq!(
            tick.records,
            vec![
                input(1, "move_forward", "brake"),
                StepRecord::Error(ErrorRecord {
                    step_number: 1,
                    error_type: ErrorCategory::StoppedInsteadOfMoving,
                    expected_action: "move_forward".to_string(),
                    actual_action: "brake".to_string(),
                }),
            ]
        );
        assert_eq!(
            tick.status,
            SequenceStatus::Finished(SequenceOutcome::WrongInput {
                step_number: 1,
                category: ErrorCategory::StoppedInsteadOfMoving,
                expected_action: "move_forward".to_string(),
                actual_action: "brake".to_string(),
            })
        );
        assert_eq!(seq.phase(), StepPhase::FailedWrongInput);
        assert_eq!(seq.steps_completed(), 0);
        assert_eq!(seq.errors_count(), 1);
    }

    #[test]
    fn wrong_input_without_error_records() {
        let t0 = Instant::now();
        let (mut seq, actions) = sequencer(
            vec![step(1, &["turn_left"])],
            SequencerConfig {
                record_errors: false,
                ..config()
            },
        );
        seq.tick(t0);
        actions.press("turn_right");
        let tick = seq.tick(t0 + ms(16));
        assert_eq!(tick.records, vec![input(1, "turn_left", "turn_right")]);
        assert!(matches!(tick.status, SequenceStatus::Finished(_)));
    }

    #[test]
    fn timeout_without_input_emits_no_records() {
        let t0 = Instant::now();
        let (mut seq, _actions) = sequencer(
            vec![step(1, &["move_forward"]), step(2, &["brake"])],
            SequencerConfig {
                step_timeout: Some(ms(5000)),
                ..config()
            },
        );
        let mut records = Vec::new();
        let mut status = SequenceStatus::Running;
        for i in 0..=12 {
            let tick = seq.tick(t0 + ms(i * 500));
            records.extend(tick.records);
            status = tick.status;
            if i == 10 {
                assert_eq!(status, SequenceStatus::Running, "exactly at the limit");
            }
        }
        assert!(records.is_empty());
        assert_eq!(
            status,
            SequenceStatus::Finished(SequenceOutcome::Timeout { step_number: 1 })
        );
        assert_eq!(seq.phase(), StepPhase::FailedTimeout);
    }

    #[test]
    fn release_barrier_waits_for_settle_period() {
        let t0 = Instant::now();
        let (mut seq, actions) = sequencer(
            vec![step(1, &["move_forward"])],
            SequencerConfig {
                release_settle: ms(100),
                ..config()
            },
        );
        actions.press("brake");
        seq.tick(t0);
        assert_eq!(seq.phase(), StepPhase::AwaitingRelease);
        actions.release("brake");
        seq.tick(t0 + ms(200));
        assert_eq!(seq.phase(), StepPhase::AwaitingRelease);
        seq.tick(t0 + ms(250));
        assert_eq!(seq.phase(), StepPhase::AwaitingRelease);
        seq.tick(t0 + ms(300));
        assert_eq!(seq.phase(), StepPhase::Monitoring);
    }

    #[test]
    fn held_key_across_barrier_is_not_wrong_input() {
        let t0 = Instant::now();
        let (mut seq, actions) = sequencer(
            vec![step(1, &["move_forward"]), step(2, &["brake"])],
            config(),
        );
        seq.tick(t0);
        actions.press("move_forward");
        seq.tick(t0 + ms(10));
        seq.tick(t0 + ms(1010));
        // move_forward is wrong for step 2, but it leaked from step 1.
        let tick = seq.tick(t0 + ms(1500));
        assert!(tick.records.is_empty());
        assert_eq!(tick.status, SequenceStatus::Running);
        assert_eq!(seq.errors_count(), 0);
    }

    #[test]
    fn switching_expected_actions_restarts_hold() {
        let t0 = Instant::now();
        let (mut seq, actions) = sequencer(vec![step(1, &["turn_left", "turn_right"])], config());
        seq.tick(t0);
        actions.press("turn_left");
        seq.tick(t0 + ms(100));
        seq.tick(t0 + ms(900));
        actions.release("turn_left");
        actions.press("turn_right");
        seq.tick(t0 + ms(1000));
        assert_eq!(seq.hold_elapsed(t0 + ms(1000)), Duration::ZERO);
        assert!(seq.tick(t0 + ms(1999)).records.is_empty());
        let tick = seq.tick(t0 + ms(2000));
        assert_eq!(tick.records, vec![input(1, "turn_right", "turn_right")]);
    }

    #[test]
    fn record_and_continue_keeps_step_open() {
        let t0 = Instant::now();
        let (mut seq, actions) = sequencer(
            vec![step(1, &["move_forward"])],
            SequencerConfig {
                wrong_input: WrongInputPolicy::RecordAndContinue,
                ..config()
            },
        );
        seq.tick(t0);
        actions.press("move_backward");
        let tick = seq.tick(t0 + ms(16));
        assert_eq!(tick.records.len(), 2);
        assert_eq!(tick.status, SequenceStatus::Running);
        assert_eq!(seq.phase(), StepPhase::AwaitingRelease);
        assert_eq!(seq.feedback(), "Error recorded: wrong direction. Please try again.");

        // Holding the wrong key does not produce more records.
        assert!(seq.tick(t0 + ms(32)).records.is_empty());

        actions.release_all();
        seq.tick(t0 + ms(48));
        actions.press("move_forward");
        seq.tick(t0 + ms(64));
        let tick = seq.tick(t0 + ms(1064));
        assert_eq!(tick.records, vec![input(1, "move_forward", "move_forward")]);
        assert_eq!(tick.status, SequenceStatus::Finished(SequenceOutcome::Completed));
        assert_eq!(seq.errors_count(), 1);
    }

    #[test]
    fn held_wrong_key_still_times_out_when_continuing() {
        let t0 = Instant::now();
        let (mut seq, actions) = sequencer(
            vec![step(1, &["move_forward"])],
            SequencerConfig {
                step_timeout: Some(ms(5000)),
                wrong_input: WrongInputPolicy::RecordAndContinue,
                ..config()
            },
        );
        seq.tick(t0);
        actions.press("brake");
        let tick = seq.tick(t0 + ms(16));
        assert_eq!(tick.records.len(), 2);
        assert_eq!(seq.phase(), StepPhase::AwaitingRelease);

        let mut status = SequenceStatus::Running;
        let mut records = Vec::new();
        for i in 1..=11 {
            let tick = seq.tick(t0 + ms(i * 500));
            records.extend(tick.records);
            status = tick.status;
            if i == 10 {
                assert_eq!(status, SequenceStatus::Running, "exactly at the limit");
            }
        }
        assert!(records.is_empty());
        assert_eq!(
            status,
            SequenceStatus::Finished(SequenceOutcome::Timeout { step_number: 1 })
        );
        assert_eq!(seq.phase(), StepPhase::FailedTimeout);
        assert_eq!(seq.feedback(), "Time is up for step 1.");
        assert_eq!(seq.errors_count(), 1);
        assert_eq!(
            seq.tick(t0 + ms(20_000)).status,
            SequenceStatus::Finished(SequenceOutcome::Timeout { step_number: 1 })
        );
    }

    #[test]
    fn accept_any_step_takes_any_known_action() {
        let t0 = Instant::now();
        let (mut seq, actions) = sequencer(vec![step(1, &[])], config());
        seq.tick(t0);
        actions.press("pop_casters");
        seq.tick(t0 + ms(10));
        let tick = seq.tick(t0 + ms(1010));
        assert_eq!(tick.records, vec![input(1, "pop_casters", "pop_casters")]);
    }

    #[test]
    fn unknown_actions_are_ignored() {
        let t0 = Instant::now();
        let (mut seq, actions) = sequencer(vec![step(1, &["move_forward"])], config());
        seq.tick(t0);
        actions.press("jump");
        let tick = seq.tick(t0 + ms(16));
        assert!(tick.records.is_empty());
        assert_eq!(tick.status, SequenceStatus::Running);
    }

    #[test]
    fn view_describes_active_step() {
        let t0 = Instant::now();
        let (mut seq, actions) = sequencer(
            vec![
                step(1, &["move_forward"]),
                step(2, &["move_forward", "move_backward"]),
            ],
            config(),
        );
        seq.tick(t0);
        let view = seq.view(t0);
        assert_eq!(view.step_number, Some(1));
        assert_eq!(view.total_steps, 2);
        assert_eq!(view.input_hint, "Hold W for 1.0s");

        actions.press("move_forward");
        seq.tick(t0 + ms(10));
        seq.tick(t0 + ms(1010));
        let view = seq.view(t0 + ms(1010));
        assert_eq!(view.step_number, Some(2));
        assert_eq!(view.input_hint, "Hold W OR S for 2.0s");
        assert_eq!(view.feedback, "Step 1 complete!");
        assert_eq!(view.hold_fraction(), 0.0);
    }
}
