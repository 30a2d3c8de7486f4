//! Continuous-hold accumulation for the active step.
//!
//! The tracker is driven once per tick with the expected action currently
//! asserted (if any). It never accumulates across a release or a switch to a
//! different expected action.

use std::time::{Duration, Instant};

/// Hold state for one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoldState {
    Idle,
    Holding { action: String, started_at: Instant },
}

/// What a single [`HoldTracker::update`] observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoldEvent {
    /// Nothing held before or after the tick.
    Idle,
    Started {
        action: String,
    },
    Continued {
        action: String,
        elapsed: Duration,
    },
    /// A different expected action replaced the held one; progress restarts at zero.
    Switched {
        from: String,
        to: String,
        lost: Duration,
    },
    Released {
        action: String,
        lost: Duration,
    },
    /// The required duration was reached; the tracker is back to idle.
    Completed {
        action: String,
        elapsed: Duration,
    },
}

#[derive(Debug, Clone)]
pub struct HoldTracker {
    required: Duration,
    state: HoldState,
}

impl HoldTracker {
    pub fn new(required: Duration) -> Self {
        Self {
            required,
            state: HoldState::Idle,
        }
    }

    pub fn required(&self) -> Duration {
        self.required
    }

    pub fn state(&self) -> &HoldState {
        &self.state
    }

    pub fn held_action(&self) -> Option<&str> {
        match &self.state {
            HoldState::Idle => None,
            HoldState::Holding { action, .. } => Some(action),
        }
    }

    /// Time accumulated for the current hold (zero when idle).
    pub fn elapsed(&self, now: Instant) -> Duration {
        match &self.state {
            HoldState::Idle => Duration::ZERO,
            HoldState::Holding { started_at, .. } => now.saturating_duration_since(*started_at),
        }
    }

    /// Drop any hold and start the next step with a new requirement.
    pub fn restart(&mut self, required: Duration) {
        self.required = required;
        self.state = HoldState::Idle;
    }

    pub fn reset(&mut self) {
        self.state = HoldState::Idle;
    }

    /// Advance the hold state for this tick.
    ///
    /// `held_still_active` reports whether the currently held action is still
    /// asserted; `candidate` is the first asserted expected action, used when
    /// starting or switching. Completion is checked on every tick, including
    /// the one that starts the hold.
    pub fn update(
        &mut self,
        held_still_active: bool,
        candidate: Option<&str>,
        now: Instant,
    ) -> HoldEvent {
        let event = match (&self.state, candidate) {
            (HoldState::Holding { action, started_at }, _) if held_still_active => {
                HoldEvent::Continued {
                    action: action.clone(),
                    elapsed: now.saturating_duration_since(*started_at),
                }
            }
            (HoldState::Holding { action, started_at }, Some(next)) => {
                let event = HoldEvent::Switched {
                    from: action.clone(),
                    to: next.to_string(),
                    lost: now.saturating_duration_since(*started_at),
                };
                self.state = HoldState::Holding {
                    action: next.to_string(),
                    started_at: now,
                };
                event
            }
            (HoldState::Holding { action, started_at }, None) => {
                let event = HoldEvent::Released {
                    action: action.clone(),
                    lost: now.saturating_duration_since(*started_at),
                };
                self.state = HoldState::Idle;
                event
            }
            (HoldState::Idle, Some(next)) => {
                self.state = HoldState::Holding {
                    action: next.to_string(),
                    started_at: now,
                };
                HoldEvent::Started {
                    action: next.to_string(),
                }
            }
            (HoldState::Idle, None) => HoldEvent::Idle,
        };

        match &self.state {
            HoldState::Holding { action, started_at } => {
                let elapsed = now.saturating_duration_since(*started_at);
                if elapsed >= self.required {
                    let action = action.clone();
                    self.state = HoldState::Idle;
                    HoldEvent::Completed { action, elapsed }
                } else {
                    event
                }
            }
            HoldState::Idle => event,
        }
    }
}
