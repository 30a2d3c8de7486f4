//! Per-step required hold duration.

use std::time::Duration;

use crate::core::types::Step;

/// Required hold for `step` given the action that satisfied the previous step.
///
/// With `cumulative` enabled the base doubles when the previous satisfying
/// action is one of this step's expected actions. Steps that accept any action
/// never double.
pub fn required_hold(
    base: Duration,
    step: &Step,
    previous_action: Option<&str>,
    cumulative: bool,
) -> Duration {
    let repeats_previous = previous_action.is_some_and(|previous| {
        step.expected_actions
            .iter()
            .any(|expected| expected.eq_ignore_ascii_case(previous))
    });
    if cumulative && repeats_previous {
        base * 2
    } else {
        base
    }
}
