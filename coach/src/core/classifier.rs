//! Deterministic classification of wrong inputs.

use crate::core::types::ErrorCategory;

const MOVE_FORWARD: &str = "move_forward";
const MOVE_BACKWARD: &str = "move_backward";
const TURN_LEFT: &str = "turn_left";
const TURN_RIGHT: &str = "turn_right";
const BRAKE: &str = "brake";
const POP_CASTERS: &str = "pop_casters";

/// Classify an `(expected, actual)` pair into an [`ErrorCategory`].
///
/// Comparison is case-insensitive. Rules are checked in order; the first
/// match wins and anything unmatched is [`ErrorCategory::WrongInput`].
pub fn classify_error(expected: &str, actual: &str) -> ErrorCategory {
    let expected = expected.trim().to_ascii_lowercase();
    let actual = actual.trim().to_ascii_lowercase();

    match (expected.as_str(), actual.as_str()) {
        (MOVE_FORWARD, MOVE_BACKWARD) | (MOVE_BACKWARD, MOVE_FORWARD) => {
            ErrorCategory::WrongDirection
        }
        (TURN_LEFT, TURN_RIGHT) | (TURN_RIGHT, TURN_LEFT) => ErrorCategory::WrongTurnDirection,
        (exp, BRAKE) if is_motion(exp) => ErrorCategory::StoppedInsteadOfMoving,
        (BRAKE, act) if is_motion(act) => ErrorCategory::MovedInsteadOfStopping,
        (POP_CASTERS, act) if act != POP_CASTERS => ErrorCategory::MissedPopCasters,
        _ => ErrorCategory::WrongInput,
    }
}

fn is_motion(action: &str) -> bool {
    matches!(action, MOVE_FORWARD | MOVE_BACKWARD | TURN_LEFT | TURN_RIGHT)
}
