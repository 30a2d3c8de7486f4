//! Semantic invariants of a step plan not expressible via JSON Schema.

use std::collections::HashSet;

use crate::core::types::Step;

/// Check step-plan invariants:
/// - At least one step
/// - Step numbers start at 1 and increase strictly
/// - Expected action names are non-blank and not repeated within a step
/// - Every expected action is in `known_actions` (case-insensitive)
pub fn validate_steps(steps: &[Step], known_actions: &[&str]) -> Vec<String> {
    let mut errors = Vec::new();
    if steps.is_empty() {
        errors.push("plan must contain at least one step".to_string());
        return errors;
    }

    if steps[0].step_number != 1 {
        errors.push(format!(
            "first step_number must be 1, found {}",
            steps[0].step_number
        ));
    }

    for pair in steps.windows(2) {
        if pair[1].step_number <= pair[0].step_number {
            errors.push(format!(
                "step_number must increase: {} follows {}",
                pair[1].step_number, pair[0].step_number
            ));
        }
    }

    for step in steps {
        validate_step(step, known_actions, &mut errors);
    }
    errors
}

fn validate_step(step: &Step, known_actions: &[&str], errors: &mut Vec<String>) {
    let path = format!("step {}", step.step_number);
    if step.instruction.trim().is_empty() {
        errors.push(format!("{}: instruction must not be empty", path));
    }

    let mut seen = HashSet::new();
    for action in &step.expected_actions {
        let name = action.trim().to_ascii_lowercase();
        if name.is_empty() {
            errors.push(format!("{}: expected action must not be blank", path));
            continue;
        }
        if !seen.insert(name.clone()) {
            errors.push(format!("{}: duplicate expected action '{}'", path, name));
        }
        if !known_actions
            .iter()
            .any(|known| known.eq_ignore_ascii_case(&name))
        {
            errors.push(format!("{}: unknown action '{}'", path, action));
        }
    }
}
