//! Step plan loading with schema + invariant validation.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use jsonschema::{Draft, Validator};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::invariants::validate_steps;
use crate::core::types::Step;

const PLAN_SCHEMA: &str = include_str!("../../schemas/step_plan.schema.json");

/// Ordered step list for one skill, as supplied by the content collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepPlan {
    pub skill_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub steps: Vec<Step>,
}

/// Load and validate a plan from disk (schema + invariants).
pub fn load_plan(path: &Path, known_actions: &[&str]) -> Result<StepPlan> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read plan {}", path.display()))?;
    parse_plan(&contents, known_actions).with_context(|| format!("load plan {}", path.display()))
}

/// Parse and validate a plan from JSON text.
pub fn parse_plan(contents: &str, known_actions: &[&str]) -> Result<StepPlan> {
    let value: Value = serde_json::from_str(contents).context("parse plan json")?;
    validate_schema(&value)?;
    let plan: StepPlan = serde_json::from_value(value).context("deserialize plan")?;
    let errors = validate_steps(&plan.steps, known_actions);
    if !errors.is_empty() {
        return Err(anyhow!("plan invariants failed: {}", errors.join("; ")));
    }
    Ok(plan)
}

fn plan_validator() -> Result<Validator> {
    let schema: Value = serde_json::from_str(PLAN_SCHEMA).context("parse embedded plan schema")?;
    jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(&schema)
        .map_err(|err| anyhow!("invalid plan schema: {}", err))
}

fn validate_schema(plan: &Value) -> Result<()> {
    let validator = plan_validator()?;
    if !validator.is_valid(plan) {
        let messages = validator
            .iter_errors(plan)
            .map(|err| err.to_string())
            .collect::<Vec<_>>();
        return Err(anyhow!(
            "plan schema validation failed: {}",
            messages.join("; ")
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN: &[&str] = &["move_forward", "move_backward", "brake"];

    #[test]
    fn loads_valid_plan() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("plan.json");
        fs::write(
            &path,
            r#"{
                "skill_id": "wheelchair_basics",
                "steps": [
                    {"step_number": 1, "instruction": "Roll forward", "cue": "Push both rims", "expected_actions": ["move_forward"]},
                    {"step_number": 2, "instruction": "Keep rolling", "expected_actions": ["move_forward"]},
                    {"step_number": 3, "instruction": "Stop", "expected_actions": ["brake"]}
                ]
            }"#,
        )
        .expect("write");
        let plan = load_plan(&path, KNOWN).expect("load");
        assert_eq!(plan.skill_id, "wheelchair_basics");
        assert_eq!(plan.steps.len(), 3);
        assert_eq!(plan.steps[0].cue.as_deref(), Some("Push both rims"));
    }

    #[test]
    fn schema_rejects_missing_fields() {
        let err = parse_plan(r#"{"skill_id": "s", "steps": [{"step_number": 1}]}"#, KNOWN)
            .unwrap_err();
        assert!(err.to_string().contains("schema validation failed"));
    }

    #[test]
    fn schema_rejects_extra_properties() {
        let err = parse_plan(
            r#"{"skill_id": "s", "steps": [{"step_number": 1, "instruction": "x", "hold_ms": 3}]}"#,
            KNOWN,
        )
        .unwrap_err();
        assert!(err.to_string().contains("schema validation failed"));
    }

    #[test]
    fn invariants_reject_unknown_action() {
        let err = parse_plan(
            r#"{"skill_id": "s", "steps": [{"step_number": 1, "instruction": "x", "expected_actions": ["jump"]}]}"#,
            KNOWN,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown action 'jump'"));
    }
}
