//! Coaching configuration stored as TOML (default `coach.toml`).

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::action_monitor::KnownAction;

/// Engine configuration (TOML).
///
/// This file is intended to be edited by humans. Missing fields default to
/// the values the coaching scenes ship with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CoachConfig {
    /// Base continuous hold required per step, in milliseconds.
    pub base_hold_ms: u64,

    /// Per-step monitoring timeout in milliseconds. `0` disables the timeout.
    pub step_timeout_ms: u64,

    /// Quiet period with no action asserted before a step starts monitoring.
    pub release_settle_ms: u64,

    /// Interval between engine ticks.
    pub tick_interval_ms: u64,

    /// Upper bound on waiting for the remote service to create an attempt.
    pub start_timeout_ms: u64,

    /// Double the required hold when a step repeats the previous step's action.
    pub cumulative_hold: bool,

    /// Send an error record alongside the input record for wrong inputs.
    pub record_errors: bool,

    pub wrong_input: WrongInputPolicy,

    /// Known logical actions, in the order the wrong-input check scans them.
    pub actions: Vec<ActionConfig>,
}

/// What a wrong input does to the active step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WrongInputPolicy {
    /// Fail the step and the attempt immediately.
    #[default]
    Fail,
    /// Record the mistake, wait for release, and keep monitoring the step.
    RecordAndContinue,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionConfig {
    pub name: String,
    /// Short input label shown in hints (e.g. `W`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ActionConfig {
    fn new(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: Some(label.to_string()),
        }
    }
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            base_hold_ms: 1_000,
            step_timeout_ms: 15_000,
            release_settle_ms: 100,
            tick_interval_ms: 16,
            start_timeout_ms: 5_000,
            cumulative_hold: true,
            record_errors: true,
            wrong_input: WrongInputPolicy::Fail,
            actions: vec![
                ActionConfig::new("move_forward", "W"),
                ActionConfig::new("move_backward", "S"),
                ActionConfig::new("turn_left", "A"),
                ActionConfig::new("turn_right", "D"),
                ActionConfig::new("pop_casters", "X"),
                ActionConfig::new("brake", "SPACE"),
            ],
        }
    }
}

impl CoachConfig {
    pub fn validate(&self) -> Result<()> {
        if self.base_hold_ms == 0 {
            return Err(anyhow!("base_hold_ms must be > 0"));
        }
        if self.tick_interval_ms == 0 {
            return Err(anyhow!("tick_interval_ms must be > 0"));
        }
        if self.start_timeout_ms == 0 {
            return Err(anyhow!("start_timeout_ms must be > 0"));
        }
        if self.actions.is_empty() {
            return Err(anyhow!("actions must be a non-empty array"));
        }
        let mut seen = Vec::new();
        for action in &self.actions {
            let name = action.name.trim().to_ascii_lowercase();
            if name.is_empty() {
                return Err(anyhow!("actions[].name must not be empty"));
            }
            if seen.contains(&name) {
                return Err(anyhow!("duplicate action '{}'", name));
            }
            seen.push(name);
        }
        Ok(())
    }

    pub fn base_hold(&self) -> Duration {
        Duration::from_millis(self.base_hold_ms)
    }

    /// `None` when the timeout is disabled.
    pub fn step_timeout(&self) -> Option<Duration> {
        (self.step_timeout_ms > 0).then(|| Duration::from_millis(self.step_timeout_ms))
    }

    pub fn release_settle(&self) -> Duration {
        Duration::from_millis(self.release_settle_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn start_timeout(&self) -> Duration {
        Duration::from_millis(self.start_timeout_ms)
    }

    pub fn known_actions(&self) -> Vec<KnownAction> {
        self.actions
            .iter()
            .map(|action| KnownAction {
                name: action.name.clone(),
                label: action.label.clone(),
            })
            .collect()
    }

    pub fn action_names(&self) -> Vec<&str> {
        self.actions.iter().map(|action| action.name.as_str()).collect()
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `CoachConfig::default()`.
pub fn load_config(path: &Path) -> Result<CoachConfig> {
    if !path.exists() {
        let cfg = CoachConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: CoachConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &CoachConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, CoachConfig::default());
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("coach.toml");
        let cfg = CoachConfig {
            wrong_input: WrongInputPolicy::RecordAndContinue,
            step_timeout_ms: 0,
            ..CoachConfig::default()
        };
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
        assert_eq!(loaded.step_timeout(), None);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("coach.toml");
        fs::write(&path, "base_hold_ms = 500\nwrong_input = \"record_and_continue\"\n")
            .expect("write");
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.base_hold(), Duration::from_millis(500));
        assert_eq!(cfg.wrong_input, WrongInputPolicy::RecordAndContinue);
        assert_eq!(cfg.actions.len(), 6);
    }

    #[test]
    fn rejects_duplicate_actions() {
        let cfg = CoachConfig {
            actions: vec![
                ActionConfig::new("brake", "SPACE"),
                ActionConfig::new("Brake", "B"),
            ],
            ..CoachConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate action"));
    }
}
