//! Scripted press timelines (TOML) used to drive a session without a live
//! input device.
//!
//! ```toml
//! [[press]]
//! action = "move_forward"
//! at_ms = 200
//! for_ms = 1200
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::core::action_monitor::ActionSource;

/// One scripted assertion of an action, relative to the timeline start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Press {
    pub action: String,
    pub at_ms: u64,
    pub for_ms: u64,
}

impl Press {
    fn covers(&self, action: &str, offset_ms: u64) -> bool {
        self.action.eq_ignore_ascii_case(action)
            && offset_ms >= self.at_ms
            && offset_ms < self.end_ms()
    }

    fn end_ms(&self) -> u64 {
        self.at_ms.saturating_add(self.for_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default, rename = "press")]
    pub presses: Vec<Press>,
}

impl Script {
    /// Presses naming actions outside `known_actions`, plus zero-length presses.
    pub fn validate(&self, known_actions: &[&str]) -> Vec<String> {
        let mut errors = Vec::new();
        for (idx, press) in self.presses.iter().enumerate() {
            if !known_actions
                .iter()
                .any(|known| known.eq_ignore_ascii_case(press.action.trim()))
            {
                errors.push(format!("press[{}]: unknown action '{}'", idx, press.action));
            }
            if press.for_ms == 0 {
                errors.push(format!("press[{}]: for_ms must be > 0", idx));
            }
        }
        errors
    }
}

pub fn load_script(path: &Path, known_actions: &[&str]) -> Result<Script> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read script {}", path.display()))?;
    let script: Script =
        toml::from_str(&contents).with_context(|| format!("parse script {}", path.display()))?;
    let errors = script.validate(known_actions);
    if !errors.is_empty() {
        return Err(anyhow!(
            "script {} invalid: {}",
            path.display(),
            errors.join("; ")
        ));
    }
    Ok(script)
}

/// Replays a [`Script`] against the tokio clock.
#[derive(Debug, Clone)]
pub struct Timeline {
    script: Script,
    start: Instant,
}

impl Timeline {
    pub fn new(script: Script, start: Instant) -> Self {
        Self { script, start }
    }

    pub fn starting_now(script: Script) -> Self {
        Self::new(script, Instant::now())
    }

    fn offset_ms(&self) -> u64 {
        Instant::now()
            .saturating_duration_since(self.start)
            .as_millis() as u64
    }
}

impl ActionSource for Timeline {
    fn is_active(&self, action: &str) -> bool {
        let offset = self.offset_ms();
        self.script
            .presses
            .iter()
            .any(|press| press.covers(action.trim(), offset))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn press(action: &str, at_ms: u64, for_ms: u64) -> Press {
        Press {
            action: action.to_string(),
            at_ms,
            for_ms,
        }
    }

    #[test]
    fn parses_press_tables() {
        let script: Script = toml::from_str(
            r#"
[[press]]
action = "move_forward"
at_ms = 100
for_ms = 1200

[[press]]
action = "brake"
at_ms = 1500
for_ms = 1100
"#,
        )
        .expect("parse");
        assert_eq!(
            script.presses,
            vec![press("move_forward", 100, 1200), press("brake", 1500, 1100)]
        );
    }

    #[test]
    fn validate_flags_unknown_and_empty_presses() {
        let script = Script {
            presses: vec![press("jump", 0, 10), press("brake", 5, 0)],
        };
        let errors = script.validate(&["brake"]);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("unknown action 'jump'"));
        assert!(errors[1].contains("for_ms"));
    }

    #[tokio::test(start_paused = true)]
    async fn timeline_follows_tokio_clock() {
        let timeline = Timeline::starting_now(Script {
            presses: vec![press("move_forward", 100, 200)],
        });
        assert!(!timeline.is_active("move_forward"));
        tokio::time::advance(Duration::from_millis(100)).await;
        assert!(timeline.is_active("MOVE_FORWARD"));
        assert!(!timeline.is_active("brake"));
        tokio::time::advance(Duration::from_millis(199)).await;
        assert!(timeline.is_active("move_forward"));
        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(!timeline.is_active("move_forward"));
    }
}
