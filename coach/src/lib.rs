//! Real-time step-validation engine for guided motor-skill practice.
//!
//! A user walks through an ordered list of steps. Each step names the logical
//! actions that satisfy it and requires one of them to be held continuously.
//! The architecture enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (action queries, hold tracking,
//!   error classification, plan invariants). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting adapters (config, plan and script files, the
//!   remote progress service, telemetry dispatch).
//!
//! Orchestration modules ([`sequencer`], [`attempt`], [`session`]) coordinate
//! core logic with I/O to run one attempt end to end.

pub mod attempt;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod sequencer;
pub mod session;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
