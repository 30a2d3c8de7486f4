//! Deterministic, pure logic shared by the step-validation engine.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod action_monitor;
pub mod classifier;
pub mod hold;
pub mod invariants;
pub mod threshold;
pub mod types;
