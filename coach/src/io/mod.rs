//! Side-effecting adapters: configuration, plan and script files, the remote
//! service seam, and telemetry dispatch.

pub mod config;
pub mod journal;
pub mod plan;
pub mod remote;
pub mod script;
pub mod telemetry;
