//! Stable exit codes for coach CLI commands.

/// Command succeeded; for `coach run`, the attempt completed every step.
pub const OK: i32 = 0;
/// Invalid config, plan or script, or any other error.
pub const INVALID: i32 = 1;
/// The attempt ended on a wrong input or a step timeout.
pub const FAILED: i32 = 2;
/// The session was stopped externally (Ctrl-C).
pub const CANCELLED: i32 = 3;
/// The remote service did not create an attempt.
pub const BACKEND_UNAVAILABLE: i32 = 4;
