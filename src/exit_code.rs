// Copyright 2021 - 2026 Martin Pool

//! Exit codes from partcover-task.
//!
//! These are assigned so that different cases that CI or other automation
//! might want to distinguish are distinct.

/// The tool ran and succeeded, or its exit code was ignored.
pub const SUCCESS: i32 = 0;

/// The wrong arguments, etc.
///
/// (1 is also the value returned by Clap.)
pub const USAGE: i32 = 1;

/// The tool exited non-zero or was killed by a signal.
pub const TOOL_FAILED: i32 = 2;

/// The tool ran longer than the timeout and was killed.
pub const TIMEOUT: i32 = 3;
