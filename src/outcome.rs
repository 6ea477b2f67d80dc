// Copyright 2021-2026 Martin Pool

//! Representation of the outcome of running the tool.

use std::time::Duration;

use camino::Utf8PathBuf;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::exit_code;
use crate::process::ProcessStatus;

/// Everything we know about one run of the tool once it's over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
    /// The tool that was run.
    pub tool: Utf8PathBuf,
    /// The command line it was given.
    pub command_line: String,
    pub status: ProcessStatus,
    pub duration: Duration,
    /// A non-zero exit is not counted as a failure.
    pub ignore_exit_code: bool,
}

impl TaskOutcome {
    /// True if the build should carry on.
    ///
    /// Timeouts always fail, even when the exit code is ignored.
    pub fn succeeded(&self) -> bool {
        match self.status {
            ProcessStatus::Success => true,
            ProcessStatus::Timeout => false,
            _ => self.ignore_exit_code,
        }
    }

    /// Return the overall program exit code reflecting this outcome.
    pub fn exit_code(&self) -> i32 {
        if self.succeeded() {
            exit_code::SUCCESS
        } else if self.status.timeout() {
            exit_code::TIMEOUT
        } else {
            exit_code::TOOL_FAILED
        }
    }
}

impl Serialize for TaskOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut ss = serializer.serialize_struct("TaskOutcome", 6)?;
        ss.serialize_field("tool", &self.tool)?;
        ss.serialize_field("command_line", &self.command_line)?;
        ss.serialize_field("status", &self.status)?;
        ss.serialize_field("exit_code", &self.status.exit_code())?;
        ss.serialize_field("duration", &self.duration.as_secs_f64())?;
        ss.serialize_field("succeeded", &self.succeeded())?;
        ss.end()
    }
}
