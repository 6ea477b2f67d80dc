// Copyright 2026 Martin Pool

//! The PartCover task: find the tool, compose its command line, run it,
//! and report how it went.
//!
//! Any build tool or script can drive this through [PartCoverTask::execute];
//! the `partcover-task` binary is one such caller.

use std::time::Instant;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, warn};

use crate::command_line::generate_command_line;
use crate::importance::{log_message, Importance};
use crate::log_file::LogFile;
use crate::options::Options;
use crate::outcome::TaskOutcome;
use crate::process::Process;
use crate::tool::full_path_to_tool;
use crate::Result;

#[derive(Debug, Clone)]
pub struct PartCoverTask {
    options: Options,
}

impl PartCoverTask {
    pub fn new(options: Options) -> PartCoverTask {
        PartCoverTask { options }
    }

    /// Return the path of the tool to run.
    pub fn full_path_to_tool(&self) -> Result<Utf8PathBuf> {
        full_path_to_tool(self.options.tool_path.as_deref(), &self.options.tool_exe)
    }

    /// Compose the command line for the tool, and log it.
    pub fn command_line(&self) -> String {
        let command_line = generate_command_line(&self.options.coverage);
        log_message(Importance::Normal, &command_line);
        command_line
    }

    /// Run the tool in `cwd` and wait for it to finish.
    ///
    /// Failing to start the tool is an error; the tool running and failing is
    /// reported in the outcome.
    pub fn execute(
        &self,
        cwd: &Utf8Path,
        mut log_file: Option<&mut LogFile>,
    ) -> Result<TaskOutcome> {
        let tool = self.full_path_to_tool()?;
        let command_line = self.command_line();
        if let Some(log_file) = log_file.as_deref_mut() {
            log_file.message(&format!("{tool} {command_line}"));
        }
        if self.options.has_timeout() {
            debug!(timeout = ?self.options.timeout, "tool will be stopped after timeout");
        }
        let start = Instant::now();
        let status = Process::run(
            &tool,
            &command_line,
            &self.options.env,
            cwd,
            self.options.timeout,
            &mut |stream, line| log_events_from_text_output(line, stream.default_importance()),
        )?;
        let outcome = TaskOutcome {
            tool,
            command_line,
            status,
            duration: start.elapsed(),
            ignore_exit_code: self.options.ignore_exit_code,
        };
        if let Some(log_file) = log_file {
            log_file.message(&format!("result: {status:?}"));
        }
        if !outcome.succeeded() {
            warn!(?status, "{} failed", outcome.tool);
        } else if !status.success() {
            warn!(?status, "{} failed; ignoring its exit code", outcome.tool);
        }
        Ok(outcome)
    }
}

/// Log one line of the tool's output.
///
/// The importance the process host suggests is ignored: PartCover's output is
/// always shown.
fn log_events_from_text_output(line: &str, _suggested: Importance) {
    log_message(Importance::High, line);
}
