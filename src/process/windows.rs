use std::os::windows::process::CommandExt;
use std::process::{Child, Command, ExitStatus};

use anyhow::Context;

use crate::Result;

use super::ProcessStatus;

#[mutants::skip] // hard to exercise the ESRCH edge case
pub(super) fn terminate_child(child: &mut Child) -> Result<()> {
    child.kill().context("Kill child")
}

#[mutants::skip]
pub(super) fn configure_command(_command: &mut Command) {}

/// Pass the command line through untouched: the tool parses it itself.
pub(super) fn add_command_line(command: &mut Command, command_line: &str) {
    command.raw_arg(command_line);
}

pub(super) fn interpret_exit(status: ExitStatus) -> ProcessStatus {
    match status.code() {
        Some(0) => ProcessStatus::Success,
        Some(code) => ProcessStatus::Failure(code as u32),
        None => ProcessStatus::Other,
    }
}
