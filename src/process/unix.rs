use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::process::{Child, Command, ExitStatus};

use anyhow::{bail, Context};
use nix::errno::Errno;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use tracing::warn;

use crate::command_line::parse_command_line;
use crate::Result;

use super::ProcessStatus;

#[allow(unknown_lints, clippy::needless_pass_by_ref_mut)] // To match Windows
#[mutants::skip] // hard to exercise the ESRCH edge case
pub(super) fn terminate_child(child: &mut Child) -> Result<()> {
    let pid = Pid::from_raw(i32::try_from(child.id()).context("child pid out of range")?);
    match killpg(pid, Signal::SIGTERM) {
        Ok(()) => Ok(()),
        Err(Errno::ESRCH) => {
            Ok(()) // Probably already gone
        }
        Err(Errno::EPERM) if cfg!(target_os = "macos") => {
            Ok(()) // If the process no longer exists then macos can return EPERM (maybe?)
        }
        Err(errno) => {
            let message = format!("failed to terminate child: error {errno}");
            warn!("{}", message);
            bail!(message);
        }
    }
}

#[mutants::skip]
pub(super) fn configure_command(command: &mut Command) {
    command.process_group(0);
}

/// There's no raw command line on Unix, so split it the way the tool would
/// on Windows.
pub(super) fn add_command_line(command: &mut Command, command_line: &str) {
    command.args(parse_command_line(command_line));
}

pub(super) fn interpret_exit(status: ExitStatus) -> ProcessStatus {
    if let Some(code) = status.code() {
        if code == 0 {
            ProcessStatus::Success
        } else {
            ProcessStatus::Failure(code as u32)
        }
    } else if let Some(signal) = status.signal() {
        ProcessStatus::Signalled(signal as u8)
    } else {
        ProcessStatus::Other
    }
}
