// Copyright 2021-2026 Martin Pool

//! Manage a subprocess, with polling, timeouts, termination, and so on.
//!
//! This module knows nothing about PartCover: it runs a program with a
//! pre-built command line and hands each line of output to a sink.
//!
//! On Unix, the subprocess runs as its own process group, so that any
//! grandchild processes are also signalled if it's interrupted.

use std::fmt;
use std::io::{BufRead, BufReader, Read};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, sleep, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::Context;
use camino::Utf8Path;
use serde::Serialize;
use tracing::{debug, info, span, trace, warn, Level};

use crate::importance::Importance;
use crate::interrupt::check_interrupted;
use crate::Result;

#[cfg(unix)]
mod unix;
#[cfg(unix)]
use unix::{add_command_line, configure_command, interpret_exit, terminate_child};

#[cfg(windows)]
mod windows;
#[cfg(windows)]
use windows::{add_command_line, configure_command, interpret_exit, terminate_child};

/// How frequently to check if a subprocess finished.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long to wait for the child to go away after asking it to stop.
const TERMINATE_GRACE: Duration = Duration::from_secs(10);

/// Which of the child's output streams a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    /// The importance a build host gives to lines from this stream, unless
    /// the task says otherwise.
    pub fn default_importance(self) -> Importance {
        match self {
            Stream::Stdout => Importance::Low,
            Stream::Stderr => Importance::Normal,
        }
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        })
    }
}

pub struct Process {
    child: Child,
    start: Instant,
    timeout: Duration,
    lines: Receiver<(Stream, String)>,
    readers: Vec<JoinHandle<()>>,
}

impl Process {
    /// Run a subprocess to completion, watching for interrupts, with a timeout,
    /// passing each line it writes to `sink`.
    pub fn run(
        program: &Utf8Path,
        command_line: &str,
        env: &[(String, String)],
        cwd: &Utf8Path,
        timeout: Duration,
        sink: &mut dyn FnMut(Stream, &str),
    ) -> Result<ProcessStatus> {
        let mut child = Process::start(program, command_line, env, cwd, timeout)?;
        let process_status = loop {
            child.forward_lines(sink);
            if let Some(status) = child.poll()? {
                break status;
            }
        };
        child.finish_output(sink);
        debug!(?process_status, elapsed = ?child.start.elapsed(), "process finished");
        Ok(process_status)
    }

    /// Launch a process, and return an object representing the child.
    pub fn start(
        program: &Utf8Path,
        command_line: &str,
        env: &[(String, String)],
        cwd: &Utf8Path,
        timeout: Duration,
    ) -> Result<Process> {
        let start = Instant::now();
        debug!(%program, %command_line, %cwd, "start process");
        let mut command = Command::new(program);
        add_command_line(&mut command, command_line);
        command
            .envs(env.iter().map(|(k, v)| (k, v)))
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        configure_command(&mut command);
        let mut child = command
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;
        let (tx, lines) = mpsc::channel();
        let mut readers = Vec::new();
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_reader(Stream::Stdout, stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_reader(Stream::Stderr, stderr, tx));
        }
        Ok(Process {
            child,
            start,
            timeout,
            lines,
            readers,
        })
    }

    /// Wait briefly for output, and pass along everything that's arrived.
    fn forward_lines(&mut self, sink: &mut dyn FnMut(Stream, &str)) {
        match self.lines.recv_timeout(WAIT_POLL_INTERVAL) {
            Ok((stream, line)) => {
                sink(stream, &line);
                while let Ok((stream, line)) = self.lines.try_recv() {
                    sink(stream, &line);
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            // Both pipes are closed but the child may still be running.
            Err(RecvTimeoutError::Disconnected) => sleep(WAIT_POLL_INTERVAL),
        }
    }

    /// After the child exits, wait for the readers to reach the end of the
    /// pipes and forward the last lines.
    fn finish_output(&mut self, sink: &mut dyn FnMut(Stream, &str)) {
        for reader in self.readers.drain(..) {
            if reader.join().is_err() {
                warn!("output reader thread panicked");
            }
        }
        for (stream, line) in self.lines.try_iter() {
            sink(stream, &line);
        }
    }

    #[mutants::skip] // It's hard to avoid timeouts if this never works...
    pub fn poll(&mut self) -> Result<Option<ProcessStatus>> {
        let elapsed = self.start.elapsed();
        if elapsed > self.timeout {
            info!(
                "timeout after {:.1}s, terminating child process...",
                elapsed.as_secs_f32()
            );
            self.terminate()?;
            Ok(Some(ProcessStatus::Timeout))
        } else if let Err(e) = check_interrupted() {
            debug!("interrupted, terminating child process...");
            self.terminate()?;
            Err(e)
        } else if let Some(status) = self.child.try_wait().context("poll child process")? {
            Ok(Some(interpret_exit(status)))
        } else {
            Ok(None)
        }
    }

    /// Terminate the subprocess, initially gently and then harshly.
    ///
    /// Blocks until the subprocess is terminated.
    fn terminate(&mut self) -> Result<()> {
        let _span = span!(Level::DEBUG, "terminate_child", pid = self.child.id()).entered();
        debug!("terminating child process");
        terminate_child(&mut self.child)?;
        trace!("wait for child after termination");
        if let Some(exit_status) = self.wait_with_deadline(TERMINATE_GRACE)? {
            debug!("terminated child exit status {exit_status:?}");
        } else {
            warn!("child did not exit after termination");
            let kill_result = self.child.kill();
            warn!("force kill child: {:?}", kill_result);
            if kill_result.is_ok() {
                if let Ok(Some(exit_status)) = self.wait_with_deadline(TERMINATE_GRACE) {
                    debug!("force kill child exit status {exit_status:?}");
                } else {
                    warn!("child did not exit after force kill");
                }
            }
        }
        Ok(())
    }

    fn wait_with_deadline(
        &mut self,
        limit: Duration,
    ) -> Result<Option<std::process::ExitStatus>> {
        let deadline = Instant::now() + limit;
        loop {
            if let Some(status) = self
                .child
                .try_wait()
                .context("wait for child after terminating")?
            {
                return Ok(Some(status));
            } else if Instant::now() > deadline {
                return Ok(None);
            }
            sleep(WAIT_POLL_INTERVAL);
        }
    }
}

/// Read lines from one of the child's pipes until it closes.
///
/// Non-UTF-8 content is replaced.
fn spawn_reader<R: Read + Send + 'static>(
    stream: Stream,
    reader: R,
    tx: Sender<(Stream, String)>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        for line in BufReader::new(reader).split(b'\n') {
            match line {
                Ok(bytes) => {
                    let line = String::from_utf8_lossy(&bytes);
                    let line = line.trim_end_matches('\r').to_owned();
                    if tx.send((stream, line)).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    debug!(%stream, ?err, "error reading child output");
                    break;
                }
            }
        }
    })
}

/// The result of running a single child process.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum ProcessStatus {
    Success,
    Failure(u32),
    Signalled(u8),
    Timeout,
    Other,
}

impl ProcessStatus {
    pub fn success(&self) -> bool {
        *self == ProcessStatus::Success
    }

    pub fn timeout(&self) -> bool {
        *self == ProcessStatus::Timeout
    }

    /// The exit code a build host would report for this process.
    ///
    /// A timeout is reported as -1; a child killed by a signal has none.
    pub fn exit_code(&self) -> Option<i32> {
        match *self {
            ProcessStatus::Success => Some(0),
            ProcessStatus::Failure(code) => Some(code as i32),
            ProcessStatus::Timeout => Some(-1),
            ProcessStatus::Signalled(_) | ProcessStatus::Other => None,
        }
    }
}
