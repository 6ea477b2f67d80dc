// Copyright 2021-2026 Martin Pool

//! Send trace output to the terminal and to the log file.

use std::fs::File;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use console::style;
use humantime::format_duration;
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;

use crate::options::Colors;
use crate::outcome::TaskOutcome;
use crate::Result;

/// An interface to the console for the rest of partcover-task.
pub struct Console {
    /// The log file, if it's open yet.
    log_file: Arc<Mutex<Option<File>>>,
}

impl Console {
    pub fn new() -> Console {
        Console {
            log_file: Arc::new(Mutex::new(None)),
        }
    }

    pub fn set_colors_enabled(&self, colors: Colors) {
        if let Some(colors) = colors.forced_value() {
            ::console::set_colors_enabled(colors);
            ::console::set_colors_enabled_stderr(colors);
        }
        // Otherwise, let the console crate decide, based on isatty, etc.
    }

    /// Print the one-line summary of how the tool finished.
    pub fn task_finished(&self, outcome: &TaskOutcome) {
        let status = if outcome.succeeded() {
            style("ok").for_stderr().green()
        } else if outcome.status.timeout() {
            style("TIMEOUT").for_stderr().red().bold()
        } else {
            style("FAILED").for_stderr().red().bold()
        };
        let code = match outcome.status.exit_code() {
            Some(code) => format!("exit code {code}"),
            None => format!("{:?}", outcome.status),
        };
        self.message(&format!(
            "{:8} {} {} in {}\n",
            status,
            outcome.tool,
            code,
            style_duration(outcome.duration)
        ));
    }

    /// Write a message to stderr, bypassing tracing.
    pub fn message(&self, message: &str) {
        // A broken stderr isn't worth failing the build over.
        let _ = io::stderr().write_all(message.as_bytes());
    }

    /// Return a tracing `MakeWriter` that will send messages to the log file if
    /// it's open.
    pub fn make_log_file_writer(&self) -> LogFileWriter {
        LogFileWriter(Arc::clone(&self.log_file))
    }

    /// Set the log file that receives all trace output.
    pub fn set_log_file(&self, file: File) {
        *self.log_file.lock().expect("lock log file") = Some(file);
    }

    /// Configure tracing to send messages to the terminal and log file.
    ///
    /// The log file is opened later and provided by [Console::set_log_file].
    pub fn setup_global_trace(&self, console_trace_level: Level, colors: Colors) -> Result<()> {
        // Show time relative to the start of the program.
        let uptime = tracing_subscriber::fmt::time::uptime();
        let stderr_colors = colors
            .forced_value()
            .unwrap_or_else(::console::colors_enabled_stderr);
        let log_file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_file(true) // source file name
            .with_line_number(true)
            .with_timer(uptime)
            .with_writer(self.make_log_file_writer());
        let level_filter = tracing_subscriber::filter::LevelFilter::from_level(console_trace_level);
        let console_layer = tracing_subscriber::fmt::layer()
            .with_ansi(stderr_colors)
            .with_writer(io::stderr)
            .with_target(false)
            .without_time()
            .with_filter(level_filter);
        tracing_subscriber::registry()
            .with(log_file_layer)
            .with(console_layer)
            .init();
        Ok(())
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

/// Write trace output to the log file if it's open.
pub struct LogFileWriter(Arc<Mutex<Option<File>>>);

impl<'w> MakeWriter<'w> for LogFileWriter {
    type Writer = Self;

    fn make_writer(&self) -> Self::Writer {
        LogFileWriter(self.0.clone())
    }
}

impl io::Write for LogFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(file) = self.0.lock().unwrap().as_mut() {
            file.write(buf)
        } else {
            Ok(buf.len())
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(file) = self.0.lock().unwrap().as_mut() {
            file.flush()
        } else {
            Ok(())
        }
    }
}

fn style_duration(duration: Duration) -> String {
    // Drop sub-millisecond noise.
    let duration = Duration::from_millis(duration.as_millis() as u64);
    style(format_duration(duration).to_string())
        .for_stderr()
        .cyan()
        .to_string()
}
