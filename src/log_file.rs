// Copyright 2021-2026 Martin Pool

//! The log file for one run of the tool: its output, mixed with commentary
//! from partcover-task.

use std::fs::{File, OpenOptions};
use std::io::Write;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};

use crate::Result;

/// Text inserted in log files to make important sections more visible.
pub const LOG_MARKER: &str = "***";

#[derive(Debug)]
pub struct LogFile {
    path: Utf8PathBuf,
    write_to: File,
}

impl LogFile {
    /// Create the log file, replacing any left from a previous run.
    pub fn create(path: &Utf8Path) -> Result<LogFile> {
        if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create log directory {parent:?}"))?;
        }
        File::create(path).with_context(|| format!("create log file {path:?}"))?;
        // Messages and the tool's output are both appended, so they interleave.
        let write_to = OpenOptions::new()
            .append(true)
            .open(path)
            .with_context(|| format!("open log file {path:?}"))?;
        Ok(LogFile {
            path: path.to_owned(),
            write_to,
        })
    }

    /// Open the log file to append more content.
    pub fn open_append(&self) -> Result<File> {
        OpenOptions::new()
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open {} for append", self.path))
    }

    /// Write a message, with a marker.
    pub fn message(&mut self, message: &str) {
        write!(self.write_to, "\n{LOG_MARKER} {message}\n").expect("write message to log");
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}
