// Copyright 2022-2026 Martin Pool.

//! `partcover.toml` configuration file.
//!
//! The config file is read after parsing command line arguments, because
//! they can name a different file or turn it off.
//!
//! The config file is then merged in to the [Options](crate::options::Options).

use std::collections::BTreeMap;
use std::default::Default;
use std::fs::read_to_string;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

use crate::Result;

/// The config file read from the working directory, if no other is named.
pub const DEFAULT_CONFIG_FILE: &str = "partcover.toml";

/// Configuration read from a config file.
///
/// This is similar to `Options`, and eventually merged into it, but separate because it
/// can be deserialized.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory containing the tool.
    pub tool_path: Option<Utf8PathBuf>,
    /// File name of the tool, if not `PartCover.exe`.
    pub tool_exe: Option<String>,
    /// Program to run under coverage.
    pub target: Option<String>,
    /// Arguments for the target, as one string.
    pub target_args: Option<String>,
    /// Working directory for the target.
    pub target_work_dir: Option<String>,
    /// Where PartCover writes results.
    pub output: Option<String>,
    /// Assembly expressions to include.
    pub include: Vec<String>,
    /// Assembly expressions to exclude.
    pub exclude: Vec<String>,
    /// Maximum run time for the tool, in seconds.
    pub timeout: Option<f64>,
    /// Succeed even if the tool exits non-zero.
    pub ignore_exit_code: Option<bool>,
    /// Extra environment variables for the tool.
    pub env: BTreeMap<String, String>,
}

impl Config {
    pub fn read_file(path: &Utf8Path) -> Result<Config> {
        let toml = read_to_string(path).with_context(|| format!("read config {path:?}"))?;
        toml::de::from_str(&toml).with_context(|| format!("parse toml from {path:?}"))
    }

    /// Read `partcover.toml` from a directory, and return a default (empty)
    /// Config if the file does not exist.
    pub fn read_dir_config(dir: &Utf8Path) -> Result<Config> {
        let path = dir.join(DEFAULT_CONFIG_FILE);
        if path.exists() {
            Config::read_file(&path)
        } else {
            Ok(Config::default())
        }
    }
}
