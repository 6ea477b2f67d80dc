// Copyright 2021-2026 Martin Pool

//! Global in-process options for running the tool, merged from the command
//! line and the config file.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{anyhow, Context};
use camino::Utf8PathBuf;
use clap::ValueEnum;

use crate::command_line::CoverageArgs;
use crate::config::Config;
use crate::tool::DEFAULT_TOOL_EXE;
use crate::{Args, Result};

/// Options for one run of the tool.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Directory containing the tool, if it's not on `PATH`.
    pub tool_path: Option<Utf8PathBuf>,

    /// File name of the tool.
    pub tool_exe: String,

    /// What to pass to the tool.
    pub coverage: CoverageArgs,

    /// Extra environment variables for the tool, sorted by name.
    pub env: Vec<(String, String)>,

    /// Maximum run time for the tool; `Duration::MAX` if unlimited.
    pub timeout: Duration,

    /// Report success even if the tool exits non-zero.
    pub ignore_exit_code: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            tool_path: None,
            tool_exe: DEFAULT_TOOL_EXE.to_owned(),
            coverage: CoverageArgs::default(),
            env: Vec::new(),
            timeout: Duration::MAX,
            ignore_exit_code: false,
        }
    }
}

/// Whether to use colors in terminal output.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Colors {
    #[default]
    Auto,
    Always,
    Never,
}

impl Colors {
    /// If colors were forced on or off by the user, return that value.
    ///
    /// Otherwise, `None`, meaning to ask the terminal.
    pub fn forced_value(&self) -> Option<bool> {
        match self {
            Colors::Always => Some(true),
            Colors::Never => Some(false),
            Colors::Auto => None,
        }
    }
}

impl Options {
    /// Build options by merging command-line args and config file.
    ///
    /// Single values from the command line win; lists from the command line
    /// come before those from the config.
    pub fn new(args: &Args, config: &Config) -> Result<Options> {
        let timeout = match args.timeout.or(config.timeout) {
            Some(secs) => Duration::try_from_secs_f64(secs)
                .map_err(|err| anyhow!("invalid timeout {secs}: {err}"))?,
            None => Duration::MAX,
        };
        let mut env: BTreeMap<String, String> = config.env.clone();
        env.extend(args.env.iter().cloned());
        let coverage = CoverageArgs {
            target: args.target.clone().or_else(|| config.target.clone()),
            target_args: args
                .target_args
                .clone()
                .or_else(|| config.target_args.clone()),
            working_directory: args
                .target_work_dir
                .clone()
                .or_else(|| config.target_work_dir.clone()),
            output: args.output.clone().or_else(|| config.output.clone()),
            include: join_slices(&args.include, &config.include),
            exclude: join_slices(&args.exclude, &config.exclude),
        };
        Ok(Options {
            tool_path: args.tool_path.clone().or_else(|| config.tool_path.clone()),
            tool_exe: args
                .tool_exe
                .clone()
                .or_else(|| config.tool_exe.clone())
                .unwrap_or_else(|| DEFAULT_TOOL_EXE.to_owned()),
            coverage,
            env: env.into_iter().collect(),
            timeout,
            ignore_exit_code: !args.no_ignore_exit_code
                && (args.ignore_exit_code || config.ignore_exit_code == Some(true)),
        })
    }

    pub fn has_timeout(&self) -> bool {
        self.timeout < Duration::MAX
    }
}

/// Parse a `NAME=VALUE` environment setting from the command line.
pub fn parse_env_var(s: &str) -> Result<(String, String)> {
    let (name, value) = s
        .split_once('=')
        .with_context(|| format!("expected NAME=VALUE, not {s:?}"))?;
    if name.is_empty() {
        return Err(anyhow!("environment variable name is empty in {s:?}"));
    }
    Ok((name.to_owned(), value.to_owned()))
}

fn join_slices(a: &[String], b: &[String]) -> Vec<String> {
    let mut v = Vec::with_capacity(a.len() + b.len());
    v.extend_from_slice(a);
    v.extend_from_slice(b);
    v
}
