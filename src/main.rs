// Copyright 2021-2026 Martin Pool

//! `partcover-task`: Run PartCover code coverage as a step in a build.

mod command_line;
mod config;
mod console;
mod exit_code;
mod importance;
mod interrupt;
mod log_file;
mod options;
mod outcome;
mod process;
mod task;
mod tool;

use std::io;
use std::process::exit;

use anyhow::Result;
use camino::Utf8PathBuf;
use clap::CommandFactory;
use clap::Parser;
use clap_complete::{generate, Shell};
use serde_json::json;
use tracing::debug;

// Imports of public names from this crate.
use crate::command_line::parse_command_line;
use crate::config::Config;
use crate::console::Console;
use crate::log_file::LogFile;
use crate::options::{parse_env_var, Colors, Options};
use crate::task::PartCoverTask;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const NAME: &str = env!("CARGO_PKG_NAME");

/// Run PartCover code coverage over a test runner, as a build step.
///
/// Settings come from these options and from `partcover.toml` in the
/// working directory.
#[derive(Parser, PartialEq, Debug)]
#[command(name = "partcover-task", author, about)]
struct Args {
    /// log level for stderr (trace, debug, info, warn, error).
    #[arg(
        long,
        short = 'L',
        default_value = "info",
        env = "PARTCOVER_TASK_TRACE_LEVEL"
    )]
    level: tracing::Level,

    /// whether to use colors in output.
    #[arg(long, value_enum, default_value_t = Colors::Auto, env = "PARTCOVER_TASK_COLORS")]
    colors: Colors,

    /// read this config file instead of partcover.toml.
    #[arg(long)]
    config: Option<Utf8PathBuf>,

    /// generate autocompletions for the given shell.
    #[arg(long)]
    completions: Option<Shell>,

    /// directory to run the tool in, and to look for partcover.toml.
    #[arg(long, short = 'd')]
    dir: Option<Utf8PathBuf>,

    /// extra environment variable for the tool, as NAME=VALUE.
    #[arg(long, value_parser = parse_env_var)]
    env: Vec<(String, String)>,

    /// assembly expression to exclude from coverage, like `[*.Test]*`.
    #[arg(long)]
    exclude: Vec<String>,

    /// succeed even if the tool exits non-zero.
    #[arg(long, overrides_with = "no_ignore_exit_code")]
    ignore_exit_code: bool,

    /// fail if the tool exits non-zero, even if the config says to ignore it.
    #[arg(long, overrides_with = "ignore_exit_code")]
    no_ignore_exit_code: bool,

    /// assembly expression to include in coverage, like `[MyAssembly.*]*`.
    #[arg(long)]
    include: Vec<String>,

    /// output json: the invocation with --print-command, otherwise the outcome.
    #[arg(long)]
    json: bool,

    /// write the tool's output and a trace of this run to this file.
    #[arg(long)]
    log_file: Option<Utf8PathBuf>,

    /// don't read partcover.toml.
    #[arg(long)]
    no_config: bool,

    /// file where PartCover writes coverage results.
    #[arg(long, short = 'o')]
    output: Option<String>,

    /// print the tool's command line, don't run anything.
    #[arg(long)]
    print_command: bool,

    /// program to run under coverage, generally a test runner.
    #[arg(long, short = 't')]
    target: Option<String>,

    /// arguments for the target, as one string.
    #[arg(long, allow_hyphen_values = true)]
    target_args: Option<String>,

    /// working directory for the target.
    #[arg(long)]
    target_work_dir: Option<String>,

    /// maximum run time for the tool, in seconds.
    #[arg(long)]
    timeout: Option<f64>,

    /// file name of the tool.
    #[arg(long)]
    tool_exe: Option<String>,

    /// directory containing the tool; by default it's found on PATH.
    #[arg(long, env = "PARTCOVER_TASK_TOOL_PATH")]
    tool_path: Option<Utf8PathBuf>,

    /// show version and quit.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    version: bool,
}

fn main() -> Result<()> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.use_stderr() => {
            eprintln!("{e}");
            exit(exit_code::USAGE);
        }
        Err(e) => {
            // --help
            print!("{e}");
            exit(exit_code::SUCCESS);
        }
    };
    let console = Console::new();
    console.set_colors_enabled(args.colors);
    console.setup_global_trace(args.level, args.colors)?;
    interrupt::install_handler()?;

    if args.version {
        println!("{NAME} {VERSION}");
        return Ok(());
    } else if let Some(shell) = args.completions {
        generate(shell, &mut Args::command(), NAME, &mut io::stdout());
        return Ok(());
    }

    let cwd = args.dir.clone().unwrap_or_else(|| Utf8PathBuf::from("."));
    let config = if args.no_config {
        Config::default()
    } else if let Some(config_path) = &args.config {
        Config::read_file(config_path)?
    } else {
        Config::read_dir_config(&cwd)?
    };
    debug!(?config);
    let options = Options::new(&args, &config)?;
    debug!(?options);
    let task = PartCoverTask::new(options);

    if args.print_command {
        let command_line = task.command_line();
        if args.json {
            let invocation = json!({
                "tool": task.full_path_to_tool()?,
                "argv": parse_command_line(&command_line),
                "command_line": command_line,
            });
            println!("{}", serde_json::to_string_pretty(&invocation)?);
        } else {
            println!("{command_line}");
        }
        return Ok(());
    }

    let mut log_file = args.log_file.as_deref().map(LogFile::create).transpose()?;
    if let Some(log_file) = &log_file {
        console.set_log_file(log_file.open_append()?);
        debug!(path = %log_file.path(), "log file open");
    }
    let outcome = task.execute(&cwd, log_file.as_mut())?;
    console.task_finished(&outcome);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }
    exit(outcome.exit_code());
}
