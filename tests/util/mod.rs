// Copyright 2024-2026 Martin Pool

#![allow(dead_code)] // rustc doesn't understand they're used by multiple crates

//! Reusable utilities for partcover-task tests.

use std::env;
use std::path::PathBuf;

use lazy_static::lazy_static;
use tempfile::TempDir;

lazy_static! {
    pub static ref MAIN_BINARY: PathBuf = assert_cmd::cargo::cargo_bin("partcover-task");
}

pub fn run() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(MAIN_BINARY.as_os_str());
    // Strip any options configured in the environment running these tests,
    // so that they don't cause unexpected behavior in the code under test.
    env::vars()
        .map(|(k, _v)| k)
        .filter(|k| {
            k.starts_with("PARTCOVER_TASK_")
                || k == "CLICOLOR_FORCE"
                || k == "NOCOLOR"
                || k == "RUST_BACKTRACE"
        })
        .for_each(|k| {
            cmd.env_remove(k);
        });
    cmd
}

/// A fresh empty directory to run in, so that no stray `partcover.toml`
/// is picked up.
pub fn empty_dir() -> TempDir {
    TempDir::with_prefix("partcover-task-test-").unwrap()
}

/// Write `partcover.toml` into a directory.
pub fn write_config_file(dir: &TempDir, config: &str) {
    std::fs::write(dir.path().join("partcover.toml"), config.as_bytes()).unwrap();
}

/// Make an executable shell script standing in for PartCover.
///
/// It echoes each argument on its own line, prefixed by `arg: `, and appends
/// them to `args.txt` in its working directory.
#[cfg(unix)]
pub fn write_fake_tool(dir: &TempDir, name: &str, extra_script: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.path().join(name);
    let script = format!(
        "#!/bin/sh\nfor a in \"$@\"; do echo \"arg: $a\"; echo \"$a\" >> args.txt; done\n{extra_script}\n"
    );
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
