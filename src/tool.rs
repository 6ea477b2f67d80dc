// Copyright 2023-2026 Martin Pool.

//! Find the PartCover executable.

use std::env;

use anyhow::{bail, Context};
use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

use crate::Result;

/// The file name of the tool, unless overridden.
pub const DEFAULT_TOOL_EXE: &str = "PartCover.exe";

/// Return the path to run for the tool.
///
/// With a tool directory, the executable must exist there, and the returned
/// path is absolute so that it still works from the tool's working directory.
/// Without one, the bare name is returned and the OS searches `PATH` when it's
/// run.
pub fn full_path_to_tool(tool_path: Option<&Utf8Path>, tool_exe: &str) -> Result<Utf8PathBuf> {
    if tool_exe.trim().is_empty() {
        bail!("tool executable name is empty");
    }
    match tool_path {
        Some(dir) => {
            let mut path = dir.join(tool_exe);
            if path.is_relative() {
                let cwd = env::current_dir().context("get current directory")?;
                let cwd = Utf8PathBuf::try_from(cwd).context("current directory is not UTF-8")?;
                path = cwd.join(path);
            }
            debug!(%path, "looking for tool");
            if !path.is_file() {
                bail!("tool not found: {path}");
            }
            Ok(path)
        }
        None => Ok(Utf8PathBuf::from(tool_exe)),
    }
}

#[cfg(test)]
mod test {
    use std::fs::write;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn bare_name_without_tool_path() {
        assert_eq!(
            full_path_to_tool(None, DEFAULT_TOOL_EXE).unwrap(),
            "PartCover.exe"
        );
    }

    #[test]
    fn tool_path_is_joined_with_name() {
        let tmp = TempDir::new().unwrap();
        let dir = Utf8Path::from_path(tmp.path()).unwrap();
        write(dir.join("PartCover.exe"), b"").unwrap();
        assert_eq!(
            full_path_to_tool(Some(dir), DEFAULT_TOOL_EXE).unwrap(),
            dir.join("PartCover.exe")
        );
    }

    #[test]
    fn missing_tool_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let dir = Utf8Path::from_path(tmp.path()).unwrap();
        let err = full_path_to_tool(Some(dir), "partcover").unwrap_err();
        assert!(err.to_string().starts_with("tool not found: "), "{err}");
    }

    #[test]
    fn relative_tool_path_becomes_absolute() {
        let path = full_path_to_tool(Some(Utf8Path::new("src")), "main.rs").unwrap();
        assert!(path.is_absolute(), "{path}");
        assert!(path.ends_with("src/main.rs"), "{path}");
        assert!(path.is_file());
    }

    #[test]
    fn empty_tool_name_is_an_error() {
        full_path_to_tool(None, " ").unwrap_err();
    }
}
