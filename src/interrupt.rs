// Copyright 2022-2026 Martin Pool

//! Remember ctrl-c in a global flag, so that the wait for the tool can stop it
//! and clean up rather than leaving it running.

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{bail, Context};
use tracing::debug;

use crate::Result;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

pub fn install_handler() -> Result<()> {
    ctrlc::set_handler(|| INTERRUPTED.store(true, Ordering::SeqCst))
        .context("install ctrl-c handler")?;
    debug!("installed ctrl-c handler");
    Ok(())
}

/// Return an error if the program was interrupted and should stop the tool.
pub fn check_interrupted() -> Result<()> {
    if INTERRUPTED.load(Ordering::SeqCst) {
        bail!("interrupted while running the tool")
    }
    Ok(())
}
