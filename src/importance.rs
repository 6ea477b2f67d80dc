// Copyright 2026 Martin Pool

//! How prominently a message should appear in the build log.

use tracing::{debug, info, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Importance {
    /// Shown at the default verbosity.
    High,
    Normal,
    Low,
}

/// Send one message to the log at the level for its importance.
pub fn log_message(importance: Importance, message: &str) {
    // tracing needs a constant level at each callsite.
    match importance {
        Importance::High => info!("{message}"),
        Importance::Normal => debug!("{message}"),
        Importance::Low => trace!("{message}"),
    }
}
