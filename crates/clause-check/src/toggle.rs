//! The process-wide contract check switch.
//!
//! Initialized lazily from [`config::enabled_from_env`] on first read. A
//! program that wants to decide at startup (a command-line flag, say) calls
//! [`set_contracts_enabled`] before building any contract.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use tracing::debug;

use crate::config;

static ENABLED: OnceLock<AtomicBool> = OnceLock::new();

fn flag() -> &'static AtomicBool {
    ENABLED.get_or_init(|| {
        let enabled = config::enabled_from_env();
        debug!(enabled, "contract checks initialized");
        AtomicBool::new(enabled)
    })
}

/// Whether contracts following the toggle are checked.
pub fn contracts_enabled() -> bool {
    flag().load(Ordering::Relaxed)
}

/// Turns checks on or off for the whole process.
///
/// Contracts built while the toggle is off stay unwrapped even if it is
/// turned back on later; contracts built while on stop checking as soon as
/// it is turned off.
pub fn set_contracts_enabled(enabled: bool) {
    flag().store(enabled, Ordering::Relaxed);
    debug!(enabled, "contract checks toggled");
}
