//! Configuration for whether contracts are checked.
//!
//! The process-wide default comes from the `CLAUSE_CONTRACTS` environment
//! variable, falling back to whether the crate was compiled with debug
//! assertions. Individual contracts and classes can pin a mode through
//! [`ContractConfig`].

use tracing::warn;

use crate::toggle;

/// Environment variable read once to initialize the global toggle.
pub const ENV_VAR: &str = "CLAUSE_CONTRACTS";

/// How one contract or class decides whether to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckMode {
    /// Follow the process-wide toggle (read at build time and on every call).
    #[default]
    FollowToggle,
    /// Always check, regardless of the toggle.
    Always,
    /// Never check, regardless of the toggle.
    Never,
}

/// Configuration attached to a contract or class definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContractConfig {
    pub mode: CheckMode,
}

impl ContractConfig {
    pub fn enabled() -> Self {
        ContractConfig {
            mode: CheckMode::Always,
        }
    }

    pub fn disabled() -> Self {
        ContractConfig {
            mode: CheckMode::Never,
        }
    }

    /// Pins the mode to whatever `CLAUSE_CONTRACTS` (or the build profile) says.
    pub fn from_env() -> Self {
        if enabled_from_env() {
            ContractConfig::enabled()
        } else {
            ContractConfig::disabled()
        }
    }

    /// Whether checks run right now under this configuration.
    pub fn is_active(&self) -> bool {
        match self.mode {
            CheckMode::FollowToggle => toggle::contracts_enabled(),
            CheckMode::Always => true,
            CheckMode::Never => false,
        }
    }
}

/// Parses an on/off switch value. Returns `None` for anything unrecognized.
pub fn parse_switch(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

/// Reads [`ENV_VAR`]; absent or unrecognized values fall back to
/// `cfg!(debug_assertions)`.
pub fn enabled_from_env() -> bool {
    let fallback = cfg!(debug_assertions);
    match std::env::var(ENV_VAR) {
        Ok(raw) => parse_switch(&raw).unwrap_or_else(|| {
            warn!(
                value = %raw,
                fallback,
                "unrecognized {} value, using build default", ENV_VAR
            );
            fallback
        }),
        Err(_) => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switch_values() {
        assert_eq!(parse_switch("1"), Some(true));
        assert_eq!(parse_switch(" On "), Some(true));
        assert_eq!(parse_switch("FALSE"), Some(false));
        assert_eq!(parse_switch("no"), Some(false));
        assert_eq!(parse_switch("maybe"), None);
    }

    #[test]
    fn pinned_modes_ignore_the_toggle() {
        assert!(ContractConfig::enabled().is_active());
        assert!(!ContractConfig::disabled().is_active());
        assert_eq!(ContractConfig::default().mode, CheckMode::FollowToggle);
    }
}
