//! Runtime configuration flags.
//!
//! The only flag today is `CORNICHON_STRICT_PARAMS`, controlling whether a
//! mismatch between step placeholders and example parameters fails
//! validation (default) or is demoted to a warning.

use std::sync::atomic::{AtomicU8, Ordering};

const OVERRIDE_UNSET: u8 = 0;
const OVERRIDE_FALSE: u8 = 1;
const OVERRIDE_TRUE: u8 = 2;

static STRICT_PARAMS_OVERRIDE: AtomicU8 = AtomicU8::new(OVERRIDE_UNSET);

fn parse_env_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "true" | "TRUE" | "True" | "yes" | "YES" | "Yes" | "on" | "ON" | "On" => Some(true),
        "0" | "false" | "FALSE" | "False" | "no" | "NO" | "No" | "off" | "OFF" | "Off" => {
            Some(false)
        }
        _ => None,
    }
}

fn env_strict_params() -> Option<bool> {
    std::env::var("CORNICHON_STRICT_PARAMS")
        .ok()
        .as_deref()
        .and_then(parse_env_bool)
}

fn override_state() -> Option<bool> {
    match STRICT_PARAMS_OVERRIDE.load(Ordering::Relaxed) {
        OVERRIDE_FALSE => Some(false),
        OVERRIDE_TRUE => Some(true),
        _ => None,
    }
}

/// Whether a step/example parameter mismatch fails outline expansion.
#[must_use]
pub fn strict_params() -> bool {
    override_state().or_else(env_strict_params).unwrap_or(true)
}

/// Override the strict-params flag for the current process.
///
/// Tests should pair this with [`clear_strict_params_override`] to restore
/// environment-driven behaviour.
pub fn set_strict_params(enabled: bool) {
    let value = if enabled {
        OVERRIDE_TRUE
    } else {
        OVERRIDE_FALSE
    };
    STRICT_PARAMS_OVERRIDE.store(value, Ordering::Relaxed);
}

/// Remove any in-process override for the strict-params flag.
pub fn clear_strict_params_override() {
    STRICT_PARAMS_OVERRIDE.store(OVERRIDE_UNSET, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn default_is_strict() {
        clear_strict_params_override();
        assert!(strict_params());
    }

    #[test]
    #[serial]
    fn override_toggles_flag() {
        clear_strict_params_override();
        set_strict_params(false);
        assert!(!strict_params());
        set_strict_params(true);
        assert!(strict_params());
        clear_strict_params_override();
    }

    #[test]
    fn parse_env_bool_understands_common_spellings() {
        for truthy in ["1", "true", "Yes", "ON"] {
            assert_eq!(parse_env_bool(truthy), Some(true), "{truthy}");
        }
        for falsy in ["0", "false", "No", "OFF"] {
            assert_eq!(parse_env_bool(falsy), Some(false), "{falsy}");
        }
        assert_eq!(parse_env_bool("maybe"), None);
    }
}
