//! Runtime settings.
//!
//! Loaded from the process environment, after an optional `.env` file in
//! the working directory has been merged in (existing variables win).
//!
//! | variable                   | default       |
//! |----------------------------|---------------|
//! | `VAULTLINE_LOG_PROFILE`    | `development` |
//! | `VAULTLINE_DISPLAY_LIMIT`  | `80`          |
//! | `VAULTLINE_HISTORY_LIMIT`  | `10`          |
//! | `VAULTLINE_DELETE_EXTRA`   | `true`        |

use crate::diff::{SummaryMode, SummaryOptions, DEFAULT_DISPLAY_LIMIT};
use crate::errors::{ExError, ExErrorKind, Result};
use crate::logging_facility::Profile;
use crate::snapshot::ReconcileOptions;

pub const ENV_LOG_PROFILE: &str = "VAULTLINE_LOG_PROFILE";
pub const ENV_DISPLAY_LIMIT: &str = "VAULTLINE_DISPLAY_LIMIT";
pub const ENV_HISTORY_LIMIT: &str = "VAULTLINE_HISTORY_LIMIT";
pub const ENV_DELETE_EXTRA: &str = "VAULTLINE_DELETE_EXTRA";

/// Default number of history entries listed
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub log_profile: Profile,
    /// Maximum displayed value length, in characters
    pub display_limit: usize,
    /// Entries shown by history listings
    pub history_limit: usize,
    /// Default for `ReconcileOptions::delete_extra`
    pub delete_extra: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_profile: Profile::Development,
            display_limit: DEFAULT_DISPLAY_LIMIT,
            history_limit: DEFAULT_HISTORY_LIMIT,
            delete_extra: true,
        }
    }
}

impl Settings {
    /// Load from the environment, reading `.env` first if present.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self> {
        // A missing .env file is the normal case
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through an arbitrary variable lookup; unset variables keep their
    /// defaults.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if a variable is set to an unparseable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(raw) = lookup(ENV_LOG_PROFILE) {
            settings.log_profile = Profile::parse(&raw)?;
        }
        if let Some(raw) = lookup(ENV_DISPLAY_LIMIT) {
            settings.display_limit = parse_limit(ENV_DISPLAY_LIMIT, &raw)?;
        }
        if let Some(raw) = lookup(ENV_HISTORY_LIMIT) {
            settings.history_limit = parse_limit(ENV_HISTORY_LIMIT, &raw)?;
        }
        if let Some(raw) = lookup(ENV_DELETE_EXTRA) {
            settings.delete_extra = parse_bool(ENV_DELETE_EXTRA, &raw)?;
        }

        Ok(settings)
    }

    /// Rendering options honouring `display_limit`
    pub fn summary_options(&self, mode: SummaryMode) -> SummaryOptions {
        SummaryOptions {
            mode,
            display_limit: self.display_limit,
        }
    }

    /// Reconciliation options honouring `delete_extra`
    pub fn reconcile_options(&self, dry_run: bool, verify: bool) -> ReconcileOptions {
        ReconcileOptions {
            dry_run,
            verify,
            delete_extra: self.delete_extra,
        }
    }
}

fn invalid(name: &str, raw: &str, expected: &str) -> ExError {
    ExError::new(ExErrorKind::InvalidInput)
        .with_op("load_settings")
        .with_message(format!("{}={:?} is not {}", name, raw, expected))
}

fn parse_limit(name: &str, raw: &str) -> Result<usize> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(invalid(name, raw, "a positive integer")),
    }
}

fn parse_bool(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(name, raw, "a boolean")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.display_limit, 80);
        assert_eq!(settings.history_limit, 10);
        assert!(settings.delete_extra);
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            (ENV_LOG_PROFILE, "production"),
            (ENV_DISPLAY_LIMIT, "40"),
            (ENV_HISTORY_LIMIT, "25"),
            (ENV_DELETE_EXTRA, "no"),
        ]))
        .unwrap();
        assert_eq!(settings.log_profile, Profile::Production);
        assert_eq!(settings.display_limit, 40);
        assert_eq!(settings.history_limit, 25);
        assert!(!settings.delete_extra);
    }

    #[test]
    fn test_invalid_limit_rejected() {
        for bad in ["0", "-3", "many"] {
            let err = Settings::from_lookup(lookup(&[(ENV_DISPLAY_LIMIT, bad)])).unwrap_err();
            assert_eq!(err.kind(), ExErrorKind::InvalidInput);
            assert!(err.message().contains(ENV_DISPLAY_LIMIT));
        }
    }

    #[test]
    fn test_derived_options() {
        let settings =
            Settings::from_lookup(lookup(&[(ENV_DISPLAY_LIMIT, "12"), (ENV_DELETE_EXTRA, "off")]))
                .unwrap();
        let summary = settings.summary_options(SummaryMode::ShowValues);
        assert_eq!(summary.display_limit, 12);
        assert_eq!(summary.mode, SummaryMode::ShowValues);

        let options = settings.reconcile_options(true, false);
        assert!(options.dry_run);
        assert!(!options.delete_extra);
    }

    #[test]
    fn test_invalid_bool_rejected() {
        let err = Settings::from_lookup(lookup(&[(ENV_DELETE_EXTRA, "maybe")])).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    }

    #[test]
    fn test_invalid_profile_rejected() {
        let err = Settings::from_lookup(lookup(&[(ENV_LOG_PROFILE, "verbose")])).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    }
}
