//! Subscriber installation.
//!
//! `RUST_LOG` overrides the per-profile default filter.

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

use crate::config::Settings;
use crate::errors::{ExError, ExErrorKind};

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output for development
    Development,
    /// JSON structured output for production
    Production,
    /// Test capture mode for deterministic testing
    Test,
}

impl Profile {
    /// Parse a profile name as found in configuration (case-insensitive)
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an unknown profile name.
    pub fn parse(name: &str) -> Result<Self, ExError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Profile::Development),
            "production" | "prod" => Ok(Profile::Production),
            "test" => Ok(Profile::Test),
            other => Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("parse_log_profile")
                .with_message(format!("unknown log profile '{}'", other))),
        }
    }
}

static INIT_ONCE: Once = Once::new();

fn filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the global subscriber for `profile`.
///
/// Only the first call has any effect.
///
/// - **Development**: human-readable lines, `debug` for vaultline crates
/// - **Production**: one JSON object per event, `info`
/// - **Test**: bare registry; `init_test_capture()` records events instead
///
/// ```
/// use vaultline_core::logging_facility::{init, Profile};
///
/// init(Profile::Development);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| match profile {
        Profile::Development => tracing_subscriber::fmt()
            .with_env_filter(filter_or("vaultline=debug"))
            .init(),
        Profile::Production => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter_or("vaultline=info"))
            .init(),
        Profile::Test => tracing_subscriber::registry().init(),
    });
}

/// Install the subscriber named by `settings.log_profile`.
pub fn init_from_settings(settings: &Settings) {
    init(settings.log_profile);
}
