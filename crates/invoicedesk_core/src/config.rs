//! Runtime configuration for the dashboard core.
//!
//! # Responsibility
//! - Hold logging and simulated-latency settings chosen at setup.
//! - Parse the string forms accepted from CLI flags and environment.
//!
//! # Invariants
//! - `LatencyProfile::none()` never suspends; tests rely on this.

use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

/// Artificial delay applied before each query resolves.
///
/// Stands in for network latency so loading states can be exercised; it is
/// not a reliability mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyProfile {
    pub get_invoices: Duration,
    pub get_invoice_by_id: Duration,
    pub get_dashboard_stats: Duration,
    pub get_recent_activities: Duration,
    pub update_invoice_status: Duration,
    pub create_invoice: Duration,
}

impl LatencyProfile {
    /// Delays used by the interactive dashboard.
    pub const fn demo() -> Self {
        Self {
            get_invoices: Duration::from_millis(1000),
            get_invoice_by_id: Duration::from_millis(800),
            get_dashboard_stats: Duration::from_millis(600),
            get_recent_activities: Duration::from_millis(500),
            update_invoice_status: Duration::from_millis(800),
            create_invoice: Duration::from_millis(1200),
        }
    }

    /// No delay at all.
    pub const fn none() -> Self {
        Self {
            get_invoices: Duration::ZERO,
            get_invoice_by_id: Duration::ZERO,
            get_dashboard_stats: Duration::ZERO,
            get_recent_activities: Duration::ZERO,
            update_invoice_status: Duration::ZERO,
            create_invoice: Duration::ZERO,
        }
    }

    /// Parses `demo` or `off` (aliases: `on`, `none`), case-insensitive.
    pub fn from_mode(mode: &str) -> Result<Self, ConfigError> {
        match mode.trim().to_ascii_lowercase().as_str() {
            "demo" | "on" => Ok(Self::demo()),
            "off" | "none" => Ok(Self::none()),
            other => Err(ConfigError::UnsupportedLatencyMode(other.to_string())),
        }
    }
}

impl Default for LatencyProfile {
    fn default() -> Self {
        Self::demo()
    }
}

/// Setup-time configuration owned by the application entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files; `None` disables file logs.
    pub log_dir: Option<PathBuf>,
    pub latency: LatencyProfile,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            log_dir: None,
            latency: LatencyProfile::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnsupportedLatencyMode(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLatencyMode(mode) => {
                write!(f, "unsupported latency mode `{mode}`; expected demo|off")
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError, LatencyProfile};
    use std::time::Duration;

    #[test]
    fn latency_mode_parsing() {
        assert_eq!(LatencyProfile::from_mode(" DEMO "), Ok(LatencyProfile::demo()));
        assert_eq!(LatencyProfile::from_mode("off"), Ok(LatencyProfile::none()));
        assert_eq!(
            LatencyProfile::from_mode("slow"),
            Err(ConfigError::UnsupportedLatencyMode("slow".to_string()))
        );
    }

    #[test]
    fn demo_profile_matches_dashboard_delays() {
        let demo = LatencyProfile::demo();
        assert_eq!(demo.get_invoices, Duration::from_millis(1000));
        assert_eq!(demo.create_invoice, Duration::from_millis(1200));
        assert_eq!(demo.get_recent_activities, Duration::from_millis(500));
    }

    #[test]
    fn default_config_has_no_log_dir() {
        let config = AppConfig::default();
        assert!(config.log_dir.is_none());
        assert_eq!(config.latency, LatencyProfile::demo());
    }
}
