//! Configuration types.

use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::onboarding::Pacing;

/// Which persistence backend the wizard talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Real REST endpoints under `api_base_url`.
    Http,
    /// In-process simulated service (demo/staging).
    Mock,
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "mock" => Ok(Self::Mock),
            other => Err(ConfigError::InvalidValue {
                key: "BIZ365_BACKEND".to_string(),
                message: format!("expected \"http\" or \"mock\", got \"{other}\""),
            }),
        }
    }
}

/// Onboarding wizard configuration.
#[derive(Debug, Clone)]
pub struct OnboardingConfig {
    /// Base URL the step endpoints are resolved against.
    pub api_base_url: String,
    /// External dashboard the user is handed off to on completion.
    pub dashboard_url: String,
    /// Pause between a successful save and the step transition.
    pub advance_delay: Duration,
    /// Pause between completion and the dashboard hand-off.
    pub handoff_delay: Duration,
    /// Per-request timeout for backend calls.
    pub request_timeout: Duration,
    /// Accept any company information on step 1.
    pub permissive_company_step: bool,
    pub backend: BackendKind,
    /// Port for the `serve` stub backend.
    pub stub_port: u16,
}

impl Default for OnboardingConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8787".to_string(),
            dashboard_url: "https://dashboard.biz365.app".to_string(),
            advance_delay: Duration::from_millis(1000),
            handoff_delay: Duration::from_millis(1500),
            request_timeout: Duration::from_secs(15),
            permissive_company_step: false,
            backend: BackendKind::Http,
            stub_port: 8787,
        }
    }
}

impl OnboardingConfig {
    /// Load from `BIZ365_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_base_url = lookup("BIZ365_API_BASE_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base_url);
        let dashboard_url = lookup("BIZ365_DASHBOARD_URL").unwrap_or(defaults.dashboard_url);

        let advance_delay = parse_or(&lookup, "BIZ365_ADVANCE_DELAY_MS", 1000u64)?;
        let handoff_delay = parse_or(&lookup, "BIZ365_HANDOFF_DELAY_MS", 1500u64)?;
        let request_timeout = parse_or(&lookup, "BIZ365_REQUEST_TIMEOUT_SECS", 15u64)?;
        let permissive_company_step =
            parse_or(&lookup, "BIZ365_PERMISSIVE_COMPANY_STEP", false)?;
        let backend = match lookup("BIZ365_BACKEND") {
            Some(raw) => raw.parse()?,
            None => defaults.backend,
        };
        let stub_port = parse_or(&lookup, "BIZ365_STUB_PORT", defaults.stub_port)?;

        Ok(Self {
            api_base_url,
            dashboard_url,
            advance_delay: Duration::from_millis(advance_delay),
            handoff_delay: Duration::from_millis(handoff_delay),
            request_timeout: Duration::from_secs(request_timeout),
            permissive_company_step,
            backend,
            stub_port,
        })
    }

    pub fn pacing(&self) -> Pacing {
        Pacing {
            advance_delay: self.advance_delay,
            handoff_delay: self.handoff_delay,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}
