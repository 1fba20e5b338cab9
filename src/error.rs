//! Error types for the onboarding wizard.
//!
//! Field validation failures are not errors: they are returned as
//! [`FieldErrors`](crate::onboarding::FieldErrors) data. Everything here is
//! either a misconfiguration, a backend failure, or a misuse of the wizard.

use std::time::Duration;

use crate::onboarding::WizardStep;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    #[error("Terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Failures talking to the onboarding persistence backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Request to {endpoint} failed: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("Request to {endpoint} timed out after {timeout:?}")]
    Timeout { endpoint: String, timeout: Duration },

    #[error("Request to {endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Backend rejected {endpoint}: {message}")]
    Rejected { endpoint: String, message: String },

    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Misuse of the wizard state machine.
///
/// None of these are reachable through a well-behaved front-end; they exist
/// so that a misbehaving one gets a clear answer instead of a silent jump.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("Not signed in")]
    Unauthenticated,

    #[error("Step {0} does not exist")]
    NoSuchStep(u8),

    #[error("Cannot navigate from step {from} to step {to}")]
    InvalidTransition { from: u8, to: u8 },

    #[error("Submitted data for {submitted} while {active} is active")]
    StepMismatch {
        active: WizardStep,
        submitted: WizardStep,
    },

    #[error("{0} is missing a required selection")]
    IncompleteStep(WizardStep),

    #[error("Receipt for {receipt} is stale, {active} is active")]
    StaleReceipt {
        receipt: WizardStep,
        active: WizardStep,
    },

    #[error("Onboarding is already completed")]
    AlreadyCompleted,
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
