//! Authenticated session consulted to gate wizard access.

use secrecy::{ExposeSecret, SecretString};

use crate::error::WizardError;

/// The signed-in user, as supplied by the auth layer.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user_id: String,
    pub email: String,
    token: SecretString,
}

impl AuthSession {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>, token: SecretString) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            token,
        }
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token.expose_secret())
    }
}

/// Protected-route check: the wizard is only reachable when signed in.
pub fn require_session(session: Option<AuthSession>) -> Result<AuthSession, WizardError> {
    match session {
        Some(s) if !s.token.expose_secret().trim().is_empty() => Ok(s),
        _ => Err(WizardError::Unauthenticated),
    }
}
