//! Persistence backend for wizard steps.
//!
//! [`HttpBackend`] talks to the real REST endpoints. [`MockBackend`] is an
//! in-process stand-in with simulated latency, used for demos and tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::BackendError;

use super::session::AuthSession;
use super::state::WizardStep;
use super::steps::{COMPLETE_ENDPOINT, CompletionResponse, StepBody, spec};

/// Longest response body kept in an error message.
const MAX_ERROR_BODY: usize = 200;

/// Where onboarding data is persisted.
#[async_trait]
pub trait OnboardingBackend: Send + Sync {
    /// Persist one step. Any `Err` is a failed save.
    async fn save_step(&self, step: WizardStep, body: &StepBody) -> Result<(), BackendError>;

    /// Finalize onboarding after step 5 is saved.
    async fn complete(&self) -> Result<CompletionResponse, BackendError>;
}

// ── HTTP ────────────────────────────────────────────────────────────────

/// REST client for the onboarding endpoints.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    session: AuthSession,
    timeout: Duration,
}

impl HttpBackend {
    pub fn new(
        base_url: impl Into<String>,
        session: AuthSession,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Transport {
                endpoint: base_url.clone(),
                reason: format!("Failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            base_url,
            session,
            timeout,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }

    async fn post(
        &self,
        endpoint: &str,
        body: Option<&StepBody>,
    ) -> Result<reqwest::Response, BackendError> {
        let mut request = self
            .client
            .post(self.url(endpoint))
            .header(reqwest::header::AUTHORIZATION, self.session.bearer());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout {
                    endpoint: endpoint.to_string(),
                    timeout: self.timeout,
                }
            } else {
                BackendError::Transport {
                    endpoint: endpoint.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl OnboardingBackend for HttpBackend {
    async fn save_step(&self, step: WizardStep, body: &StepBody) -> Result<(), BackendError> {
        let endpoint = spec(step).endpoint;
        let response = self.post(endpoint, Some(body)).await?;

        // Some deployments answer 200 with `{"success": false, "message": ...}`.
        let text = response.text().await.map_err(|e| BackendError::Transport {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&text) {
            if value.get("success").and_then(|v| v.as_bool()) == Some(false) {
                let message = value
                    .get("message")
                    .and_then(|v| v.as_str())
                    .unwrap_or("request was not accepted")
                    .to_string();
                return Err(BackendError::Rejected {
                    endpoint: endpoint.to_string(),
                    message,
                });
            }
        }

        debug!(step = step.number(), endpoint, "Step persisted");
        Ok(())
    }

    async fn complete(&self) -> Result<CompletionResponse, BackendError> {
        let response = self.post(COMPLETE_ENDPOINT, None).await?;
        let text = response.text().await.map_err(|e| BackendError::Transport {
            endpoint: COMPLETE_ENDPOINT.to_string(),
            reason: e.to_string(),
        })?;
        let parsed: CompletionResponse =
            serde_json::from_str(&text).map_err(|e| BackendError::InvalidResponse {
                endpoint: COMPLETE_ENDPOINT.to_string(),
                reason: e.to_string(),
            })?;
        if !parsed.success {
            return Err(BackendError::Rejected {
                endpoint: COMPLETE_ENDPOINT.to_string(),
                message: parsed
                    .message
                    .unwrap_or_else(|| "completion was not accepted".to_string()),
            });
        }
        info!(redirect = ?parsed.redirect_url, "Onboarding finalized");
        Ok(parsed)
    }
}

// ── Mock ────────────────────────────────────────────────────────────────

/// Which mock endpoint a call or failure applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockEndpoint {
    Step(WizardStep),
    Complete,
}

/// A call received by [`MockBackend`].
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub endpoint: MockEndpoint,
    pub body: Option<serde_json::Value>,
}

/// Simulated onboarding service.
///
/// Every call waits `latency` and then succeeds, unless a failure was
/// queued for that endpoint with [`fail_next`](Self::fail_next).
#[derive(Debug, Default)]
pub struct MockBackend {
    latency: Duration,
    redirect_url: Option<String>,
    calls: Mutex<Vec<MockCall>>,
    pending_failures: Mutex<HashMap<MockEndpoint, u32>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_redirect(mut self, url: impl Into<String>) -> Self {
        self.redirect_url = Some(url.into());
        self
    }

    /// Make the next `times` calls to `endpoint` fail.
    pub fn fail_next(&self, endpoint: MockEndpoint, times: u32) {
        if let Ok(mut failures) = self.pending_failures.lock() {
            *failures.entry(endpoint).or_insert(0) += times;
        }
    }

    /// Every call received so far, including failed ones.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self, endpoint: MockEndpoint) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.endpoint == endpoint)
            .count()
    }

    async fn handle(
        &self,
        endpoint: MockEndpoint,
        body: Option<serde_json::Value>,
    ) -> Result<(), BackendError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(MockCall { endpoint, body });
        }

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let should_fail = match self.pending_failures.lock() {
            Ok(mut failures) => match failures.get_mut(&endpoint) {
                Some(n) if *n > 0 => {
                    *n -= 1;
                    true
                }
                _ => false,
            },
            Err(_) => false,
        };

        if should_fail {
            let path = match endpoint {
                MockEndpoint::Step(step) => spec(step).endpoint,
                MockEndpoint::Complete => COMPLETE_ENDPOINT,
            };
            return Err(BackendError::Status {
                endpoint: path.to_string(),
                status: 503,
                body: "simulated failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl OnboardingBackend for MockBackend {
    async fn save_step(&self, step: WizardStep, body: &StepBody) -> Result<(), BackendError> {
        let body = serde_json::to_value(body)?;
        self.handle(MockEndpoint::Step(step), Some(body)).await
    }

    async fn complete(&self) -> Result<CompletionResponse, BackendError> {
        self.handle(MockEndpoint::Complete, None).await?;
        Ok(CompletionResponse {
            success: true,
            message: Some("Onboarding completed".to_string()),
            redirect_url: self.redirect_url.clone(),
        })
    }
}
