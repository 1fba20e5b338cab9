//! Stub onboarding backend serving the step endpoints from memory.
//!
//! Stands in for the real persistence service during local development and
//! integration tests. Progress is kept per bearer token and lost on restart.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Serialize;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tracing::{debug, info};

use super::state::WizardStep;
use super::steps::{
    AddressBody, BusinessAimsBody, CompanyInfoBody, CompletionResponse, IndustryBody, PosUsageBody,
};

/// What the stub has stored for one user.
#[derive(Debug, Clone, Default)]
pub struct StubProgress {
    pub steps: BTreeMap<WizardStep, serde_json::Value>,
    pub completed: bool,
}

/// Shared state for the stub routes.
#[derive(Clone)]
pub struct StubBackendState {
    pub progress: Arc<RwLock<HashMap<String, StubProgress>>>,
    /// Returned as `redirectUrl` from the finalize call.
    pub dashboard_url: String,
}

impl StubBackendState {
    pub fn new(dashboard_url: impl Into<String>) -> Self {
        Self {
            progress: Arc::new(RwLock::new(HashMap::new())),
            dashboard_url: dashboard_url.into(),
        }
    }

    /// Stored progress for a token, if any.
    pub async fn progress_for(&self, token: &str) -> Option<StubProgress> {
        self.progress.read().await.get(token).cloned()
    }
}

/// Bearer token of the caller, set by [`require_bearer`].
#[derive(Debug, Clone)]
struct UserToken(String);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Ack {
    success: bool,
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgressView {
    steps_saved: Vec<WizardStep>,
    completed: bool,
}

/// Build the stub backend router.
pub fn onboarding_routes(state: StubBackendState) -> Router {
    let protected = Router::new()
        .route("/onboarding/step1", post(save_company_info))
        .route("/onboarding/step2", post(save_industry))
        .route("/onboarding/step3", post(save_address))
        .route("/onboarding/step4", post(save_pos_usage))
        .route("/onboarding/step5", post(save_business_aims))
        .route("/onboarding/complete", post(complete))
        .route("/onboarding/progress", get(progress))
        .route_layer(middleware::from_fn(require_bearer));

    Router::new()
        .route("/health", get(health))
        .merge(protected)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "biz365-onboarding-stub"
    }))
}

// ── Auth ────────────────────────────────────────────────────────────────

async fn require_bearer(mut req: Request, next: Next) -> Response {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from);

    match token {
        Some(token) => {
            req.extensions_mut().insert(UserToken(token));
            next.run(req).await
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(Ack {
                success: false,
                message: "Authentication required".to_string(),
            }),
        )
            .into_response(),
    }
}

// ── Steps ───────────────────────────────────────────────────────────────

async fn record<T: Serialize>(
    state: &StubBackendState,
    token: &UserToken,
    step: WizardStep,
    body: &T,
) -> Response {
    let value = match serde_json::to_value(body) {
        Ok(v) => v,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(Ack {
                    success: false,
                    message: e.to_string(),
                }),
            )
                .into_response();
        }
    };

    let mut progress = state.progress.write().await;
    let entry = progress.entry(token.0.clone()).or_default();
    entry.steps.insert(step, value);
    debug!(step = step.number(), saved = entry.steps.len(), "Stub stored onboarding step");

    Json(Ack {
        success: true,
        message: format!("Step {} saved", step.number()),
    })
    .into_response()
}

async fn save_company_info(
    State(state): State<StubBackendState>,
    Extension(token): Extension<UserToken>,
    Json(body): Json<CompanyInfoBody>,
) -> Response {
    record(&state, &token, WizardStep::CompanyInfo, &body).await
}

async fn save_industry(
    State(state): State<StubBackendState>,
    Extension(token): Extension<UserToken>,
    Json(body): Json<IndustryBody>,
) -> Response {
    record(&state, &token, WizardStep::Industry, &body).await
}

async fn save_address(
    State(state): State<StubBackendState>,
    Extension(token): Extension<UserToken>,
    Json(body): Json<AddressBody>,
) -> Response {
    record(&state, &token, WizardStep::Address, &body).await
}

async fn save_pos_usage(
    State(state): State<StubBackendState>,
    Extension(token): Extension<UserToken>,
    Json(body): Json<PosUsageBody>,
) -> Response {
    record(&state, &token, WizardStep::PosUsage, &body).await
}

async fn save_business_aims(
    State(state): State<StubBackendState>,
    Extension(token): Extension<UserToken>,
    Json(body): Json<BusinessAimsBody>,
) -> Response {
    record(&state, &token, WizardStep::BusinessAims, &body).await
}

// ── Finalize / progress ─────────────────────────────────────────────────

async fn complete(
    State(state): State<StubBackendState>,
    Extension(token): Extension<UserToken>,
) -> Response {
    let mut progress = state.progress.write().await;
    let entry = progress.entry(token.0).or_default();

    let missing: Vec<u8> = WizardStep::ALL
        .iter()
        .filter(|s| !entry.steps.contains_key(s))
        .map(|s| s.number())
        .collect();
    if !missing.is_empty() {
        return (
            StatusCode::CONFLICT,
            Json(CompletionResponse {
                success: false,
                message: Some(format!("Steps not saved yet: {missing:?}")),
                redirect_url: None,
            }),
        )
            .into_response();
    }

    entry.completed = true;
    info!("Stub marked onboarding complete");

    Json(CompletionResponse {
        success: true,
        message: Some("Onboarding completed".to_string()),
        redirect_url: Some(state.dashboard_url.clone()),
    })
    .into_response()
}

async fn progress(
    State(state): State<StubBackendState>,
    Extension(token): Extension<UserToken>,
) -> impl IntoResponse {
    let view = match state.progress.read().await.get(&token.0) {
        Some(p) => ProgressView {
            steps_saved: p.steps.keys().copied().collect(),
            completed: p.completed,
        },
        None => ProgressView {
            steps_saved: Vec::new(),
            completed: false,
        },
    };
    Json(view)
}
