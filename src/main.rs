use std::sync::Arc;

use anyhow::Context;
use secrecy::SecretString;
use tokio::io::BufReader;

use biz365_onboarding::cli::{self, TerminalNavigator, TerminalNotifier};
use biz365_onboarding::config::{BackendKind, OnboardingConfig};
use biz365_onboarding::onboarding::{
    AuthSession, HttpBackend, MockBackend, NavTarget, Navigator, OnboardingBackend,
    OnboardingWizard, StepValidator, StubBackendState, WizardDeps, onboarding_routes,
    require_session,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = OnboardingConfig::from_env().context("Invalid BIZ365_* configuration")?;

    let command = std::env::args().nth(1).unwrap_or_else(|| "wizard".to_string());
    match command.as_str() {
        "serve" => serve(&config).await,
        "wizard" => wizard(&config).await,
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!("Usage: biz365-onboarding [wizard|serve]");
            std::process::exit(2);
        }
    }
}

async fn serve(config: &OnboardingConfig) -> anyhow::Result<()> {
    let app = onboarding_routes(StubBackendState::new(config.dashboard_url.clone()));
    let addr = format!("0.0.0.0:{}", config.stub_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    eprintln!("🧩 Biz365 onboarding stub v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://{addr}/onboarding/step1..5");
    eprintln!("   Health: http://{addr}/health\n");
    tracing::info!(%addr, "Stub onboarding backend listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await
        .context("Stub server failed")?;
    Ok(())
}

async fn wizard(config: &OnboardingConfig) -> anyhow::Result<()> {
    let navigator = Arc::new(TerminalNavigator);

    // The auth layer hands us a token; without one the wizard is off limits.
    let session = std::env::var("BIZ365_TOKEN").ok().map(|token| {
        AuthSession::new(
            std::env::var("BIZ365_USER_ID").unwrap_or_else(|_| "local-user".to_string()),
            std::env::var("BIZ365_EMAIL").unwrap_or_default(),
            SecretString::from(token),
        )
    });
    let session = match require_session(session) {
        Ok(s) => s,
        Err(e) => {
            navigator.navigate(NavTarget::login());
            eprintln!("Error: {e}");
            eprintln!("  export BIZ365_TOKEN=...");
            std::process::exit(1);
        }
    };

    let backend: Arc<dyn OnboardingBackend> = match config.backend {
        BackendKind::Http => Arc::new(
            HttpBackend::new(
                config.api_base_url.clone(),
                session.clone(),
                config.request_timeout,
            )
            .context("Failed to create onboarding HTTP client")?,
        ),
        BackendKind::Mock => Arc::new(MockBackend::new().with_latency(config.advance_delay)),
    };

    let validator = if config.permissive_company_step {
        StepValidator::permissive()
    } else {
        StepValidator::new()
    };

    eprintln!("🚀 Biz365 onboarding v{}", env!("CARGO_PKG_VERSION"));
    match config.backend {
        BackendKind::Http => eprintln!("   Backend: {}", config.api_base_url),
        BackendKind::Mock => eprintln!("   Backend: simulated"),
    }
    eprintln!("   Type 'back' for the previous step, 'quit' to leave.");

    let wizard = OnboardingWizard::start(
        Some(session),
        WizardDeps {
            backend,
            notifier: Arc::new(TerminalNotifier),
            navigator,
            validator,
            pacing: config.pacing(),
            dashboard_url: config.dashboard_url.clone(),
        },
    )?;

    let stdin = BufReader::new(tokio::io::stdin());
    match cli::run(&wizard, stdin).await? {
        Some(redirect) => eprintln!("\nAll set. Continue at {redirect}"),
        None => eprintln!("\nOnboarding not finished. Progress is not kept between runs."),
    }
    Ok(())
}
