//! Service entrypoint

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use frontdesk_config::ConfigStore;
use frontdesk_server::{load_settings, router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = load_settings().context("loading settings")?;
    let bind_address = settings.bind_address();
    tracing::info!(
        config_dir = %settings.config_dir,
        turn_deadline_ms = settings.turn_deadline_ms,
        "Starting dialog orchestrator"
    );

    let state = AppState::new(settings).context("wiring application state")?;

    // Warm and validate every known company bundle up front so
    // misconfiguration shows in the startup log, not on the first call
    for company_id in state.config_store.known_companies() {
        if let Err(e) = state.config_store.load(&company_id).await {
            tracing::error!(company_id = %company_id, error = %e, "Company bundle failed validation");
        }
    }

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("binding {bind_address}"))?;
    tracing::info!(address = %bind_address, "Listening");

    axum::serve(listener, router(state))
        .await
        .context("serving")?;

    Ok(())
}
