// Main entry point for API server

use std::sync::Arc;

use anyhow::{Context, Result};
use server_core::{kernel::ServerDeps, server::build_app, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Design Gallery API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        dataset = %config.sanity_dataset,
        chat = config.discord_webhook_submissions.is_some(),
        rebuild_hook = config.build_hook_url.is_some(),
        review_auth = config.review_api_token.is_some(),
        "Configuration loaded"
    );
    if config.review_api_token.is_none() {
        tracing::warn!("REVIEW_API_TOKEN not set; moderation endpoints will reject every request");
    }

    // Build integrations and application
    let deps = ServerDeps::from_config(&config).context("Failed to build integrations")?;
    let app = build_app(Arc::new(deps), config.request_timeout);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
