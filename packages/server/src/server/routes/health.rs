use axum::{extract::Extension, Json};
use serde::Serialize;

use crate::kernel::NotificationChannel;
use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    integrations: IntegrationHealth,
}

/// Whether each optional integration is configured
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationHealth {
    chat: bool,
    rebuild_hook: bool,
    review_auth: bool,
}

/// Health check endpoint
///
/// Liveness only: it reports configuration without calling any external system.
pub async fn health_handler(Extension(state): Extension<AppState>) -> Json<HealthResponse> {
    let deps = &state.deps;
    Json(HealthResponse {
        status: "healthy".to_string(),
        integrations: IntegrationHealth {
            chat: deps.notifier.is_configured(NotificationChannel::Submissions),
            rebuild_hook: deps.rebuild.is_configured(),
            review_auth: deps.review_auth.is_configured(),
        },
    })
}
