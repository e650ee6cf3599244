//! Application setup and server configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Extension, Request},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method, StatusCode,
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::routes::{
    create_submission_handler, health_handler, list_members_handler, list_registrations_handler,
    list_submissions_handler, register_event_handler, register_member_handler,
    review_submissions_handler, sanity_webhook_handler, track_submission_handler,
    update_status_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
}

/// Answer every OPTIONS request with an empty 200, whatever the route.
async fn preflight(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    next.run(request).await
}

/// Build the Axum application router
pub fn build_app(deps: Arc<ServerDeps>, request_timeout: Duration) -> Router {
    let app_state = AppState { deps };

    // Public API: any origin may call it
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    Router::new()
        // Submissions
        .route(
            "/submissions",
            post(create_submission_handler).get(list_submissions_handler),
        )
        .route("/submissions/review", get(review_submissions_handler))
        .route("/submissions/status", put(update_status_handler))
        .route("/submissions/track/:code", get(track_submission_handler))
        // Record store change notifications
        .route("/webhooks/sanity", post(sanity_webhook_handler))
        // Community
        .route(
            "/members",
            post(register_member_handler).get(list_members_handler),
        )
        .route(
            "/event-registrations",
            post(register_event_handler).get(list_registrations_handler),
        )
        // Health check
        .route("/health", get(health_handler))
        .layer(middleware::from_fn(preflight))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
