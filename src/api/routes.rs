//! REST API routes configuration

use crate::api::handlers::{self, ApiState};
use axum::{
    body::Body,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};

/// Unknown routes answer with a JSON 404
async fn fallback_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "application/json")],
        Body::from(r#"{"error":"Not Found"}"#),
    )
        .into_response()
}

/// Create the API router with all routes
pub fn create_router(state: ApiState) -> Router {
    // Configure CORS for browser access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        // Tokens
        .route("/api/tokens", get(handlers::list_tokens))
        .route("/api/tokens/{denom}", get(handlers::get_token))
        // Fees and params
        .route("/api/fees/{symbol}", get(handlers::get_fees))
        .route("/api/params", get(handlers::get_params))
        // Ledger
        .route("/api/balances/{address}", get(handlers::get_balances))
        .fallback(fallback_handler)
        .with_state(state)
        .layer(cors)
}
