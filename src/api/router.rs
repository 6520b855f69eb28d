use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth::require_auth;
use super::handlers;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Public routes — no authentication required
    let public = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render));

    // Protected API routes — require Bearer token when API_TOKEN is set
    let protected = Router::new()
        // Trading
        .route("/api/trades/buy", post(handlers::trading::buy))
        .route("/api/trades/sell", post(handlers::trading::sell))
        // Portfolio
        .route("/api/users/:id/summary", get(handlers::portfolio::summary))
        .route("/api/users/:id/positions", get(handlers::portfolio::positions))
        // Leaderboard
        .route("/api/leaderboard", get(handlers::leaderboard::leaderboard))
        // Assets and prices
        .route("/api/assets", get(handlers::assets::list))
        .route("/api/assets/:symbol/price", get(handlers::assets::latest_price))
        .route(
            "/api/assets/:symbol/prices",
            get(handlers::assets::price_history).post(handlers::assets::record_price),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // CORS: same-origin dashboards plus direct API access with a token
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
