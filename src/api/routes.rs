//! API route definitions

use axum::routing::delete;
use axum::routing::get;
use axum::routing::post;
use axum::Router;

use super::handlers;
use super::handlers::AppState;
use crate::repository::WellbeingRepository;

/// Create RESTful API router
pub fn api_routes<R: WellbeingRepository + 'static>(state: AppState<R>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Scoring
        .route("/classify", post(handlers::classify::<R>))
        // Employees
        .route("/employees", get(handlers::list_employees::<R>))
        .route(
            "/employees/:id/reputation",
            get(handlers::employee_reputation::<R>),
        )
        .route("/check-ins", post(handlers::create_check_in::<R>))
        // Aggregates
        .route("/leaderboard", get(handlers::leaderboard::<R>))
        .route("/distribution", get(handlers::distribution::<R>))
        .route("/watchlist", get(handlers::watchlist::<R>))
        // Cache maintenance
        .route("/cache/stats", get(handlers::cache_stats::<R>))
        .route("/cache", delete(handlers::invalidate_cache::<R>))
        .with_state(state)
}
