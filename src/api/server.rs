//! HTTP server implementation

use std::sync::Arc;

use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::handlers::AppState;
use crate::api::routes;
use crate::cache::store_from_config;
use crate::cache::CacheAside;
use crate::config::AppConfig;
use crate::database::Database;
use crate::repository::WellbeingRepository;
use crate::service::WellbeingService;
use crate::Result;

/// Assemble the full application router around a service
pub fn build_router<R: WellbeingRepository + 'static>(
    service: Arc<WellbeingService<R>>,
    enable_cors: bool,
    max_concurrent_requests: usize,
) -> Router {
    let state = AppState { service };

    let mut app = Router::new()
        .nest("/api", routes::api_routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(ConcurrencyLimitLayer::new(max_concurrent_requests.max(1)));

    if enable_cors {
        info!("✅ CORS enabled");
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Start the API server
pub async fn serve_api(config: &AppConfig, host: String, port: u16, enable_cors: bool) -> Result<()> {
    info!("🚀 Starting wellbeing API server...");

    let database = Arc::new(Database::from_config(config).await?);
    database.verify_schema_or_error().await?;
    let cache = CacheAside::new(store_from_config(&config.redis)?);
    let service = Arc::new(WellbeingService::new(database, cache, config.clone()));

    let app = build_router(service, enable_cors, config.api.max_concurrent_requests);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 API server listening on http://{}", addr);
    info!("Available endpoints:");
    info!("  GET    /api/health                    - Health check");
    info!("  POST   /api/classify                  - Classify a score");
    info!("  GET    /api/employees                 - List employees (cursor pages)");
    info!("  GET    /api/employees/:id/reputation  - Streak and reputation");
    info!("  POST   /api/check-ins                 - Record a scored check-in");
    info!("  GET    /api/leaderboard               - Reputation leaderboard");
    info!("  GET    /api/distribution              - Bucket distribution");
    info!("  GET    /api/watchlist                 - Critical employees");
    info!("  GET    /api/cache/stats               - Cache statistics");
    info!("  DELETE /api/cache?pattern=            - Evict cache entries");

    axum::serve(listener, app).await?;

    Ok(())
}
