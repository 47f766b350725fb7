//! API request handlers

use std::sync::Arc;

use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::api::types::*;
use crate::cache::CacheStats;
use crate::models::BucketDistribution;
use crate::models::ClassifiedEmployee;
use crate::models::LeaderboardEntry;
use crate::models::NewCheckIn;
use crate::models::ReputationReport;
use crate::models::WatchlistEntry;
use crate::pagination::Page;
use crate::repository::WellbeingRepository;
use crate::service::WellbeingService;
use crate::WellbeingError;

/// Shared application state
pub struct AppState<R: WellbeingRepository> {
    pub service: Arc<WellbeingService<R>>,
}

impl<R: WellbeingRepository> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
        }
    }
}

type ApiError = (StatusCode, Json<ApiResponse<()>>);
type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Map a service error to a status code and error envelope
fn api_error(e: &WellbeingError) -> ApiError {
    let status = match e {
        WellbeingError::EmployeeNotFound(_) => StatusCode::NOT_FOUND,
        e if e.is_client_error() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!("Request failed: {}", e);
        (status, Json(ApiResponse::error("internal server error")))
    } else {
        warn!("Rejected request: {}", e);
        (status, Json(ApiResponse::error(e.to_string())))
    }
}

/// Health check handler
pub async fn health() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// Classify a raw score
pub async fn classify<R: WellbeingRepository + 'static>(
    State(state): State<AppState<R>>,
    Json(req): Json<ClassifyRequest>,
) -> ApiResult<ClassifyResponse> {
    let bucket = state
        .service
        .classify_score(req.score)
        .map_err(|e| api_error(&e))?;
    Ok(Json(ApiResponse::success(ClassifyResponse {
        score: req.score,
        bucket,
    })))
}

/// List employees, one cursor page at a time
pub async fn list_employees<R: WellbeingRepository + 'static>(
    State(state): State<AppState<R>>,
    Query(params): Query<EmployeeListQuery>,
) -> ApiResult<Page<ClassifiedEmployee, i64>> {
    info!(
        "GET /api/employees limit={:?} after={:?}",
        params.limit, params.after
    );
    let page = state
        .service
        .list_employees(&params.filter(), params.limit, params.after)
        .await
        .map_err(|e| api_error(&e))?;
    Ok(Json(ApiResponse::success(page)))
}

/// Streak and reputation of one employee
pub async fn employee_reputation<R: WellbeingRepository + 'static>(
    State(state): State<AppState<R>>,
    Path(id): Path<i64>,
) -> ApiResult<ReputationReport> {
    info!("GET /api/employees/{}/reputation", id);
    let report = state
        .service
        .employee_reputation(id)
        .await
        .map_err(|e| api_error(&e))?;
    Ok(Json(ApiResponse::success(report)))
}

/// Record a scored check-in
pub async fn create_check_in<R: WellbeingRepository + 'static>(
    State(state): State<AppState<R>>,
    Json(req): Json<NewCheckIn>,
) -> Result<(StatusCode, Json<ApiResponse<CheckInResponse>>), ApiError> {
    info!("POST /api/check-ins employee={}", req.employee_id);
    let (stored, bucket) = state
        .service
        .record_check_in(req)
        .await
        .map_err(|e| api_error(&e))?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CheckInResponse {
            id: stored.id,
            employee_id: stored.employee_id,
            score: stored.score,
            bucket,
        })),
    ))
}

/// Reputation leaderboard
pub async fn leaderboard<R: WellbeingRepository + 'static>(
    State(state): State<AppState<R>>,
    Query(params): Query<LeaderboardQuery>,
) -> ApiResult<Vec<LeaderboardEntry>> {
    let entries = state
        .service
        .leaderboard(params.department().as_deref(), params.limit)
        .await
        .map_err(|e| api_error(&e))?;
    Ok(Json(ApiResponse::success(entries)))
}

/// Bucket distribution
pub async fn distribution<R: WellbeingRepository + 'static>(
    State(state): State<AppState<R>>,
    Query(params): Query<DistributionQuery>,
) -> ApiResult<BucketDistribution> {
    let dist = state
        .service
        .distribution(params.department().as_deref())
        .await
        .map_err(|e| api_error(&e))?;
    Ok(Json(ApiResponse::success(dist)))
}

/// Critical employees
pub async fn watchlist<R: WellbeingRepository + 'static>(
    State(state): State<AppState<R>>,
    Query(params): Query<WatchlistQuery>,
) -> ApiResult<Page<WatchlistEntry, i64>> {
    let page = state
        .service
        .watchlist(params.limit, params.after)
        .await
        .map_err(|e| api_error(&e))?;
    Ok(Json(ApiResponse::success(page)))
}

/// Cache statistics
pub async fn cache_stats<R: WellbeingRepository + 'static>(
    State(state): State<AppState<R>>,
) -> Json<ApiResponse<CacheStats>> {
    Json(ApiResponse::success(state.service.cache().stats().await))
}

/// Evict cache entries matching a glob pattern
pub async fn invalidate_cache<R: WellbeingRepository + 'static>(
    State(state): State<AppState<R>>,
    Query(params): Query<InvalidateQuery>,
) -> Json<ApiResponse<InvalidateResponse>> {
    info!("DELETE /api/cache pattern={}", params.pattern);
    let removed = state.service.cache().invalidate(&params.pattern).await;
    Json(ApiResponse::success(InvalidateResponse {
        pattern: params.pattern,
        removed,
    }))
}
