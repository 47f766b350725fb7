//! API request and response types

use serde::Deserialize;
use serde::Serialize;

use crate::models::EmployeeListFilter;
use crate::models::EmployeeStatus;
use crate::scoring::Bucket;

/// Standard API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Classify request
#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub score: f64,
}

/// Classify response
#[derive(Debug, Serialize, Deserialize)]
pub struct ClassifyResponse {
    pub score: f64,
    pub bucket: Bucket,
}

/// Employee list query parameters
#[derive(Debug, Default, Deserialize)]
pub struct EmployeeListQuery {
    pub department: Option<String>,
    pub role: Option<String>,
    pub keyword: Option<String>,
    pub status: Option<EmployeeStatus>,
    pub limit: Option<usize>,
    pub after: Option<i64>,
}

impl EmployeeListQuery {
    pub fn filter(&self) -> EmployeeListFilter {
        EmployeeListFilter {
            department: non_empty(self.department.as_deref()),
            role: non_empty(self.role.as_deref()),
            keyword: non_empty(self.keyword.as_deref()),
            status: self.status,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Leaderboard query parameters
#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardQuery {
    pub department: Option<String>,
    pub limit: Option<usize>,
}

impl LeaderboardQuery {
    /// Department filter, with blank values meaning all departments
    pub fn department(&self) -> Option<String> {
        non_empty(self.department.as_deref())
    }
}

/// Distribution query parameters
#[derive(Debug, Default, Deserialize)]
pub struct DistributionQuery {
    pub department: Option<String>,
}

impl DistributionQuery {
    /// Department filter, with blank values meaning all departments
    pub fn department(&self) -> Option<String> {
        non_empty(self.department.as_deref())
    }
}

/// Watchlist query parameters
#[derive(Debug, Default, Deserialize)]
pub struct WatchlistQuery {
    pub limit: Option<usize>,
    pub after: Option<i64>,
}

/// Check-in response
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckInResponse {
    pub id: i64,
    pub employee_id: i64,
    pub score: f64,
    pub bucket: Bucket,
}

/// Cache invalidation query parameters
#[derive(Debug, Deserialize)]
pub struct InvalidateQuery {
    pub pattern: String,
}

/// Cache invalidation response
#[derive(Debug, Serialize, Deserialize)]
pub struct InvalidateResponse {
    pub pattern: String,
    pub removed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_query_params_become_none() {
        let query = EmployeeListQuery {
            department: Some("  ".into()),
            keyword: Some(" ann ".into()),
            ..Default::default()
        };
        let filter = query.filter();
        assert_eq!(filter.department, None);
        assert_eq!(filter.keyword.as_deref(), Some("ann"));
    }

    #[test]
    fn test_blank_department_means_all() {
        let leaderboard = LeaderboardQuery {
            department: Some(String::new()),
            limit: None,
        };
        assert_eq!(leaderboard.department(), None);

        let distribution = DistributionQuery {
            department: Some(" ops ".into()),
        };
        assert_eq!(distribution.department().as_deref(), Some("ops"));
    }

    #[test]
    fn test_error_envelope() {
        let resp: ApiResponse<()> = ApiResponse::error("bad score");
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "data": null, "error": "bad score"})
        );
    }
}
