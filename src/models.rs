use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use sqlx::FromRow;

use crate::pagination::Identified;
use crate::scoring::Bucket;

/// Employment status of an employee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "employee_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    Active,
    Inactive,
}

impl EmployeeStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl std::str::FromStr for EmployeeStatus {
    type Err = crate::WellbeingError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(crate::WellbeingError::Custom(format!(
                "Unknown employee status: {other}"
            ))),
        }
    }
}

/// Employee record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub department: Option<String>,
    pub role: Option<String>,
    pub status: EmployeeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identified for Employee {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }
}

/// Create employee request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEmployee {
    pub name: String,
    pub email: String,
    pub department: Option<String>,
    pub role: Option<String>,
}

/// A scored mood check-in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CheckIn {
    pub id: i64,
    pub employee_id: i64,
    pub content: String,
    pub score: f64,
    pub created_at: DateTime<Utc>,
}

/// Record check-in request; the score comes from the external scoring model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCheckIn {
    pub employee_id: i64,
    #[serde(default)]
    pub content: String,
    pub score: f64,
}

/// One element of an employee's score history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, FromRow)]
pub struct HistoryEntry {
    pub score: f64,
    pub created_at: DateTime<Utc>,
}

/// An employee with recent scores, most recent first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeHistory {
    pub employee_id: i64,
    pub name: String,
    pub department: Option<String>,
    pub scores: Vec<f64>,
}

impl EmployeeHistory {
    #[must_use]
    pub fn latest_score(&self) -> Option<f64> {
        self.scores.first().copied()
    }
}

/// Employee list filters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeListFilter {
    pub department: Option<String>,
    pub role: Option<String>,
    /// Case-insensitive match against name or email
    pub keyword: Option<String>,
    pub status: Option<EmployeeStatus>,
}

impl EmployeeListFilter {
    /// Stable cache key fragment describing this filter.
    ///
    /// Values are percent-escaped so they cannot inject glob metacharacters or separators.
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!(
            "d={}|r={}|k={}|s={}",
            key_part(self.department.as_deref()),
            key_part(self.role.as_deref()),
            key_part(self.keyword.as_deref().map(str::to_lowercase).as_deref()),
            key_part(self.status.map(EmployeeStatus::as_str)),
        )
    }

    /// Append this filter's predicates to a query that already has a `WHERE` clause.
    pub fn push_predicates(&self, qb: &mut sqlx::QueryBuilder<'_, sqlx::Postgres>) {
        if let Some(department) = &self.department {
            qb.push(" AND department = ").push_bind(department.clone());
        }
        if let Some(role) = &self.role {
            qb.push(" AND role = ").push_bind(role.clone());
        }
        if let Some(keyword) = self.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            let like = format!("%{}%", escape_like(keyword));
            qb.push(" AND (name ILIKE ")
                .push_bind(like.clone())
                .push(" OR email ILIKE ")
                .push_bind(like)
                .push(")");
        }
        if let Some(status) = self.status {
            qb.push(" AND status = ").push_bind(status);
        }
    }
}

fn key_part(value: Option<&str>) -> String {
    match value {
        None => "-".to_string(),
        Some(v) => {
            let mut out = String::with_capacity(v.len());
            for c in v.chars() {
                if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ' ') {
                    out.push(c);
                } else {
                    let mut buf = [0u8; 4];
                    for b in c.encode_utf8(&mut buf).bytes() {
                        out.push_str(&format!("%{b:02X}"));
                    }
                }
            }
            out
        }
    }
}

/// Escape `%`, `_` and `\` for a LIKE pattern
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Employee summary returned by list endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct EmployeeSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub department: Option<String>,
    pub role: Option<String>,
    pub status: EmployeeStatus,
    pub latest_score: Option<f64>,
    pub latest_check_in_at: Option<DateTime<Utc>>,
}

impl Identified for EmployeeSummary {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }
}

/// Employee summary with the bucket of its latest score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedEmployee {
    #[serde(flatten)]
    pub employee: EmployeeSummary,
    pub bucket: Option<Bucket>,
}

/// Streak and reputation for one employee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReputationReport {
    pub employee_id: i64,
    pub latest_score: Option<f64>,
    pub bucket: Option<Bucket>,
    pub streak: u32,
    pub points: i64,
}

/// Leaderboard row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub employee_id: i64,
    pub name: String,
    pub department: Option<String>,
    pub latest_score: f64,
    pub bucket: Bucket,
    pub streak: u32,
    pub points: i64,
}

/// Count and share of one bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketShare {
    pub bucket: Bucket,
    pub count: u64,
    pub percentage: f64,
}

/// Bucket distribution over each employee's latest score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketDistribution {
    pub department: Option<String>,
    pub total: u64,
    pub buckets: Vec<BucketShare>,
}

/// Employee currently in the critical bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct WatchlistEntry {
    pub employee_id: i64,
    pub name: String,
    pub department: Option<String>,
    pub latest_score: f64,
    pub latest_check_in_at: DateTime<Utc>,
}

impl Identified for WatchlistEntry {
    type Id = i64;

    fn id(&self) -> i64 {
        self.employee_id
    }
}
