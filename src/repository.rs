//! Storage seam for the aggregation service
//!
//! [`crate::database::Database`] implements this over Postgres; tests use
//! in-memory implementations.

use async_trait::async_trait;

use crate::models::CheckIn;
use crate::models::Employee;
use crate::models::EmployeeHistory;
use crate::models::EmployeeListFilter;
use crate::models::EmployeeSummary;
use crate::models::HistoryEntry;
use crate::models::NewCheckIn;
use crate::models::NewEmployee;
use crate::models::WatchlistEntry;
use crate::Result;

#[async_trait]
pub trait WellbeingRepository: Send + Sync {
    /// Employees matching `filter` with `id > after_id`, ascending by id, at most `take` rows.
    async fn fetch_employees(
        &self,
        filter: &EmployeeListFilter,
        take: usize,
        after_id: Option<i64>,
    ) -> Result<Vec<EmployeeSummary>>;

    /// Whether an employee with this id exists
    async fn employee_exists(&self, employee_id: i64) -> Result<bool>;

    /// Up to `window` most recent check-ins of one employee, most recent first.
    async fn recent_history(&self, employee_id: i64, window: usize) -> Result<Vec<HistoryEntry>>;

    /// Recent score windows for every active employee with at least one check-in,
    /// optionally restricted to a department. Scores are most recent first.
    async fn employee_histories(
        &self,
        department: Option<&str>,
        window: usize,
    ) -> Result<Vec<EmployeeHistory>>;

    /// Employees whose latest score is at or below `critical_max`, ordered by
    /// latest check-in time descending then employee id descending, strictly
    /// after the row for `after_id` in that order.
    async fn fetch_watchlist(
        &self,
        critical_max: f64,
        take: usize,
        after_id: Option<i64>,
    ) -> Result<Vec<WatchlistEntry>>;

    /// Persist a new employee.
    async fn insert_employee(&self, employee: &NewEmployee) -> Result<Employee>;

    /// Persist a check-in whose score has already been validated.
    async fn insert_check_in(&self, check_in: &NewCheckIn) -> Result<CheckIn>;
}
