use async_trait::async_trait;

use super::Database;
use crate::models::CheckIn;
use crate::models::Employee;
use crate::models::EmployeeHistory;
use crate::models::EmployeeListFilter;
use crate::models::EmployeeSummary;
use crate::models::HistoryEntry;
use crate::models::NewCheckIn;
use crate::models::NewEmployee;
use crate::models::WatchlistEntry;
use crate::repository::WellbeingRepository;
use crate::Result;

#[async_trait]
impl WellbeingRepository for Database {
    async fn fetch_employees(
        &self,
        filter: &EmployeeListFilter,
        take: usize,
        after_id: Option<i64>,
    ) -> Result<Vec<EmployeeSummary>> {
        self.list_employee_summaries(filter, take, after_id).await
    }

    async fn employee_exists(&self, employee_id: i64) -> Result<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM employees WHERE id = $1)")
                .bind(employee_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn recent_history(&self, employee_id: i64, window: usize) -> Result<Vec<HistoryEntry>> {
        self.get_recent_history(employee_id, window).await
    }

    async fn employee_histories(
        &self,
        department: Option<&str>,
        window: usize,
    ) -> Result<Vec<EmployeeHistory>> {
        self.get_employee_histories(department, window).await
    }

    async fn fetch_watchlist(
        &self,
        critical_max: f64,
        take: usize,
        after_id: Option<i64>,
    ) -> Result<Vec<WatchlistEntry>> {
        self.list_watchlist(critical_max, take, after_id).await
    }

    async fn insert_employee(&self, employee: &NewEmployee) -> Result<Employee> {
        Database::insert_employee(self, employee).await
    }

    async fn insert_check_in(&self, check_in: &NewCheckIn) -> Result<CheckIn> {
        self.create_check_in(check_in).await
    }
}
