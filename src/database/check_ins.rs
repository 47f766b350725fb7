use futures::TryStreamExt;
use sqlx::QueryBuilder;

use super::Database;
use crate::models::CheckIn;
use crate::models::EmployeeHistory;
use crate::models::HistoryEntry;
use crate::models::NewCheckIn;
use crate::models::WatchlistEntry;
use crate::Result;

fn to_limit(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

impl Database {
    /// Store a scored check-in
    pub async fn create_check_in(&self, check_in: &NewCheckIn) -> Result<CheckIn> {
        let created = sqlx::query_as::<_, CheckIn>(
            r"
            INSERT INTO check_ins (employee_id, content, score)
            VALUES ($1, $2, $3)
            RETURNING id, employee_id, content, score, created_at
            ",
        )
        .bind(check_in.employee_id)
        .bind(&check_in.content)
        .bind(check_in.score)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Most recent check-ins of one employee, newest first
    pub async fn get_recent_history(
        &self,
        employee_id: i64,
        window: usize,
    ) -> Result<Vec<HistoryEntry>> {
        let history = sqlx::query_as::<_, HistoryEntry>(
            r"
            SELECT score, created_at
            FROM check_ins
            WHERE employee_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            ",
        )
        .bind(employee_id)
        .bind(to_limit(window))
        .fetch_all(&self.pool)
        .await?;

        Ok(history)
    }

    /// Per-employee windows of recent scores for active employees
    pub async fn get_employee_histories(
        &self,
        department: Option<&str>,
        window: usize,
    ) -> Result<Vec<EmployeeHistory>> {
        let mut qb = QueryBuilder::new(
            r"
            SELECT e.id, e.name, e.department, r.score
            FROM employees e
            JOIN LATERAL (
                SELECT c.id, c.score, c.created_at
                FROM check_ins c
                WHERE c.employee_id = e.id
                ORDER BY c.created_at DESC, c.id DESC
                LIMIT ",
        );
        qb.push_bind(to_limit(window));
        qb.push(") r ON TRUE WHERE e.status = 'active'");
        if let Some(department) = department {
            qb.push(" AND e.department = ").push_bind(department.to_string());
        }
        qb.push(" ORDER BY e.id ASC, r.created_at DESC, r.id DESC");

        let mut rows = qb
            .build_query_as::<(i64, String, Option<String>, f64)>()
            .fetch(&self.pool);

        let mut histories: Vec<EmployeeHistory> = Vec::new();
        while let Some((id, name, dept, score)) = rows.try_next().await? {
            match histories.last_mut() {
                Some(current) if current.employee_id == id => current.scores.push(score),
                _ => histories.push(EmployeeHistory {
                    employee_id: id,
                    name,
                    department: dept,
                    scores: vec![score],
                }),
            }
        }

        Ok(histories)
    }

    /// Active employees whose latest score is at or below `critical_max`.
    ///
    /// Ordered by latest check-in time descending with the employee id as a
    /// unique tiebreaker; the id cursor is resolved to its `(time, id)` key.
    pub async fn list_watchlist(
        &self,
        critical_max: f64,
        take: usize,
        after_id: Option<i64>,
    ) -> Result<Vec<WatchlistEntry>> {
        let mut qb = QueryBuilder::new(
            r"
            WITH latest AS (
                SELECT DISTINCT ON (c.employee_id) c.employee_id, c.score, c.created_at
                FROM check_ins c
                ORDER BY c.employee_id, c.created_at DESC, c.id DESC
            )
            SELECT e.id AS employee_id, e.name, e.department,
                   l.score AS latest_score, l.created_at AS latest_check_in_at
            FROM employees e
            JOIN latest l ON l.employee_id = e.id
            WHERE e.status = 'active' AND l.score <= ",
        );
        qb.push_bind(critical_max);
        if let Some(after) = after_id {
            qb.push(
                " AND (l.created_at, e.id) < (SELECT created_at, employee_id FROM latest WHERE employee_id = ",
            )
            .push_bind(after)
            .push(")");
        }
        qb.push(" ORDER BY l.created_at DESC, e.id DESC LIMIT ")
            .push_bind(to_limit(take));

        let rows = qb
            .build_query_as::<WatchlistEntry>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }
}
