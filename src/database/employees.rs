use sqlx::QueryBuilder;

use super::Database;
use crate::models::Employee;
use crate::models::EmployeeListFilter;
use crate::models::EmployeeSummary;
use crate::models::NewEmployee;
use crate::Result;

impl Database {
    /// Create an employee
    pub async fn insert_employee(&self, employee: &NewEmployee) -> Result<Employee> {
        let created = sqlx::query_as::<_, Employee>(
            r"
            INSERT INTO employees (name, email, department, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, department, role, status, created_at, updated_at
            ",
        )
        .bind(&employee.name)
        .bind(&employee.email)
        .bind(&employee.department)
        .bind(&employee.role)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Get employee by id
    pub async fn get_employee(&self, id: i64) -> Result<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(
            "SELECT id, name, email, department, role, status, created_at, updated_at FROM employees WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    /// One id-ordered slice of the filtered employee list, with each employee's latest score
    pub async fn list_employee_summaries(
        &self,
        filter: &EmployeeListFilter,
        take: usize,
        after_id: Option<i64>,
    ) -> Result<Vec<EmployeeSummary>> {
        let mut qb = QueryBuilder::new(
            r"
            SELECT e.id, e.name, e.email, e.department, e.role, e.status,
                   l.score AS latest_score, l.created_at AS latest_check_in_at
            FROM employees e
            LEFT JOIN LATERAL (
                SELECT c.score, c.created_at
                FROM check_ins c
                WHERE c.employee_id = e.id
                ORDER BY c.created_at DESC, c.id DESC
                LIMIT 1
            ) l ON TRUE
            WHERE TRUE",
        );
        if let Some(after) = after_id {
            qb.push(" AND e.id > ").push_bind(after);
        }
        filter.push_predicates(&mut qb);
        qb.push(" ORDER BY e.id ASC LIMIT ")
            .push_bind(i64::try_from(take).unwrap_or(i64::MAX));

        let rows = qb
            .build_query_as::<EmployeeSummary>()
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(
            "Fetched {} employees (take={}, after={:?})",
            rows.len(),
            take,
            after_id
        );
        Ok(rows)
    }
}
