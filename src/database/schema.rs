use super::Database;
use crate::Result;
use crate::WellbeingError;

impl Database {
    /// Check if database schema is initialized
    /// Returns true if all required tables exist
    pub async fn is_schema_initialized(&self) -> Result<bool> {
        for table_name in ["employees", "check_ins"] {
            let exists = sqlx::query_scalar::<_, bool>(
                r"
                SELECT EXISTS (
                    SELECT FROM information_schema.tables
                    WHERE table_schema = 'public'
                    AND table_name = $1
                )
                ",
            )
            .bind(table_name)
            .fetch_one(&self.pool)
            .await?;

            if !exists {
                tracing::debug!("Missing required table: {}", table_name);
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Verify database schema or return helpful error
    pub async fn verify_schema_or_error(&self) -> Result<()> {
        if !self.is_schema_initialized().await? {
            return Err(WellbeingError::Custom(
                "Database schema not initialized! Run `wellbeing init` first.".to_string(),
            ));
        }
        Ok(())
    }

    /// Initialize database schema
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r"
            DO $$ BEGIN
                CREATE TYPE employee_status AS ENUM ('active', 'inactive');
            EXCEPTION
                WHEN duplicate_object THEN NULL;
            END $$
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS employees (
                id BIGSERIAL PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                email VARCHAR(255) UNIQUE NOT NULL,
                department VARCHAR(255),
                role VARCHAR(255),
                status employee_status NOT NULL DEFAULT 'active',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS check_ins (
                id BIGSERIAL PRIMARY KEY,
                employee_id BIGINT NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
                content TEXT NOT NULL DEFAULT '',
                score DOUBLE PRECISION NOT NULL CHECK (score >= -1.0 AND score <= 1.0),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        let indexes = [
            "CREATE INDEX IF NOT EXISTS idx_check_ins_employee_recent ON check_ins(employee_id, created_at DESC, id DESC)",
            "CREATE INDEX IF NOT EXISTS idx_employees_department ON employees(department)",
            "CREATE INDEX IF NOT EXISTS idx_employees_status ON employees(status)",
        ];
        for ddl in indexes {
            sqlx::query(ddl).execute(&self.pool).await?;
        }

        tracing::info!("Database schema initialized");
        Ok(())
    }
}
