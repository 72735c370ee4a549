use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use crate::database::manager::DatabaseError;
use crate::database::models::{NewOperation, OperationRecord, OperationRow};
use crate::database::repository::OperationRepository;

const COLUMNS: &str = "id, num1, num2, operation, result, created_at, updated_at";

/// `operations` table backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgOperationRepository {
    pool: PgPool,
}

impl PgOperationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OperationRepository for PgOperationRepository {
    #[instrument(skip(self), fields(operation = %op.operation))]
    async fn create(&self, op: NewOperation) -> Result<OperationRecord, DatabaseError> {
        let sql = format!(
            "INSERT INTO operations (num1, num2, operation, result) VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, OperationRow>(&sql)
            .bind(op.num1)
            .bind(op.num2)
            .bind(op.operation.symbol())
            .bind(op.result)
            .fetch_one(&self.pool)
            .await?;

        debug!(id = row.id, "Inserted operation");
        row.try_into()
    }

    async fn list_all(&self) -> Result<Vec<OperationRecord>, DatabaseError> {
        let sql = format!("SELECT {COLUMNS} FROM operations ORDER BY id ASC");
        sqlx::query_as::<_, OperationRow>(&sql)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(OperationRecord::try_from)
            .collect()
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<OperationRecord>, DatabaseError> {
        let sql = format!("SELECT {COLUMNS} FROM operations WHERE id = $1");
        sqlx::query_as::<_, OperationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(OperationRecord::try_from)
            .transpose()
    }

    #[instrument(skip(self), fields(operation = %op.operation))]
    async fn update(
        &self,
        id: i64,
        op: NewOperation,
    ) -> Result<Option<OperationRecord>, DatabaseError> {
        let sql = format!(
            "UPDATE operations SET num1 = $2, num2 = $3, operation = $4, result = $5, updated_at = NOW() \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OperationRow>(&sql)
            .bind(id)
            .bind(op.num1)
            .bind(op.num2)
            .bind(op.operation.symbol())
            .bind(op.result)
            .fetch_optional(&self.pool)
            .await?
            .map(OperationRecord::try_from)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: i64) -> Result<bool, DatabaseError> {
        let done = sqlx::query("DELETE FROM operations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn delete_all(&self) -> Result<u64, DatabaseError> {
        let done = sqlx::query("DELETE FROM operations")
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
