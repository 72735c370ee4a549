use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewOperation, OperationRecord};
use crate::database::repository::OperationRepository;

/// In-process store used when no DATABASE_URL is configured, and by tests
#[derive(Default)]
pub struct MemoryOperationRepository {
    inner: RwLock<MemoryTable>,
}

#[derive(Default)]
struct MemoryTable {
    next_id: i64,
    rows: BTreeMap<i64, OperationRecord>,
}

impl MemoryOperationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OperationRepository for MemoryOperationRepository {
    async fn create(&self, op: NewOperation) -> Result<OperationRecord, DatabaseError> {
        let mut table = self.inner.write().await;
        // Ids are never reused, matching a serial column
        table.next_id += 1;
        let now = Utc::now();
        let record = OperationRecord {
            id: table.next_id,
            num1: op.num1,
            num2: op.num2,
            operation: op.operation,
            result: op.result,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(record.id, record.clone());
        Ok(record)
    }

    async fn list_all(&self) -> Result<Vec<OperationRecord>, DatabaseError> {
        Ok(self.inner.read().await.rows.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<OperationRecord>, DatabaseError> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn update(
        &self,
        id: i64,
        op: NewOperation,
    ) -> Result<Option<OperationRecord>, DatabaseError> {
        let mut table = self.inner.write().await;
        let Some(record) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        record.num1 = op.num1;
        record.num2 = op.num2;
        record.operation = op.operation;
        record.result = op.result;
        record.updated_at = Utc::now();
        Ok(Some(record.clone()))
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.inner.write().await.rows.remove(&id).is_some())
    }

    async fn delete_all(&self) -> Result<u64, DatabaseError> {
        let mut table = self.inner.write().await;
        let removed = table.rows.len() as u64;
        table.rows.clear();
        Ok(removed)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
