use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewOperation, OperationRecord};

/// Narrow contract the history service needs from a record store
#[async_trait]
pub trait OperationRepository: Send + Sync {
    async fn create(&self, op: NewOperation) -> Result<OperationRecord, DatabaseError>;

    /// All rows in insertion order
    async fn list_all(&self) -> Result<Vec<OperationRecord>, DatabaseError>;

    async fn get_by_id(&self, id: i64) -> Result<Option<OperationRecord>, DatabaseError>;

    /// Overwrite every calculation field; `None` when the id does not exist
    async fn update(
        &self,
        id: i64,
        op: NewOperation,
    ) -> Result<Option<OperationRecord>, DatabaseError>;

    /// Returns whether a row was removed
    async fn delete_by_id(&self, id: i64) -> Result<bool, DatabaseError>;

    /// Returns the number of rows removed
    async fn delete_all(&self) -> Result<u64, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}
