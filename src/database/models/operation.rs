use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::calculator::Operator;
use crate::database::manager::DatabaseError;

/// A persisted calculation as exposed by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRecord {
    pub id: i64,
    pub num1: f64,
    pub num2: f64,
    pub operation: Operator,
    pub result: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields written by create and update; `result` is always computed server-side
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewOperation {
    pub num1: f64,
    pub num2: f64,
    pub operation: Operator,
    pub result: f64,
}

/// Raw row shape of the `operations` table
#[derive(Debug, Clone, FromRow)]
pub struct OperationRow {
    pub id: i64,
    pub num1: f64,
    pub num2: f64,
    pub operation: String,
    pub result: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<OperationRow> for OperationRecord {
    type Error = DatabaseError;

    fn try_from(row: OperationRow) -> Result<Self, Self::Error> {
        let operation = row
            .operation
            .parse()
            .map_err(|_| DatabaseError::CorruptRow {
                id: row.id,
                reason: format!("unknown operator '{}'", row.operation),
            })?;

        Ok(Self {
            id: row.id,
            num1: row.num1,
            num2: row.num2,
            operation,
            result: row.result,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
