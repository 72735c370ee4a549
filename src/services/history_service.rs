use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument};

use crate::calculator::{self, CalcError};
use crate::config::FeatureConfig;
use crate::database::{DatabaseError, NewOperation, OperationRecord, OperationRepository};
use crate::notify::{NotificationDispatcher, PushMessage};

pub const NOTIFICATION_TITLE: &str = "Calculation Result";
pub const UPDATED_MESSAGE: &str = "Operation updated successfully";
pub const DELETED_MESSAGE: &str = "Operation deleted successfully";
pub const CLEARED_MESSAGE: &str = "All history deleted successfully";

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error(transparent)]
    Calculation(#[from] CalcError),

    #[error("Operation {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Inputs for a new calculation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationRequest {
    pub num1: f64,
    pub num2: f64,
    pub operation: String,
    #[serde(default)]
    pub device_token: Option<String>,
}

/// Inputs for recomputing an existing record
#[derive(Debug, Clone, Deserialize)]
pub struct OperationInput {
    pub num1: f64,
    pub num2: f64,
    pub operation: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationOutcome {
    pub result: f64,
    pub operation: OperationRecord,
    pub updated_history: Vec<OperationRecord>,
}

/// Response of every mutation other than create
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryChange {
    pub message: String,
    pub updated_history: Vec<OperationRecord>,
}

/// Orchestrates calculation, persistence and notification
pub struct HistoryService {
    repo: Arc<dyn OperationRepository>,
    notifications: NotificationDispatcher,
    features: FeatureConfig,
}

impl HistoryService {
    pub fn new(
        repo: Arc<dyn OperationRepository>,
        notifications: NotificationDispatcher,
        features: FeatureConfig,
    ) -> Self {
        Self { repo, notifications, features }
    }

    pub fn repository(&self) -> &Arc<dyn OperationRepository> {
        &self.repo
    }

    /// Compute, persist, optionally notify, then return the full history
    #[instrument(skip(self, request), fields(operation = %request.operation))]
    pub async fn calculate(&self, request: CalculationRequest) -> Result<CalculationOutcome, HistoryError> {
        let new_op = compute(&request.operation, request.num1, request.num2)?;
        let record = self.repo.create(new_op).await?;
        info!(id = record.id, result = record.result, "Recorded calculation");

        if let Some(device_token) = request.device_token.filter(|t| !t.trim().is_empty()) {
            // Not awaited: delivery never affects the response
            let _ = self.notifications.dispatch(PushMessage {
                device_token,
                title: NOTIFICATION_TITLE.to_string(),
                body: summary(&record),
            });
        }

        let updated_history = self.repo.list_all().await?;
        Ok(CalculationOutcome {
            result: record.result,
            operation: record,
            updated_history,
        })
    }

    pub async fn list(&self) -> Result<Vec<OperationRecord>, HistoryError> {
        Ok(self.repo.list_all().await?)
    }

    #[instrument(skip(self, input), fields(operation = %input.operation))]
    pub async fn update(&self, id: i64, input: OperationInput) -> Result<HistoryChange, HistoryError> {
        if self.repo.get_by_id(id).await?.is_none() {
            return Err(HistoryError::NotFound(id));
        }

        let new_op = compute(&input.operation, input.num1, input.num2)?;
        // The row may vanish between the lookup and the write
        self.repo
            .update(id, new_op)
            .await?
            .ok_or(HistoryError::NotFound(id))?;
        info!(id, "Updated operation");

        Ok(HistoryChange {
            message: UPDATED_MESSAGE.to_string(),
            updated_history: self.repo.list_all().await?,
        })
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<HistoryChange, HistoryError> {
        if !self.repo.delete_by_id(id).await? {
            return Err(HistoryError::NotFound(id));
        }
        info!(id, "Deleted operation");

        Ok(HistoryChange {
            message: DELETED_MESSAGE.to_string(),
            updated_history: self.repo.list_all().await?,
        })
    }

    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<HistoryChange, HistoryError> {
        let removed = self.repo.delete_all().await?;
        info!(removed, "Cleared history");

        Ok(HistoryChange {
            message: CLEARED_MESSAGE.to_string(),
            updated_history: Vec::new(),
        })
    }

    /// 1 when the proceed flag is enabled, 0 otherwise
    pub fn check_proceed(&self) -> u8 {
        u8::from(self.features.proceed)
    }
}

fn compute(symbol: &str, num1: f64, num2: f64) -> Result<NewOperation, CalcError> {
    let (operation, result) = calculator::evaluate(symbol, num1, num2)?;
    Ok(NewOperation { num1, num2, operation, result })
}

fn summary(record: &OperationRecord) -> String {
    format!(
        "{} {} {} = {}",
        record.num1, record.operation, record.num2, record.result
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::Operator;
    use crate::database::MemoryOperationRepository;
    use crate::notify::{Notifier, NotifyError};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<PushMessage>>,
        delivered: Notify,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, message: &PushMessage) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(message.clone());
            self.delivered.notify_one();
            Ok(())
        }
    }

    struct Fixture {
        service: HistoryService,
        notifier: Arc<RecordingNotifier>,
    }

    fn fixture(proceed: bool) -> Fixture {
        let notifier = Arc::new(RecordingNotifier::default());
        let service = HistoryService::new(
            Arc::new(MemoryOperationRepository::new()),
            NotificationDispatcher::new(notifier.clone()),
            FeatureConfig { proceed },
        );
        Fixture { service, notifier }
    }

    fn calc(num1: f64, operation: &str, num2: f64) -> CalculationRequest {
        CalculationRequest {
            num1,
            num2,
            operation: operation.to_string(),
            device_token: None,
        }
    }

    fn input(num1: f64, operation: &str, num2: f64) -> OperationInput {
        OperationInput { num1, num2, operation: operation.to_string() }
    }

    #[tokio::test]
    async fn calculate_records_and_returns_history() {
        let f = fixture(false);
        let outcome = f.service.calculate(calc(3.0, "+", 4.0)).await.unwrap();

        assert_eq!(outcome.result, 7.0);
        assert_eq!(outcome.operation.operation, Operator::Add);
        assert_eq!(outcome.updated_history.len(), 1);

        let listed = f.service.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        let record = &listed[0];
        assert_eq!((record.num1, record.num2, record.operation, record.result), (3.0, 4.0, Operator::Add, 7.0));
    }

    #[tokio::test]
    async fn rejected_calculations_persist_nothing() {
        let f = fixture(false);
        f.service.calculate(calc(6.0, "/", 3.0)).await.unwrap();

        let err = f.service.calculate(calc(5.0, "/", 0.0)).await.unwrap_err();
        assert!(matches!(err, HistoryError::Calculation(CalcError::DivisionByZero)));

        let err = f.service.calculate(calc(5.0, "%", 1.0)).await.unwrap_err();
        assert!(matches!(err, HistoryError::Calculation(CalcError::InvalidOperator(_))));

        let listed = f.service.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].result, 2.0);
    }

    #[tokio::test]
    async fn calculate_with_device_token_dispatches_summary() {
        let f = fixture(false);
        let mut request = calc(6.0, "/", 3.0);
        request.device_token = Some("device-abc".into());

        f.service.calculate(request).await.unwrap();
        f.notifier.delivered.notified().await;

        let sent = f.notifier.sent.lock().unwrap().clone();
        assert_eq!(
            sent,
            vec![PushMessage {
                device_token: "device-abc".into(),
                title: NOTIFICATION_TITLE.into(),
                body: "6 / 3 = 2".into(),
            }]
        );
    }

    #[tokio::test]
    async fn blank_device_token_is_ignored() {
        let f = fixture(false);
        let mut request = calc(1.0, "+", 1.0);
        request.device_token = Some("   ".into());
        f.service.calculate(request).await.unwrap();

        tokio::task::yield_now().await;
        assert!(f.notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_recomputes_result() {
        let f = fixture(false);
        let created = f.service.calculate(calc(3.0, "+", 4.0)).await.unwrap().operation;

        let change = f.service.update(created.id, input(10.0, "/", 2.0)).await.unwrap();
        assert_eq!(change.message, UPDATED_MESSAGE);
        let record = &change.updated_history[0];
        assert_eq!((record.num1, record.num2, record.operation, record.result), (10.0, 2.0, Operator::Divide, 5.0));
    }

    #[tokio::test]
    async fn update_validates_like_create() {
        let f = fixture(false);
        let created = f.service.calculate(calc(3.0, "+", 4.0)).await.unwrap().operation;

        let err = f.service.update(created.id, input(1.0, "/", 0.0)).await.unwrap_err();
        assert!(matches!(err, HistoryError::Calculation(CalcError::DivisionByZero)));

        // Record untouched after the rejected update
        let listed = f.service.list().await.unwrap();
        assert_eq!(listed[0].result, 7.0);
    }

    #[tokio::test]
    async fn update_and_delete_unknown_ids_are_not_found() {
        let f = fixture(false);
        let err = f.service.update(42, input(1.0, "+", 1.0)).await.unwrap_err();
        assert!(matches!(err, HistoryError::NotFound(42)));

        // Not-found wins over invalid input
        let err = f.service.update(42, input(1.0, "?", 1.0)).await.unwrap_err();
        assert!(matches!(err, HistoryError::NotFound(42)));

        let err = f.service.delete(42).await.unwrap_err();
        assert!(matches!(err, HistoryError::NotFound(42)));
    }

    #[tokio::test]
    async fn delete_one_returns_remaining_history() {
        let f = fixture(false);
        let first = f.service.calculate(calc(1.0, "+", 1.0)).await.unwrap().operation;
        let second = f.service.calculate(calc(2.0, "*", 3.0)).await.unwrap().operation;

        let change = f.service.delete(first.id).await.unwrap();
        assert_eq!(change.message, DELETED_MESSAGE);
        assert_eq!(change.updated_history.iter().map(|r| r.id).collect::<Vec<_>>(), vec![second.id]);
    }

    #[tokio::test]
    async fn clear_empties_history() {
        let f = fixture(false);
        f.service.calculate(calc(1.0, "+", 1.0)).await.unwrap();
        f.service.calculate(calc(2.0, "-", 1.0)).await.unwrap();

        let change = f.service.clear().await.unwrap();
        assert_eq!(change.message, CLEARED_MESSAGE);
        assert!(change.updated_history.is_empty());
        assert!(f.service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn overflowing_results_are_stored_and_rendered_as_null() {
        let f = fixture(false);
        let outcome = f.service.calculate(calc(1e308, "*", 10.0)).await.unwrap();
        assert_eq!(outcome.result, f64::INFINITY);

        // JSON has no representation for infinity
        let body = serde_json::to_value(&outcome).unwrap();
        assert!(body["result"].is_null());
        assert!(body["operation"]["result"].is_null());
        assert!(body["updatedHistory"][0]["result"].is_null());
        assert_eq!(body["operation"]["num1"], serde_json::json!(1e308));
    }

    #[test]
    fn check_proceed_follows_flag() {
        assert_eq!(fixture(true).service.check_proceed(), 1);
        assert_eq!(fixture(false).service.check_proceed(), 0);
    }

    #[test]
    fn summary_formats_operands() {
        let now = chrono::Utc::now();
        let record = OperationRecord {
            id: 1,
            num1: 2.5,
            num2: -1.0,
            operation: Operator::Multiply,
            result: -2.5,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(summary(&record), "2.5 * -1 = -2.5");
    }
}
