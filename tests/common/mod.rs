#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use calc_history::config::FeatureConfig;
use calc_history::database::{
    DatabaseError, MemoryOperationRepository, NewOperation, OperationRecord, OperationRepository,
};
use calc_history::notify::{NotificationDispatcher, Notifier, NotifyError, PushMessage};
use calc_history::server::{self, AppState};
use calc_history::services::HistoryService;

/// Captures pushes instead of contacting a gateway
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<PushMessage>>,
    delivered: Notify,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<PushMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub async fn wait_for_delivery(&self) -> Result<()> {
        tokio::time::timeout(Duration::from_secs(5), self.delivered.notified())
            .await
            .context("notification was not delivered")
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &PushMessage) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(message.clone());
        self.delivered.notify_one();
        Ok(())
    }
}

/// Never finishes a send
pub struct HangingNotifier;

#[async_trait]
impl Notifier for HangingNotifier {
    async fn send(&self, _message: &PushMessage) -> Result<(), NotifyError> {
        std::future::pending().await
    }
}

/// Store whose every call fails like an exhausted pool
pub struct BrokenRepository;

fn pool_timeout() -> DatabaseError {
    DatabaseError::Sqlx(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl OperationRepository for BrokenRepository {
    async fn create(&self, _op: NewOperation) -> Result<OperationRecord, DatabaseError> {
        Err(pool_timeout())
    }

    async fn list_all(&self) -> Result<Vec<OperationRecord>, DatabaseError> {
        Err(pool_timeout())
    }

    async fn get_by_id(&self, _id: i64) -> Result<Option<OperationRecord>, DatabaseError> {
        Err(pool_timeout())
    }

    async fn update(&self, _id: i64, _op: NewOperation) -> Result<Option<OperationRecord>, DatabaseError> {
        Err(pool_timeout())
    }

    async fn delete_by_id(&self, _id: i64) -> Result<bool, DatabaseError> {
        Err(pool_timeout())
    }

    async fn delete_all(&self) -> Result<u64, DatabaseError> {
        Err(pool_timeout())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Err(pool_timeout())
    }
}

pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Spawn a server on an ephemeral port backed by the in-memory store
pub async fn spawn_server(proceed: bool) -> Result<TestServer> {
    let notifier = Arc::new(RecordingNotifier::default());
    let base_url = spawn_app(
        Arc::new(MemoryOperationRepository::new()),
        notifier.clone(),
        proceed,
    )
    .await?;

    Ok(TestServer {
        base_url,
        client: reqwest::Client::new(),
        notifier,
    })
}

/// Spawn a server with arbitrary store and notifier; returns its base URL
pub async fn spawn_app(
    repo: Arc<dyn OperationRepository>,
    notifier: Arc<dyn Notifier>,
    proceed: bool,
) -> Result<String> {
    let service = HistoryService::new(
        repo,
        NotificationDispatcher::new(notifier),
        FeatureConfig { proceed },
    );

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let base_url = format!("http://{}", listener.local_addr()?);

    tokio::spawn(async move {
        let _ = axum::serve(listener, server::app(AppState::new(service))).await;
    });

    Ok(base_url)
}
