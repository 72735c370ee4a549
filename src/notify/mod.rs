//! Push notification gateway and the fire-and-forget dispatcher in front of it.

pub mod fcm;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub use fcm::FcmNotifier;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Push gateway not configured: {0}")]
    NotConfigured(&'static str),

    #[error("Failed to sign service-account assertion: {0}")]
    Credentials(#[from] jsonwebtoken::errors::Error),

    #[error("Push gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Push gateway returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// A single push addressed to one device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMessage {
    pub device_token: String,
    pub title: String,
    pub body: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &PushMessage) -> Result<(), NotifyError>;
}

/// Used when no push credentials are configured
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn send(&self, message: &PushMessage) -> Result<(), NotifyError> {
        debug!(device_token = %message.device_token, "Push disabled, dropping notification");
        Ok(())
    }
}

/// Hands notifications to detached tasks; outcomes are logged, never returned
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    pub fn disabled() -> Self {
        Self::new(Arc::new(DisabledNotifier))
    }

    /// Spawn the send. Callers may drop the handle; the task keeps running.
    pub fn dispatch(&self, message: PushMessage) -> JoinHandle<()> {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            match notifier.send(&message).await {
                Ok(()) => debug!(device_token = %message.device_token, "Notification delivered"),
                Err(e) => warn!(
                    device_token = %message.device_token,
                    error = %e,
                    "Notification failed"
                ),
            }
        })
    }
}
