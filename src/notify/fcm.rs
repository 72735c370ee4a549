use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{Notifier, NotifyError, PushMessage};
use crate::config::PushConfig;

const FCM_API_URL: &str = "https://fcm.googleapis.com/v1/projects";
const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh cached access tokens this long before they expire
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Firebase Cloud Messaging HTTP v1 client authenticated as a service account
pub struct FcmNotifier {
    project_id: String,
    client_email: String,
    private_key: String,
    private_key_id: Option<String>,
    token_uri: String,
    client: Client,
    token: Mutex<Option<CachedToken>>,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

#[derive(Debug, Serialize, Deserialize)]
struct AssertionClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    ASSERTION_LIFETIME_SECS as u64
}

#[derive(Debug, Serialize)]
struct FcmRequest<'a> {
    message: FcmMessage<'a>,
}

#[derive(Debug, Serialize)]
struct FcmMessage<'a> {
    token: &'a str,
    notification: FcmNotification<'a>,
}

#[derive(Debug, Serialize)]
struct FcmNotification<'a> {
    title: &'a str,
    body: &'a str,
}

impl FcmNotifier {
    pub fn from_config(config: &PushConfig) -> Result<Self, NotifyError> {
        let required = |value: &Option<String>, name: &'static str| {
            value
                .clone()
                .filter(|v| !v.trim().is_empty())
                .ok_or(NotifyError::NotConfigured(name))
        };

        Ok(Self {
            project_id: required(&config.project_id, "FIREBASE_PROJECT_ID")?,
            client_email: required(&config.client_email, "FIREBASE_CLIENT_EMAIL")?,
            private_key: required(&config.private_key, "FIREBASE_PRIVATE_KEY")?,
            private_key_id: config.private_key_id.clone(),
            token_uri: config.token_uri.clone(),
            client: Client::new(),
            token: Mutex::new(None),
        })
    }

    fn send_url(&self) -> String {
        format!("{}/{}/messages:send", FCM_API_URL, self.project_id)
    }

    fn assertion_claims(&self, now: i64) -> AssertionClaims {
        AssertionClaims {
            iss: self.client_email.clone(),
            scope: FCM_SCOPE.to_string(),
            aud: self.token_uri.clone(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        }
    }

    fn sign_assertion(&self) -> Result<String, NotifyError> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())?;
        let claims = self.assertion_claims(chrono::Utc::now().timestamp());
        Ok(jsonwebtoken::encode(&header, &claims, &key)?)
    }

    fn cached_token(&self, cached: &Option<CachedToken>) -> Option<String> {
        cached
            .as_ref()
            .filter(|token| Instant::now() + TOKEN_REFRESH_MARGIN < token.expires_at)
            .map(|token| token.access_token.clone())
    }

    /// Exchange a signed assertion for an OAuth2 access token, reusing a cached one.
    ///
    /// The cache lock is never held across the exchange request.
    async fn access_token(&self) -> Result<String, NotifyError> {
        if let Some(token) = self.cached_token(&*self.token.lock().await) {
            return Ok(token);
        }

        let assertion = self.sign_assertion()?;
        let response = self
            .client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected { status, body });
        }

        let token: TokenResponse = response.json().await?;
        debug!(expires_in = token.expires_in, "Obtained push gateway access token");

        *self.token.lock().await = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });
        Ok(token.access_token)
    }
}

#[async_trait]
impl Notifier for FcmNotifier {
    async fn send(&self, message: &PushMessage) -> Result<(), NotifyError> {
        let access_token = self.access_token().await?;

        let request = FcmRequest {
            message: FcmMessage {
                token: &message.device_token,
                notification: FcmNotification {
                    title: &message.title,
                    body: &message.body,
                },
            },
        };

        let response = self
            .client
            .post(self.send_url())
            .bearer_auth(&access_token)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected { status, body });
        }

        info!(device_token = %message.device_token, "Push notification sent via FCM");
        Ok(())
    }
}
