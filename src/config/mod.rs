use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub push: PushConfig,
    pub features: FeatureConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Absent means the in-memory store is used
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

/// Service-account credentials for the push gateway
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct PushConfig {
    pub project_id: Option<String>,
    pub client_email: Option<String>,
    pub private_key: Option<String>,
    pub private_key_id: Option<String>,
    pub token_uri: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Drives POST /checkProceed
    pub proceed: bool,
}

impl PushConfig {
    pub fn is_enabled(&self) -> bool {
        [&self.project_id, &self.client_email, &self.private_key]
            .iter()
            .all(|v| v.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }
}

// Keep the private key out of logs
impl std::fmt::Debug for PushConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushConfig")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let vars: HashMap<String, String> = env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Build from an explicit variable map so tests never touch process env
    pub fn from_vars(vars: &HashMap<String, String>) -> Self {
        let environment = match vars.get("APP_ENV").map(String::as_str) {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(vars)
    }

    fn with_overrides(mut self, vars: &HashMap<String, String>) -> Self {
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        if let Some(v) = get("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        if let Some(v) = get("DATABASE_URL") {
            self.database.url = Some(v.to_string());
        }
        if let Some(v) = get("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = get("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        if let Some(v) = get("CHECK_PROCEED") {
            self.features.proceed = parse_flag(v).unwrap_or(self.features.proceed);
        }

        self.push.project_id = get("FIREBASE_PROJECT_ID").map(str::to_string);
        self.push.client_email = get("FIREBASE_CLIENT_EMAIL").map(str::to_string);
        self.push.private_key_id = get("FIREBASE_PRIVATE_KEY_ID").map(str::to_string);
        // Keys pasted into .env files usually carry escaped newlines
        self.push.private_key = get("FIREBASE_PRIVATE_KEY").map(|k| k.replace("\\n", "\n"));
        if let Some(v) = get("FIREBASE_TOKEN_URI") {
            self.push.token_uri = v.to_string();
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: DEFAULT_PORT },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            push: PushConfig {
                token_uri: DEFAULT_TOKEN_URI.to_string(),
                ..Default::default()
            },
            features: FeatureConfig::default(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            ..Self::development()
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            ..Self::development()
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Replace the password of a connection string for logging
pub fn redact_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("****"));
            }
            url.into()
        }
        Err(_) => "<unparseable url>".to_string(),
    }
}
