use anyhow::{bail, Context};
use reqwest::{Client, Method, Response};
use serde::Serialize;
use serde_json::{json, Value};

/// Thin HTTP client for a running calculator history server
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn calculate(
        &self,
        num1: f64,
        operation: &str,
        num2: f64,
        device_token: Option<&str>,
    ) -> anyhow::Result<Value> {
        let mut body = json!({ "num1": num1, "num2": num2, "operation": operation });
        if let Some(token) = device_token {
            body["deviceToken"] = json!(token);
        }
        self.send(Method::POST, "/calculate", Some(&body)).await
    }

    pub async fn history(&self) -> anyhow::Result<Value> {
        self.send::<()>(Method::GET, "/history", None).await
    }

    pub async fn update(&self, id: i64, num1: f64, operation: &str, num2: f64) -> anyhow::Result<Value> {
        let body = json!({ "num1": num1, "num2": num2, "operation": operation });
        self.send(Method::PUT, &format!("/history/{}", id), Some(&body)).await
    }

    pub async fn delete(&self, id: i64) -> anyhow::Result<Value> {
        self.send::<()>(Method::DELETE, &format!("/history/{}", id), None).await
    }

    pub async fn clear(&self) -> anyhow::Result<Value> {
        self.send::<()>(Method::DELETE, "/history", None).await
    }

    pub async fn check_proceed(&self) -> anyhow::Result<Value> {
        self.send::<()>(Method::POST, "/checkProceed", None).await
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> anyhow::Result<Value> {
        let url = self.url(path);
        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .await
            .with_context(|| format!("failed to reach {}", url))?;
        parse_response(response).await
    }
}

async fn parse_response(response: Response) -> anyhow::Result<Value> {
    let status = response.status();
    let body: Value = response.json().await.context("server returned a non-JSON body")?;

    if !status.is_success() {
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("request failed");
        match body.get("details").and_then(Value::as_str) {
            Some(details) => bail!("{} ({}): {}", message, status, details),
            None => bail!("{} ({})", message, status),
        }
    }
    Ok(body)
}
