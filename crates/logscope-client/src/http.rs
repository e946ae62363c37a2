//! HTTP implementation of [`LogBackend`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde_json::{Value, json};
use tracing::debug;

use crate::backend::LogBackend;
use crate::error::{ClientError, Result};
use logscope_types::CreateLogRequest;

/// Request timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Log backend reached over its REST API
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if parsed.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(format!(
                "{}: not usable as a base URL",
                base_url
            )));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// Append path segments to the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder, endpoint: &str) -> Result<Value> {
        debug!(endpoint, "sending backend request");
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(endpoint, status = status.as_u16(), bytes = body.len(), "backend responded");

        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: status_message(status.as_u16(), &body),
            });
        }

        decode_body(&body)
    }

    async fn get(&self, segments: &[&str]) -> Result<Value> {
        let url = self.endpoint(segments)?;
        let endpoint = url.path().to_string();
        self.send(self.client.get(url), &endpoint).await
    }
}

#[async_trait]
impl LogBackend for HttpBackend {
    async fn list_schemas(&self) -> Result<Value> {
        self.get(&["schemas"]).await
    }

    async fn list_modules(&self, schema_id: &str) -> Result<Value> {
        self.get(&["modules", schema_id]).await
    }

    async fn list_logs(&self, schema_name: &str, module_name: &str) -> Result<Value> {
        self.get(&["logs", schema_name, module_name]).await
    }

    async fn list_logs_by_schema(&self, schema_id: &str) -> Result<Value> {
        self.get(&["logs", "by-schema", schema_id]).await
    }

    async fn create_log(&self, request: &CreateLogRequest) -> Result<Value> {
        if let Some(field) = request.missing_field() {
            return Err(ClientError::InvalidRequest(format!("{} must not be empty", field)));
        }
        let url = self.endpoint(&["logs"])?;
        self.send(self.client.post(url).json(request), "/logs").await
    }

    async fn get_schema(&self, name: &str) -> Result<Value> {
        self.get(&["schemas", name]).await
    }

    async fn create_schema(&self, name: &str) -> Result<Value> {
        if name.trim().is_empty() {
            return Err(ClientError::InvalidRequest(
                "schema name must not be empty".to_string(),
            ));
        }
        let url = self.endpoint(&["schemas"])?;
        let body = json!({ "name": name });
        self.send(self.client.post(url).json(&body), "/schemas").await
    }
}

/// Decode a successful body.
///
/// An empty or `null` body reads as an empty array. An object carrying an
/// `error` field is reported as a backend error even under a 2xx status.
fn decode_body(body: &str) -> Result<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Array(Vec::new()));
    }

    match serde_json::from_str::<Value>(body)? {
        Value::Null => Ok(Value::Array(Vec::new())),
        Value::Object(map) => {
            if let Some(error) = map.get("error").filter(|v| is_truthy(v)) {
                return Err(ClientError::Backend(value_text(error)));
            }
            Ok(Value::Object(map))
        }
        other => Ok(other),
    }
}

/// Status description, followed by the backend's own text when it sent one
fn status_message(status: u16, body: &str) -> String {
    let description = ClientError::describe_status(status);
    match backend_message(body) {
        Some(text) => format!("{}: {}", description, text),
        None => description,
    }
}

/// Pull an `error` or `message` text out of an error response body
fn backend_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let obj = value.as_object()?;
    ["error", "message"]
        .into_iter()
        .filter_map(|key| obj.get(key))
        .find(|v| is_truthy(v))
        .map(value_text)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
