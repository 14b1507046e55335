//! The fetch guard: the single path every API call takes.
//!
//! Each call waits (bounded) for auth readiness, attaches the bearer token,
//! settles the `Content-Type` header for the body kind, and retries
//! retryable failures with exponential backoff plus jitter. Network errors,
//! HTTP 5xx and HTTP 429 are retried; any other non-2xx response, and a 2xx
//! response carrying an error envelope, fail immediately.

pub mod auth;
pub mod transport;

#[cfg(test)]
pub mod testing;

use std::time::Duration;

use rand::Rng;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, warn};

pub use auth::{AuthGate, AuthHandle, MOCK_TOKEN};
pub use transport::{
    HttpRequest, HttpResponse, Method, RequestBody, ReqwestTransport, Transport, TransportError,
    UploadPart,
};

pub const MAX_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_BASE: Duration = Duration::from_millis(1000);
const DEFAULT_AUTH_WAIT: Duration = Duration::from_millis(5000);

#[derive(Debug, Error)]
pub enum GuardError {
    /// Every attempt failed with a retryable error.
    #[error("Failed to perform '{operation}'. Please check your network connection and try again. Technical details: {details}")]
    Exhausted {
        operation: String,
        status: Option<u16>,
        details: String,
    },

    /// The server answered with a non-retryable error.
    #[error("{message}")]
    Rejected {
        operation: String,
        status: u16,
        message: String,
    },

    #[error("Failed to perform '{operation}': {details}")]
    InvalidRequest { operation: String, details: String },

    #[error("Unexpected response for '{operation}': {details}")]
    Decode { operation: String, details: String },

    #[error("Request body could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

impl GuardError {
    /// HTTP status of the last response, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            GuardError::Exhausted { status, .. } => *status,
            GuardError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GuardConfig {
    pub base_url: String,
    pub retry_base: Duration,
    pub auth_wait: Duration,
}

impl GuardConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            retry_base: DEFAULT_RETRY_BASE,
            auth_wait: DEFAULT_AUTH_WAIT,
        }
    }
}

/// Per-call options: extra headers, query pairs and the body.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl RequestOptions {
    pub fn json<B: Serialize + ?Sized>(body: &B) -> Result<Self, GuardError> {
        Ok(Self {
            body: RequestBody::Json(serde_json::to_value(body)?),
            ..Self::default()
        })
    }

    pub fn multipart(fields: Vec<(String, String)>, files: Vec<UploadPart>) -> Self {
        Self {
            body: RequestBody::Multipart { fields, files },
            ..Self::default()
        }
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }
}

pub struct FetchGuard<T: Transport> {
    transport: T,
    auth: AuthGate,
    config: GuardConfig,
}

impl<T: Transport> FetchGuard<T> {
    pub fn new(transport: T, auth: AuthGate, config: GuardConfig) -> Self {
        Self {
            transport,
            auth,
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Sends the request with retries and returns the raw successful response.
    pub async fn send(
        &self,
        operation: &str,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<HttpResponse, GuardError> {
        let token = self.auth.token(self.config.auth_wait).await;
        let request = HttpRequest {
            method,
            url: self.url(path),
            query: options.query,
            headers: prepare_headers(options.headers, &options.body, &token),
            body: options.body,
        };

        let mut last_error = String::new();
        let mut last_status = None;

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                let delay = backoff_delay(attempt - 1, self.config.retry_base);
                warn!(
                    operation,
                    attempt,
                    "Request failed ({last_error}), retrying after {}ms...",
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            debug!(
                operation,
                method = method.as_str(),
                url = %request.url,
                attempt = attempt + 1,
                "Sending request"
            );

            match self.transport.send(request.clone()).await {
                Ok(response) if response.is_success() => return Ok(response),
                Ok(response) if is_retryable_status(response.status) => {
                    last_status = Some(response.status);
                    last_error = describe_failure(&response);
                }
                Ok(response) => {
                    let message = server_message(&response.body)
                        .unwrap_or_else(|| format!("HTTP {}", response.status));
                    warn!(operation, status = response.status, "Request rejected: {message}");
                    return Err(GuardError::Rejected {
                        operation: operation.to_string(),
                        status: response.status,
                        message,
                    });
                }
                Err(TransportError::Network(e)) => {
                    last_status = None;
                    last_error = e;
                }
                Err(TransportError::InvalidRequest(details)) => {
                    return Err(GuardError::InvalidRequest {
                        operation: operation.to_string(),
                        details,
                    });
                }
            }
        }

        error!(operation, attempts = MAX_ATTEMPTS, "Request failed: {last_error}");
        Err(GuardError::Exhausted {
            operation: operation.to_string(),
            status: last_status,
            details: last_error,
        })
    }

    /// Like [`send`](Self::send) but parses the body as JSON and treats an
    /// error envelope as a failure.
    pub async fn send_json(
        &self,
        operation: &str,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<Value, GuardError> {
        let response = self.send(operation, method, path, options).await?;
        if response.body.is_empty() {
            return Ok(Value::Null);
        }

        let value: Value = serde_json::from_slice(&response.body).map_err(|e| GuardError::Decode {
            operation: operation.to_string(),
            details: e.to_string(),
        })?;

        if value.get("status").and_then(Value::as_str) == Some(shared_types::STATUS_ERROR) {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("The server reported an error.")
                .to_string();
            return Err(GuardError::Rejected {
                operation: operation.to_string(),
                status: response.status,
                message,
            });
        }
        Ok(value)
    }

    /// Typed decode on top of [`send_json`](Self::send_json).
    pub async fn fetch<R: DeserializeOwned>(
        &self,
        operation: &str,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<R, GuardError> {
        let value = self.send_json(operation, method, path, options).await?;
        serde_json::from_value(value).map_err(|e| GuardError::Decode {
            operation: operation.to_string(),
            details: e.to_string(),
        })
    }
}

/// Caller headers plus bearer auth. Multipart bodies lose any caller
/// `Content-Type` so the transport can set the boundary; everything else
/// defaults to JSON.
fn prepare_headers(
    mut headers: Vec<(String, String)>,
    body: &RequestBody,
    token: &str,
) -> Vec<(String, String)> {
    headers.retain(|(name, _)| !name.eq_ignore_ascii_case("authorization"));

    if body.is_multipart() {
        headers.retain(|(name, _)| !name.eq_ignore_ascii_case("content-type"));
    } else if !headers
        .iter()
        .any(|(name, _)| name.eq_ignore_ascii_case("content-type"))
    {
        headers.push(("Content-Type".to_string(), "application/json".to_string()));
    }

    headers.push(("Authorization".to_string(), format!("Bearer {token}")));
    headers
}

fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

/// Delay before retry number `retry` (0-based): `2^retry * base` plus up to
/// one `base` of jitter.
pub fn backoff_delay(retry: u32, base: Duration) -> Duration {
    let base_ms = base.as_millis() as u64;
    let jitter = if base_ms == 0 {
        0
    } else {
        rand::thread_rng().gen_range(0..base_ms)
    };
    Duration::from_millis((1u64 << retry.min(16)) * base_ms + jitter)
}

fn server_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn describe_failure(response: &HttpResponse) -> String {
    let detail = server_message(&response.body).unwrap_or_else(|| {
        let text = String::from_utf8_lossy(&response.body);
        text.chars().take(200).collect()
    });
    if detail.is_empty() {
        format!("HTTP {}", response.status)
    } else {
        format!("HTTP {}: {detail}", response.status)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;
    use serde_json::json;

    use super::testing::{json_response, network_error, ScriptedTransport};
    use super::*;

    fn guard(script: Vec<Result<HttpResponse, TransportError>>) -> (FetchGuard<Arc<ScriptedTransport>>, Arc<ScriptedTransport>) {
        let transport = Arc::new(ScriptedTransport::new(script));
        let guard = FetchGuard::new(
            transport.clone(),
            AuthGate::ready(Some("secret".into())),
            GuardConfig::new("http://api.test/"),
        );
        (guard, transport)
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_errors_retry_three_times_then_normalize() {
        let (guard, transport) = guard(vec![
            json_response(500, json!({"status": "error", "message": "boom"})),
            json_response(503, json!({})),
            json_response(502, json!({"status": "error", "message": "bad gateway"})),
        ]);

        let started = tokio::time::Instant::now();
        let err = guard
            .send_json("load companies", Method::Get, "/api/companies", RequestOptions::default())
            .await
            .unwrap_err();

        assert_eq!(transport.attempts(), 3);
        assert_eq!(err.status(), Some(502));
        assert_eq!(
            err.to_string(),
            "Failed to perform 'load companies'. Please check your network connection and try again. Technical details: HTTP 502: bad gateway"
        );
        // 1x base + 2x base, each with under one base of jitter
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(3000));
        assert!(elapsed < Duration::from_millis(5000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_errors_are_retried() {
        let (guard, transport) = guard(vec![network_error(), network_error(), network_error()]);
        let err = guard
            .send("ping", Method::Get, "/health", RequestOptions::default())
            .await
            .unwrap_err();
        assert_eq!(transport.attempts(), 3);
        assert!(matches!(err, GuardError::Exhausted { status: None, .. }));
        assert!(err.to_string().ends_with("connection refused"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_error_fails_after_one_attempt() {
        let (guard, transport) = guard(vec![json_response(
            404,
            json!({"status": "error", "code": "NOT_FOUND", "message": "Company 9 not found"}),
        )]);
        let err = guard
            .send_json("load company", Method::Get, "/api/companies/9", RequestOptions::default())
            .await
            .unwrap_err();
        assert_eq!(transport.attempts(), 1);
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "Company 9 not found");
    }

    #[tokio::test(start_paused = true)]
    async fn test_conflict_is_terminal() {
        let (guard, transport) = guard(vec![json_response(
            409,
            json!({"status": "error", "message": "Raw name 'Acme' is already mapped."}),
        )]);
        let err = guard
            .send_json("map", Method::Post, "/api/map/self", RequestOptions::default())
            .await
            .unwrap_err();
        assert_eq!(transport.attempts(), 1);
        assert_eq!(err.status(), Some(409));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_is_retried_until_success() {
        let (guard, transport) = guard(vec![
            json_response(429, json!({})),
            json_response(200, json!({"status": "success", "companies": []})),
        ]);
        let value = guard
            .send_json("sidebar", Method::Get, "/api/sidebar", RequestOptions::default())
            .await
            .unwrap();
        assert_eq!(transport.attempts(), 2);
        assert_eq!(value["companies"], json!([]));
    }

    #[tokio::test]
    async fn test_error_envelope_on_success_status_is_terminal() {
        let (guard, transport) = guard(vec![json_response(
            200,
            json!({"status": "error", "message": "Database connection failed."}),
        )]);
        let err = guard
            .send_json("db test", Method::Get, "/api/db_test", RequestOptions::default())
            .await
            .unwrap_err();
        assert_eq!(transport.attempts(), 1);
        assert_eq!(err.to_string(), "Database connection failed.");
    }

    #[tokio::test]
    async fn test_headers_for_json_request() {
        let (guard, transport) = guard(vec![json_response(201, json!({"status": "success"}))]);
        let options = RequestOptions::json(&json!({"company_name_clean": "Acme"})).unwrap();
        guard
            .send_json("create", Method::Post, "api/companies", options)
            .await
            .unwrap();

        let request = &transport.requests()[0];
        assert_eq!(request.url, "http://api.test/api/companies");
        assert_eq!(request.header("authorization"), Some("Bearer secret"));
        assert_eq!(request.header("content-type"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_multipart_strips_caller_content_type() {
        let (guard, transport) = guard(vec![json_response(201, json!({"status": "success"}))]);
        let part = UploadPart {
            field: "file".into(),
            file_name: "cv.pdf".into(),
            content_type: Some("application/pdf".into()),
            bytes: Bytes::from_static(b"%PDF"),
        };
        let options = RequestOptions::multipart(vec![("document_type".into(), "RESUME".into())], vec![part])
            .header("Content-Type", "application/json");
        guard
            .send_json("upload", Method::Post, "/api/application/x/documents", options)
            .await
            .unwrap();

        let request = &transport.requests()[0];
        assert_eq!(request.header("content-type"), None);
        assert!(request.body.is_multipart());
    }

    #[tokio::test(start_paused = true)]
    async fn test_multipart_body_resent_on_retry() {
        let (guard, transport) = guard(vec![
            json_response(500, json!({})),
            json_response(201, json!({"status": "success"})),
        ]);
        let part = UploadPart {
            field: "file".into(),
            file_name: "cv.pdf".into(),
            content_type: None,
            bytes: Bytes::from_static(b"%PDF"),
        };
        guard
            .send_json(
                "upload",
                Method::Post,
                "/api/application/x/documents",
                RequestOptions::multipart(Vec::new(), vec![part]),
            )
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].body, requests[1].body);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_token_when_auth_never_ready() {
        let transport = Arc::new(ScriptedTransport::new(vec![json_response(200, json!({}))]));
        let (gate, _handle) = AuthGate::pending();
        let guard = FetchGuard::new(transport.clone(), gate, GuardConfig::new("http://api.test"));
        guard
            .send_json("sidebar", Method::Get, "/api/sidebar", RequestOptions::default())
            .await
            .unwrap();
        assert_eq!(
            transport.requests()[0].header("authorization"),
            Some("Bearer MOCK_TOKEN")
        );
    }

    #[tokio::test]
    async fn test_empty_success_body_is_null() {
        let (guard, _) = guard(vec![Ok(HttpResponse {
            status: 204,
            headers: Vec::new(),
            body: Bytes::new(),
        })]);
        let value = guard
            .send_json("delete", Method::Delete, "/api/companies/3", RequestOptions::default())
            .await
            .unwrap();
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn test_backoff_delay_bounds() {
        let base = Duration::from_millis(1000);
        for _ in 0..50 {
            let first = backoff_delay(0, base);
            assert!(first >= Duration::from_millis(1000) && first < Duration::from_millis(2000));
            let second = backoff_delay(1, base);
            assert!(second >= Duration::from_millis(2000) && second < Duration::from_millis(3000));
        }
        assert_eq!(backoff_delay(3, Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable_status(429));
        assert!(is_retryable_status(500));
        assert!(is_retryable_status(503));
        assert!(!is_retryable_status(400));
        assert!(!is_retryable_status(404));
        assert!(!is_retryable_status(409));
    }
}
