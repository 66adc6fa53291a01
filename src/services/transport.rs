/// HTTP plumbing for poster lookups
///
/// `HttpTransport` performs exactly one request. `RetryingClient` layers the
/// retry policy on top, so providers never deal with backoff themselves and
/// tests can script transports attempt by attempt.
use std::{sync::Arc, time::Duration};

use reqwest::{header::ACCEPT, Client as HttpClient, Method, StatusCode};
use tokio::time::sleep;

use crate::error::{AppError, AppResult};

const MAX_BACKOFF_SECS: u64 = 120;

/// A single outbound API request
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub bearer_token: Option<String>,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            query: Vec::new(),
            bearer_token: None,
        }
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Looks up a query parameter by name
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Status and raw body of a completed request
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Sends one request without retrying
///
/// Timeouts and connection failures must come back as
/// `AppError::TransientNetwork` so the retry layer can recognise them.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> AppResult<ApiResponse>;
}

/// `HttpTransport` backed by reqwest
#[derive(Clone)]
pub struct ReqwestTransport {
    http_client: HttpClient,
}

impl ReqwestTransport {
    /// Builds a client whose every request is bounded by `timeout`
    pub fn new(timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self { http_client })
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> AppResult<ApiResponse> {
        let mut builder = self
            .http_client
            .request(request.method.clone(), &request.url)
            .header(ACCEPT, "application/json")
            .query(&request.query);

        if let Some(token) = &request.bearer_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status();
        let body = response.text().await.map_err(classify)?;

        Ok(ApiResponse { status, body })
    }
}

fn classify(e: reqwest::Error) -> AppError {
    if e.is_timeout() || e.is_connect() || e.is_request() || e.is_body() {
        AppError::TransientNetwork(e.to_string())
    } else {
        AppError::HttpClient(e)
    }
}

/// When and how long to wait before retrying
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_factor: f64,
    /// Delay unit scaled by the factor; zero disables sleeping
    pub backoff_unit: Duration,
    pub max_backoff: Duration,
    pub retry_statuses: Vec<StatusCode>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_factor: 1.0,
            backoff_unit: Duration::from_secs(1),
            max_backoff: Duration::from_secs(MAX_BACKOFF_SECS),
            retry_statuses: vec![
                StatusCode::TOO_MANY_REQUESTS,
                StatusCode::INTERNAL_SERVER_ERROR,
                StatusCode::BAD_GATEWAY,
                StatusCode::SERVICE_UNAVAILABLE,
                StatusCode::GATEWAY_TIMEOUT,
            ],
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_factor: f64) -> Self {
        Self {
            max_retries,
            backoff_factor,
            ..Self::default()
        }
    }

    /// Same policy without any sleeping between attempts
    pub fn without_delay(mut self) -> Self {
        self.backoff_unit = Duration::ZERO;
        self
    }

    /// Delay before retry number `retry` (1-based): unit × factor × 2^(retry-1)
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16) as i32;
        let secs = self.backoff_unit.as_secs_f64() * self.backoff_factor * 2f64.powi(exponent);
        if !secs.is_finite() || secs <= 0.0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(secs).min(self.max_backoff)
    }

    pub fn is_retryable_status(&self, status: StatusCode) -> bool {
        self.retry_statuses.contains(&status)
    }
}

fn is_idempotent(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::PUT | Method::DELETE | Method::OPTIONS | Method::TRACE
    )
}

/// Transport wrapper that retries transient failures with exponential backoff
#[derive(Clone)]
pub struct RetryingClient {
    transport: Arc<dyn HttpTransport>,
    policy: RetryPolicy,
}

impl RetryingClient {
    pub fn new(transport: Arc<dyn HttpTransport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// Sends the request, retrying transient statuses and network errors
    ///
    /// A response whose status is still retryable after the last retry is
    /// reported as `TransientNetwork`.
    pub async fn execute(&self, request: &ApiRequest) -> AppResult<ApiResponse> {
        let retries_allowed = if is_idempotent(&request.method) {
            self.policy.max_retries
        } else {
            0
        };
        let mut retries = 0;

        loop {
            match self.transport.send(request).await {
                Ok(response) if self.policy.is_retryable_status(response.status) => {
                    if retries >= retries_allowed {
                        return Err(AppError::TransientNetwork(format!(
                            "{} returned {} after {} retries",
                            request.url, response.status, retries
                        )));
                    }
                    retries += 1;
                    let delay = self.policy.backoff(retries);
                    tracing::warn!(
                        url = %request.url,
                        status = %response.status,
                        attempt = retries,
                        delay_ms = delay.as_millis() as u64,
                        "Transient status, retrying"
                    );
                    sleep(delay).await;
                }
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() && retries < retries_allowed => {
                    retries += 1;
                    let delay = self.policy.backoff(retries);
                    tracing::warn!(
                        url = %request.url,
                        error = %e,
                        attempt = retries,
                        delay_ms = delay.as_millis() as u64,
                        "Request failed, retrying"
                    );
                    sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn client(mock: MockHttpTransport, max_retries: u32) -> RetryingClient {
        RetryingClient::new(
            Arc::new(mock),
            RetryPolicy::new(max_retries, 1.0).without_delay(),
        )
    }

    #[test]
    fn test_backoff_is_exponential() {
        let policy = RetryPolicy::new(5, 1.0);
        assert_eq!(policy.backoff(1), Duration::from_secs(1));
        assert_eq!(policy.backoff(2), Duration::from_secs(2));
        assert_eq!(policy.backoff(3), Duration::from_secs(4));

        let policy = RetryPolicy::new(5, 2.0);
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(3), Duration::from_secs(8));
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = RetryPolicy::new(5, 1.0);
        assert_eq!(policy.backoff(30), Duration::from_secs(MAX_BACKOFF_SECS));
    }

    #[test]
    fn test_backoff_zero_without_delay() {
        let policy = RetryPolicy::default().without_delay();
        assert_eq!(policy.backoff(3), Duration::ZERO);
    }

    #[test]
    fn test_retryable_statuses() {
        let policy = RetryPolicy::default();
        for code in [429, 500, 502, 503, 504] {
            assert!(policy.is_retryable_status(StatusCode::from_u16(code).unwrap()));
        }
        assert!(!policy.is_retryable_status(StatusCode::NOT_FOUND));
        assert!(!policy.is_retryable_status(StatusCode::UNAUTHORIZED));
        assert!(!policy.is_retryable_status(StatusCode::OK));
    }

    #[test]
    fn test_api_request_builder() {
        let request = ApiRequest::get("https://api.example/search")
            .query("query", "Heat")
            .bearer("token");

        assert_eq!(request.method, Method::GET);
        assert_eq!(request.param("query"), Some("Heat"));
        assert_eq!(request.param("api_key"), None);
        assert_eq!(request.bearer_token, Some("token".to_string()));
    }

    #[tokio::test]
    async fn test_retries_then_succeeds() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let mut mock = MockHttpTransport::new();
        mock.expect_send().times(4).returning(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) < 3 {
                Ok(ApiResponse::new(StatusCode::SERVICE_UNAVAILABLE, ""))
            } else {
                Ok(ApiResponse::new(StatusCode::OK, "{}"))
            }
        });

        let response = client(mock, 3)
            .execute(&ApiRequest::get("http://test.local"))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_exhausted_retries_are_transient_error() {
        let mut mock = MockHttpTransport::new();
        mock.expect_send()
            .times(4)
            .returning(|_| Ok(ApiResponse::new(StatusCode::TOO_MANY_REQUESTS, "")));

        let err = client(mock, 3)
            .execute(&ApiRequest::get("http://test.local"))
            .await
            .unwrap_err();

        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_permanent_status_is_not_retried() {
        let mut mock = MockHttpTransport::new();
        mock.expect_send()
            .times(1)
            .returning(|_| Ok(ApiResponse::new(StatusCode::UNAUTHORIZED, "bad key")));

        let response = client(mock, 3)
            .execute(&ApiRequest::get("http://test.local"))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_network_errors_are_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let mut mock = MockHttpTransport::new();
        mock.expect_send().times(2).returning(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(AppError::TransientNetwork("connection reset".to_string()))
            } else {
                Ok(ApiResponse::new(StatusCode::OK, "{}"))
            }
        });

        let response = client(mock, 3)
            .execute(&ApiRequest::get("http://test.local"))
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_non_transient_errors_are_not_retried() {
        let mut mock = MockHttpTransport::new();
        mock.expect_send()
            .times(1)
            .returning(|_| Err(AppError::ExternalApi("invalid url".to_string())));

        let result = client(mock, 3)
            .execute(&ApiRequest::get("http://test.local"))
            .await;
        tokio_test::assert_err!(result);
    }

    #[tokio::test]
    async fn test_non_idempotent_methods_are_not_retried() {
        let mut mock = MockHttpTransport::new();
        mock.expect_send()
            .times(1)
            .returning(|_| Ok(ApiResponse::new(StatusCode::SERVICE_UNAVAILABLE, "")));

        let mut request = ApiRequest::get("http://test.local");
        request.method = Method::POST;

        let err = client(mock, 3).execute(&request).await.unwrap_err();
        assert!(err.is_transient());
    }
}
