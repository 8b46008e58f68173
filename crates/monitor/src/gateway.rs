//! Remote environment API abstraction for testability.
//!
//! The [`EnvironmentClient`] trait abstracts the hosting platform's REST
//! API, allowing production code to use [`HttpEnvironmentClient`] while
//! tests use `MockEnvironmentClient`.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │  LogWatcher  │
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────────┐
//! │EnvironmentClient │ (trait)
//! └──────────────────┘
//!      │        │
//!      ▼        ▼
//!  ┌──────┐  ┌──────┐
//!  │ Http │  │ Mock │
//!  └───┬──┘  └──────┘
//!      │
//!      ▼
//!  Remote portal API
//! ```
//!
//! # Error Handling
//!
//! The watcher does not distinguish failure modes beyond success/failure:
//! connection errors, non-success HTTP statuses and undecodable payloads
//! all collapse into [`TransportError`] with a descriptive message.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;

use logvigil_core::error::TransportError;
use logvigil_core::types::RestartOutcome;

/// Trait abstracting the remote environment API.
///
/// All remote calls go through this trait, enabling testability via
/// mocking. The trait is `Send + Sync + 'static`, allowing safe sharing
/// across async contexts.
///
/// # Implementations
///
/// - [`HttpEnvironmentClient`]: production implementation using `reqwest`
/// - `MockEnvironmentClient`: test implementation with configurable
///   responses (available in tests only)
pub trait EnvironmentClient: Send + Sync + 'static {
    /// Fetches the tail of a log file as a raw newline-separated blob.
    ///
    /// # Arguments
    ///
    /// - `environment_id`: environment to read from
    /// - `file_name`: log file name (e.g. "error")
    /// - `line_count`: number of trailing lines to request
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on connection failure, non-success
    /// status, or an unreadable body.
    fn fetch_logs(
        &self,
        environment_id: &str,
        file_name: &str,
        line_count: usize,
    ) -> impl Future<Output = Result<String, TransportError>> + Send;

    /// Requests a service restart for the environment.
    ///
    /// The call is request/response; the remote may complete the restart
    /// asynchronously and report an operation id.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on connection failure, non-success
    /// status, or an undecodable payload.
    fn restart_service(
        &self,
        environment_id: &str,
    ) -> impl Future<Output = Result<RestartOutcome, TransportError>> + Send;

    /// Checks remote endpoint connectivity.
    ///
    /// Used once at daemon startup to log a degraded-mode warning early.
    /// Any HTTP response counts as reachable; only request-level failures
    /// are errors.
    fn ping(&self) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// Restart response payload as returned by the remote API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RestartResponse {
    message: Option<String>,
    operation_id: Option<String>,
}

/// Production client implementation using `reqwest`.
///
/// Authenticates every request with a bearer API key. The underlying
/// `reqwest::Client` holds a connection pool and is cheap to clone.
pub struct HttpEnvironmentClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpEnvironmentClient {
    /// Creates a client for the given API base URL.
    ///
    /// # Arguments
    ///
    /// - `base_url`: environment collection endpoint, without trailing slash
    /// - `api_key`: bearer token sent with every request
    /// - `timeout`: per-request timeout
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Request` if the HTTP client cannot be
    /// constructed (e.g. TLS backend initialisation failure).
    pub fn new(
        base_url: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request(format!("failed to build http client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
        })
    }

    fn logs_url(&self, environment_id: &str, file_name: &str) -> String {
        format!("{}/{}/logs/{}", self.base_url, environment_id, file_name)
    }

    fn restart_url(&self, environment_id: &str) -> String {
        format!("{}/{}/restart", self.base_url, environment_id)
    }
}

impl EnvironmentClient for HttpEnvironmentClient {
    async fn fetch_logs(
        &self,
        environment_id: &str,
        file_name: &str,
        line_count: usize,
    ) -> Result<String, TransportError> {
        let url = self.logs_url(environment_id, file_name);
        let response = self
            .http
            .get(&url)
            .query(&[("lines", line_count.to_string())])
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| TransportError::Request(format!("log fetch failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let reason = response.text().await.unwrap_or_else(|_| String::new());
            return Err(TransportError::Status {
                status: status.as_u16(),
                reason,
            });
        }

        response
            .text()
            .await
            .map_err(|e| TransportError::Decode(format!("log body read failed: {e}")))
    }

    async fn restart_service(
        &self,
        environment_id: &str,
    ) -> Result<RestartOutcome, TransportError> {
        let url = self.restart_url(environment_id);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| TransportError::Request(format!("restart request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let reason = response.text().await.unwrap_or_else(|_| String::new());
            return Err(TransportError::Status {
                status: status.as_u16(),
                reason,
            });
        }

        let payload: RestartResponse = response
            .json()
            .await
            .map_err(|e| TransportError::Decode(format!("restart response decode failed: {e}")))?;

        Ok(RestartOutcome {
            message: payload
                .message
                .unwrap_or_else(|| "restart accepted".to_owned()),
            status_code: status.as_u16(),
            operation_id: payload.operation_id,
        })
    }

    async fn ping(&self) -> Result<(), TransportError> {
        self.http
            .get(&self.base_url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| TransportError::Request(format!("ping failed: {e}")))?;
        Ok(())
    }
}

/// 테스트용 Mock 클라이언트
///
/// 설정 가능한 응답을 반환하여 원격 API 없이도 테스트할 수 있습니다.
#[cfg(test)]
pub struct MockEnvironmentClient {
    /// fetch_logs 호출 시 반환할 블롭
    pub blob: String,
    /// fetch 호출 시 실패를 시뮬레이션할지 여부
    pub fail_fetch: bool,
    /// restart 호출 시 실패를 시뮬레이션할지 여부
    pub fail_restart: bool,
    /// fetch_logs 호출 횟수
    pub fetch_calls: std::sync::atomic::AtomicUsize,
    /// restart_service 호출 횟수
    pub restart_calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl Default for MockEnvironmentClient {
    fn default() -> Self {
        Self {
            blob: String::new(),
            fail_fetch: false,
            fail_restart: false,
            fetch_calls: std::sync::atomic::AtomicUsize::new(0),
            restart_calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }
}

#[cfg(test)]
impl MockEnvironmentClient {
    /// 빈 블롭을 반환하는 mock 클라이언트를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// fetch_logs가 반환할 블롭을 설정합니다.
    pub fn with_logs(mut self, blob: impl Into<String>) -> Self {
        self.blob = blob.into();
        self
    }

    /// fetch 호출이 실패하도록 설정합니다.
    pub fn with_failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    /// restart 호출이 실패하도록 설정합니다.
    pub fn with_failing_restart(mut self) -> Self {
        self.fail_restart = true;
        self
    }

    /// restart_service 호출 횟수를 반환합니다.
    pub fn restart_count(&self) -> usize {
        self.restart_calls.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// fetch_logs 호출 횟수를 반환합니다.
    pub fn fetch_count(&self) -> usize {
        self.fetch_calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
impl EnvironmentClient for MockEnvironmentClient {
    async fn fetch_logs(
        &self,
        _environment_id: &str,
        _file_name: &str,
        _line_count: usize,
    ) -> Result<String, TransportError> {
        self.fetch_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.fail_fetch {
            return Err(TransportError::Request("mock fetch failure".to_owned()));
        }
        Ok(self.blob.clone())
    }

    async fn restart_service(
        &self,
        environment_id: &str,
    ) -> Result<RestartOutcome, TransportError> {
        self.restart_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.fail_restart {
            return Err(TransportError::Status {
                status: 503,
                reason: "mock restart failure".to_owned(),
            });
        }
        Ok(RestartOutcome {
            message: format!("restart scheduled for {environment_id}"),
            status_code: 202,
            operation_id: Some("op-mock-1".to_owned()),
        })
    }

    async fn ping(&self) -> Result<(), TransportError> {
        Ok(())
    }
}
