//! Resilient fetch: bounded retry with exponential backoff.
//!
//! Wraps one outbound request-like operation. Transient failures (5xx,
//! connectivity faults) are retried with `base_delay * 2^attempt` backoff;
//! client-side rejections and malformed payloads are terminal on the first
//! attempt. The engine is synchronous, so backoff is a plain sleep and the
//! per-attempt time budget rides the transport timeout of the operation
//! itself.

use crate::error::ServiceError;
use std::time::Duration;

/// How a single fetch attempt failed, before classification.
#[derive(Debug, Clone)]
pub enum FetchFailure {
    /// Non-2xx response from the upstream.
    Status { code: u16, message: String },
    /// Connectivity fault: DNS, refused connection, transport timeout.
    Network(String),
    /// 2xx response whose body could not be interpreted.
    Parse(String),
}

impl FetchFailure {
    /// Transient failures are worth another attempt; the rest are not.
    fn is_retryable(&self) -> bool {
        match self {
            Self::Status { code, .. } => (500..600).contains(code),
            Self::Network(_) => true,
            Self::Parse(_) => false,
        }
    }

    fn into_service_error(self) -> ServiceError {
        match self {
            Self::Status { code, message } => ServiceError::from_status(code, message),
            Self::Network(message) => ServiceError::network(message),
            Self::Parse(message) => ServiceError::parse(message),
        }
    }
}

/// Map a `ureq` failure into a `FetchFailure`.
///
/// Shared by every network-backed source adapter.
pub fn classify_transport(err: ureq::Error) -> FetchFailure {
    match err {
        ureq::Error::Status(code, response) => FetchFailure::Status {
            code,
            message: format!("{} from {}", code, response.get_url()),
        },
        ureq::Error::Transport(transport) => FetchFailure::Network(transport.to_string()),
    }
}

pub const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_BASE_DELAY_MS: u64 = 250;

/// Retry/backoff wrapper around a single outbound operation.
#[derive(Debug, Clone)]
pub struct Fetcher {
    max_retries: u32,
    base_delay: Duration,
}

impl Fetcher {
    pub fn new() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Override the backoff base (for testing).
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Execute `op` with bounded retry. Total attempts = 1 + max_retries.
    ///
    /// A success on any attempt returns immediately without consuming the
    /// remaining budget. Terminal failures (4xx, parse) return after the
    /// attempt that produced them.
    pub fn fetch<T>(
        &self,
        mut op: impl FnMut() -> Result<T, FetchFailure>,
    ) -> Result<T, ServiceError> {
        let mut last_failure: Option<FetchFailure> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.saturating_pow(attempt - 1);
                tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "backing off");
                std::thread::sleep(delay);
            }

            match op() {
                Ok(value) => return Ok(value),
                Err(failure) => {
                    if !failure.is_retryable() {
                        return Err(failure.into_service_error());
                    }
                    tracing::debug!(attempt, failure = ?failure, "transient fetch failure");
                    last_failure = Some(failure);
                }
            }
        }

        // All attempts exhausted on a retryable failure.
        Err(last_failure
            .map(FetchFailure::into_service_error)
            .unwrap_or_else(|| ServiceError::general("fetch exhausted with no attempts")))
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}
