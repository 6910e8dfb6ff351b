//! Service error taxonomy.
//!
//! Errors are returned, never thrown: every boundary operation yields a
//! `Result<_, ServiceError>` and the orchestrators decide what to recover.
//! The status-to-category table in `ErrorCategory::from_status` is a fixed
//! contract, independent of any retry behavior.

use std::fmt;

/// What kind of failure occurred, and therefore who recovers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad input, caller's fault. Surfaced immediately, never recovered.
    Validation,
    /// Upstream said the resource does not exist (404-class).
    NotFound,
    /// Upstream is down or overloaded (503-class).
    ServiceUnavailable,
    /// Connectivity fault: DNS, refused connection, transport timeout.
    Network,
    /// Transport succeeded but the payload was malformed. Never retried.
    Parse,
    /// Everything else.
    General,
}

impl ErrorCategory {
    /// Fixed mapping from an upstream HTTP status to a category.
    ///
    /// 404 → NotFound, 503 → ServiceUnavailable, all other non-2xx →
    /// General. Success statuses never reach this function.
    pub fn from_status(status: u16) -> Self {
        match status {
            404 => Self::NotFound,
            503 => Self::ServiceUnavailable,
            _ => Self::General,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Validation => "validation",
            Self::NotFound => "not found",
            Self::ServiceUnavailable => "service unavailable",
            Self::Network => "network",
            Self::Parse => "parse",
            Self::General => "general",
        };
        write!(f, "{}", label)
    }
}

/// A classified failure from any boundary operation.
#[derive(Debug, Clone)]
pub struct ServiceError {
    pub category: ErrorCategory,
    pub message: String,
    /// Upstream HTTP status, when one was involved.
    pub status_code: Option<u16>,
}

impl ServiceError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            status_code: None,
        }
    }

    /// Build from an upstream HTTP status via the fixed mapping table.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            category: ErrorCategory::from_status(status),
            message: message.into(),
            status_code: Some(status),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Validation, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Network, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Parse, message)
    }

    pub fn general(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::General, message)
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "{} ({}): {}", self.category, code, self.message),
            None => write!(f, "{}: {}", self.category, self.message),
        }
    }
}

impl std::error::Error for ServiceError {}

/// Run a fallible closure inside a panic boundary.
///
/// A panic inside an orchestrator stage must degrade into that stage's
/// failure so the fallback chain keeps going. The stage boundary, not a
/// global handler, decides what happens next.
pub(crate) fn catch_boundary<T>(
    f: impl FnOnce() -> Result<T, ServiceError>,
) -> Result<T, ServiceError> {
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(panic) => {
            let detail = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "opaque panic".to_string());
            Err(ServiceError::general(format!("stage panicked: {}", detail)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping_not_found() {
        assert_eq!(ErrorCategory::from_status(404), ErrorCategory::NotFound);
    }

    #[test]
    fn test_status_mapping_service_unavailable() {
        assert_eq!(
            ErrorCategory::from_status(503),
            ErrorCategory::ServiceUnavailable
        );
    }

    #[test]
    fn test_status_mapping_other_non_2xx() {
        assert_eq!(ErrorCategory::from_status(400), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_status(418), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_status(500), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_status(502), ErrorCategory::General);
    }

    #[test]
    fn test_from_status_keeps_code() {
        let err = ServiceError::from_status(404, "no such cell");
        assert_eq!(err.category, ErrorCategory::NotFound);
        assert_eq!(err.status_code, Some(404));
    }

    #[test]
    fn test_display_with_and_without_status() {
        let with = ServiceError::from_status(503, "down");
        assert_eq!(format!("{}", with), "service unavailable (503): down");

        let without = ServiceError::validation("bad latitude");
        assert_eq!(format!("{}", without), "validation: bad latitude");
    }

    #[test]
    fn test_catch_boundary_passes_through() {
        let ok: Result<i32, ServiceError> = catch_boundary(|| Ok(7));
        assert_eq!(ok.unwrap(), 7);

        let err: Result<i32, ServiceError> =
            catch_boundary(|| Err(ServiceError::network("refused")));
        assert_eq!(err.unwrap_err().category, ErrorCategory::Network);
    }

    #[test]
    fn test_catch_boundary_contains_panic() {
        let err: Result<i32, ServiceError> = catch_boundary(|| panic!("adapter exploded"));
        let err = err.unwrap_err();
        assert_eq!(err.category, ErrorCategory::General);
        assert!(err.message.contains("adapter exploded"));
    }
}
