//! Crate-level error types for `delegate-kernel`.
//!
//! Device queries fail with a [`SourceError`] carrying whatever code and
//! message the accelerator API produced. Enumeration wraps it in an
//! [`error_stack::Report<EnumerationError>`] and attaches the operation
//! that failed, so the final report reads like
//! `"Getting 1th device's name"` on top of the source failure.
//!
//! ```rust,ignore
//! use delegate_kernel::error::{EnumerationError, EnumerationResult};
//! use error_stack::ResultExt;
//!
//! fn count(source: &impl DeviceSource) -> EnumerationResult<u32> {
//!     source
//!         .device_count()
//!         .map_err(EnumerationError::from)
//!         .map_err(error_stack::Report::new)
//!         .attach("Getting count of available devices")
//! }
//! ```

use thiserror::Error;

/// Failure reported by an accelerator API query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("device query failed with code {code}: {message}")]
pub struct SourceError {
    /// Implementation-defined status code
    pub code: i32,
    pub message: String,
}

impl SourceError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Errors raised while enumerating target devices.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum EnumerationError {
    /// A query against the accelerator API failed
    #[error("accelerator query failed: {0}")]
    Query(#[from] SourceError),
}

impl EnumerationError {
    /// Status code of the underlying query failure, if any.
    pub fn code(&self) -> Option<i32> {
        match self {
            EnumerationError::Query(err) => Some(err.code),
        }
    }
}

/// Convenience result alias using [`error_stack::Report`].
pub type EnumerationResult<T> = Result<T, error_stack::Report<EnumerationError>>;

#[cfg(test)]
mod tests {
    use super::*;
    use error_stack::{Report, ResultExt};

    #[test]
    fn source_error_display() {
        let err = SourceError::new(4, "bad state");
        assert_eq!(err.to_string(), "device query failed with code 4: bad state");
    }

    #[test]
    fn source_error_converts_via_from() {
        let err: EnumerationError = SourceError::new(3, "unavailable").into();
        assert!(matches!(err, EnumerationError::Query(_)));
        assert_eq!(err.code(), Some(3));
        assert!(err.to_string().contains("unavailable"));
    }

    #[test]
    fn report_carries_operation() {
        let result: EnumerationResult<()> =
            Err(Report::new(EnumerationError::from(SourceError::new(1, "root cause"))))
                .attach("Getting 1th device's name");

        let report = result.unwrap_err();
        let display = format!("{report:?}");

        assert!(display.contains("root cause"));
        assert!(display.contains("Getting 1th device's name"));
    }
}
