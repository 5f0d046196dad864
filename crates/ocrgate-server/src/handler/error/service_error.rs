//! Service error to HTTP error conversion implementation.

use super::http_error::{Error as HttpError, ErrorKind};

/// Tracing target for service error conversions.
const TRACING_TARGET: &str = "ocrgate_server::handler::service";

impl From<crate::Error> for HttpError<'static> {
    fn from(error: crate::Error) -> Self {
        use crate::ErrorKind as ServiceErrorKind;

        match error.kind() {
            ServiceErrorKind::FileSystem => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    "file system operation failed"
                );
                ErrorKind::StorageFailure
                    .with_message(format!("file processing failed: {}", error.message()))
            }
            ServiceErrorKind::External => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    "ocr engine request failed"
                );
                ErrorKind::OcrFailure
                    .with_message(format!("ocr recognition failed: {}", error.message()))
            }
            ServiceErrorKind::Config | ServiceErrorKind::Internal => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    error_kind = %error.kind(),
                    "service operation failed"
                );
                ErrorKind::InternalServerError.with_context(error.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_system_errors_are_storage_failures() {
        let error = HttpError::from(crate::Error::file_system("disk full"));
        assert_eq!(error.kind(), ErrorKind::StorageFailure);
        assert_eq!(error.message(), Some("file processing failed: disk full"));
    }

    #[test]
    fn external_errors_are_ocr_failures() {
        let error = HttpError::from(crate::Error::external("paddlex", "timeout"));
        assert_eq!(error.kind(), ErrorKind::OcrFailure);
        assert_eq!(error.message(), Some("ocr recognition failed: paddlex: timeout"));
    }

    #[test]
    fn internal_errors_hide_details() {
        let error = HttpError::from(crate::Error::internal("engine", "limiter closed"));
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert_eq!(error.message(), None);
        assert!(error.context().is_some_and(|c| c.contains("limiter closed")));
    }
}
