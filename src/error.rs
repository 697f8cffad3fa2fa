//! Error types for the EPUB server

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::archive::ArchiveError;
use crate::html::RewriteError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
///
/// Every failure is turned into a whole response at the request boundary;
/// nothing is written before the outcome is known.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed archive: {0}")]
    MalformedArchive(String),

    #[error("Package root not found: {0}")]
    PackageRootNotFound(String),

    #[error("Listing denied: {0}")]
    ListingDenied(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ArchiveError> for AppError {
    fn from(err: ArchiveError) -> Self {
        match err {
            ArchiveError::ArchiveMissing => AppError::NotFound(err.to_string()),
            ArchiveError::EntryNotFound(_) => AppError::NotFound(err.to_string()),
            ArchiveError::Malformed(msg) => AppError::MalformedArchive(msg),
            ArchiveError::PackageRootNotFound => AppError::PackageRootNotFound(err.to_string()),
            ArchiveError::Io(e) => AppError::Io(e),
        }
    }
}

impl From<RewriteError> for AppError {
    fn from(err: RewriteError) -> Self {
        AppError::Processing(err.to_string())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MalformedArchive(_) => StatusCode::BAD_REQUEST,
            AppError::ListingDenied(_) => StatusCode::FORBIDDEN,
            AppError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => StatusCode::NOT_FOUND,
            AppError::PackageRootNotFound(_) | AppError::Processing(_) | AppError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::NotFound(msg) => {
                tracing::debug!("Not found: {}", msg);
                msg.clone()
            }
            AppError::MalformedArchive(msg) => {
                tracing::debug!("Malformed archive: {}", msg);
                "Not a valid EPUB file".to_string()
            }
            AppError::ListingDenied(msg) => {
                tracing::debug!("Listing denied: {}", msg);
                "Unable to list directory".to_string()
            }
            AppError::PackageRootNotFound(msg) => {
                tracing::error!("Package root not found: {}", msg);
                msg.clone()
            }
            AppError::Processing(msg) => {
                tracing::error!("Processing error: {}", msg);
                msg.clone()
            }
            AppError::Io(e) if status == StatusCode::NOT_FOUND => {
                tracing::debug!("IO not found: {}", e);
                "File not found".to_string()
            }
            AppError::Io(e) => {
                tracing::error!("IO error: {}", e);
                "IO error".to_string()
            }
        };

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            message,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_error_mapping() {
        let cases = [
            (ArchiveError::ArchiveMissing, StatusCode::NOT_FOUND),
            (ArchiveError::EntryNotFound("a.xhtml".into()), StatusCode::NOT_FOUND),
            (ArchiveError::Malformed("bad".into()), StatusCode::BAD_REQUEST),
            (ArchiveError::PackageRootNotFound, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[test]
    fn test_io_not_found_is_404() {
        let err = AppError::from(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = AppError::from(std::io::Error::from(std::io::ErrorKind::Other));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_listing_denied_is_403() {
        let response = AppError::ListingDenied("/secret".into()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
