//! HTTP error responses.
//!
//! Converts filedeck-core's typed errors (thiserror) into the JSON error
//! envelope the browser UI understands: `{"error":{"code":..,"msg":..}}`,
//! sent with the same HTTP status as `code`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use filedeck_core::FileDeckError;
use serde::Serialize;

#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    XsrfFailure,
    InvalidPath,
    NotADirectory,
    InvalidFolderName,
    NoFileUploaded,
    InvalidRequest,
    FileNotFound,
    ZipCreationFailed,
    PayloadTooLarge,
    /// Any other failure; the message is shown to the user.
    Internal(String),
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::XsrfFailure | Self::InvalidPath => StatusCode::FORBIDDEN,
            Self::NotADirectory => StatusCode::PRECONDITION_FAILED,
            Self::InvalidFolderName | Self::NoFileUploaded | Self::InvalidRequest => {
                StatusCode::BAD_REQUEST
            }
            Self::FileNotFound => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::ZipCreationFailed | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Unauthorized => "Unauthorized",
            Self::XsrfFailure => "XSRF Failure",
            Self::InvalidPath => "Invalid Path",
            Self::NotADirectory => "Not a Directory",
            Self::InvalidFolderName => "Invalid folder name",
            Self::NoFileUploaded => "No file uploaded",
            Self::InvalidRequest => "Invalid request",
            Self::FileNotFound => "File not found",
            Self::ZipCreationFailed => "Zip creation failed",
            Self::PayloadTooLarge => "File too large",
            Self::Internal(msg) => msg,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    code: u16,
    msg: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: ErrorDetail {
                code: status.as_u16(),
                msg: self.message(),
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<FileDeckError> for ApiError {
    fn from(err: FileDeckError) -> Self {
        match err {
            FileDeckError::InvalidPath { .. } | FileDeckError::ProtectedPath => Self::InvalidPath,
            FileDeckError::NotADirectory { .. } => Self::NotADirectory,
            FileDeckError::FileNotFound { .. } => Self::FileNotFound,
            FileDeckError::ArchiveCreationFailed { reason } => {
                tracing::error!(%reason, "zip creation failed");
                Self::ZipCreationFailed
            }
            FileDeckError::InvalidName { .. } => Self::InvalidFolderName,
            FileDeckError::PartialFailure { failures } => {
                let shown: Vec<String> = failures.iter().take(5).map(ToString::to_string).collect();
                Self::Internal(format!(
                    "Could not delete {} entries: {}",
                    failures.len(),
                    shown.join("; ")
                ))
            }
            FileDeckError::Io(io_err) => Self::Internal(io_err.to_string()),
        }
    }
}
