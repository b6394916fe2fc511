use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

pub type AppResult<T> = Result<T, AppError>;

/// Error returned by handlers.
/// The message is what the client sees, the error is what gets logged.
pub struct AppError {
    status: StatusCode,
    message: &'static str,
    error: anyhow::Error,
}

impl AppError {
    pub fn new(status: StatusCode, message: &'static str, error: impl Into<anyhow::Error>) -> Self {
        Self {
            status,
            message,
            error: error.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, "Error: {:#}", self.error);
        } else {
            warn!(status = %self.status, "Rejected: {:#}", self.error);
        }
        (self.status, self.message).into_response()
    }
}
