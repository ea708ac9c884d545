use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::core::ErrorResponse;

/// Everything a request can fail with.
///
/// The display strings are what clients see; storage sources stay server-side.
#[derive(Error, Debug)]
pub enum TodoError {
    #[error("{0}")]
    InvalidBody(String),
    #[error("Todo item not found")]
    NotFound,
    #[error("Failed to add todo item to the database")]
    CreateFailed(#[source] anyhow::Error),
    #[error("Failed to retrieve todo items from the database")]
    ListFailed(#[source] anyhow::Error),
    #[error("Failed to update todo item")]
    UpdateFailed(#[source] anyhow::Error),
    #[error("Failed to delete todo item")]
    DeleteFailed(#[source] anyhow::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TodoError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            TodoError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            TodoError::NotFound => StatusCode::NOT_FOUND,
            TodoError::CreateFailed(_)
            | TodoError::ListFailed(_)
            | TodoError::UpdateFailed(_)
            | TodoError::DeleteFailed(_)
            | TodoError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TodoError {
    fn into_response(self) -> Response {
        #[cfg(feature = "tracing")]
        {
            if let Some(source) = std::error::Error::source(&self) {
                tracing::error!(error = %self, source = %source, "request failed in storage");
            }
        }
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
