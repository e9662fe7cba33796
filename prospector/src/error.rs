use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// Failures that cross the search pipeline boundary.
///
/// Page level fetch failures never show up here, they are absorbed by the
/// fetcher and end pagination instead.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("Missing required field: {field}")]
    Validation { field: &'static str },

    #[error("Invalid API key")]
    Authorization,

    #[error("unexpected error during search: {0:?}")]
    Unexpected(#[from] anyhow::Error),
}

impl SearchError {
    /// Text that is safe to hand back to a caller.
    pub fn user_message(&self) -> String {
        match self {
            SearchError::Configuration(_) => "Search service is not configured".to_string(),
            SearchError::Validation { .. } | SearchError::Authorization => self.to_string(),
            SearchError::Unexpected(_) => "An unexpected error occurred".to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        ErrorBody {
            error: error.into(),
        }
    }
}

impl ResponseError for SearchError {
    fn status_code(&self) -> StatusCode {
        match self {
            SearchError::Configuration(_) | SearchError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            SearchError::Validation { .. } => StatusCode::BAD_REQUEST,
            SearchError::Authorization => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody::new(self.user_message()))
    }
}
