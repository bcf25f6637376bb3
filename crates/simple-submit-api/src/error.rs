//! Error types for the API server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use simple_submit_core::SubmitRulesError;
use thiserror::Error;

/// Errors raised while starting the server
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("CONFIG/{0}")]
    Config(String),

    #[error("IO/{0}")]
    Io(#[from] std::io::Error),

    #[error("METRICS/{0}")]
    Metrics(#[from] prometheus::Error),
}

/// A request failure, rendered as a JSON error body
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub SubmitRulesError);

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            SubmitRulesError::BadRequest(_) => StatusCode::BAD_REQUEST,
            SubmitRulesError::Auth(_) => StatusCode::FORBIDDEN,
            SubmitRulesError::NotFound(_) => StatusCode::NOT_FOUND,
            SubmitRulesError::Conflict(_) => StatusCode::CONFLICT,
            SubmitRulesError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: self.0.message().to_string(),
            code: self.0.code().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
