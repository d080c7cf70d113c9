// src/models/response.rs

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Status classes exposed at the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    Success,
    BadRequest,
    NotFound,
    Fail,
}

impl From<StatusCode> for ResponseStatus {
    fn from(code: StatusCode) -> Self {
        match code {
            StatusCode::BAD_REQUEST => ResponseStatus::BadRequest,
            StatusCode::NOT_FOUND => ResponseStatus::NotFound,
            c if c.is_success() => ResponseStatus::Success,
            _ => ResponseStatus::Fail,
        }
    }
}

/// Uniform response body: `{status, message, data?}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: ResponseStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: "success".to_string(),
            data: Some(data),
        }
    }

    pub fn error(code: StatusCode, message: String) -> Self {
        Self {
            status: code.into(),
            message,
            data: None,
        }
    }
}

/// Wrapper used by the pipeline operations: `data = {result: ...}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResultPayload<T> {
    pub result: T,
}
