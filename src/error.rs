use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("store error: {0}")]
    Store(String),
    #[error("runtime error: {0}")]
    Runtime(String),
}

pub use crate::Result;

/// Failures surfaced to HTTP callers. The `Display` text is the `error` field
/// of the response envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("{0}")]
    MissingField(&'static str),
    #[error("invalid value for {column}")]
    InvalidField { column: &'static str, detail: String },
    #[error("invalid json body")]
    InvalidBody(String),
    #[error("no fields to update")]
    NoFieldsToUpdate,
    #[error("route not found")]
    RouteNotFound,
    #[error("not found")]
    RowNotFound,
    #[error("internal")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::MissingField(_)
            | Self::InvalidField { .. }
            | Self::InvalidBody(_)
            | Self::NoFieldsToUpdate => StatusCode::BAD_REQUEST,
            Self::RouteNotFound | Self::RowNotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::InvalidField { detail, .. } => Some(detail),
            Self::InvalidBody(detail) | Self::Internal(detail) => Some(detail),
            _ => None,
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Store(message) | GatewayError::Runtime(message) => {
                Self::Internal(message)
            }
            other => Self::Internal(other.to_string()),
        }
    }
}
