use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::ApiError;

pub const ALLOWED_METHODS: &str = "GET,POST,PUT,OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type,Authorization,X-API-Key";

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, detail = self.detail().unwrap_or_default(), "Request failed");
        }
        let body = ErrorBody {
            error: self.to_string(),
            detail: self.detail().map(str::to_string),
        };
        (status, Json(body)).into_response()
    }
}

pub fn ok<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

pub fn created<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Reply to `OPTIONS`: status 200, no body; CORS headers are added by
/// [`apply_cors`] like on every other response.
pub fn preflight() -> Response {
    StatusCode::OK.into_response()
}

pub fn apply_cors(headers: &mut HeaderMap, origin: &str) {
    let origin =
        HeaderValue::from_str(origin).unwrap_or_else(|_| HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_headers_echo_the_origin() {
        let mut headers = HeaderMap::new();
        apply_cors(&mut headers, "https://plans.example");
        assert_eq!(
            headers[ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://plans.example"
        );
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], ALLOWED_METHODS);
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_HEADERS], ALLOWED_HEADERS);
    }

    #[test]
    fn unencodable_origin_degrades_to_wildcard() {
        let mut headers = HeaderMap::new();
        apply_cors(&mut headers, "bad\norigin");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[test]
    fn error_status_comes_from_the_variant() {
        assert_eq!(
            ApiError::NoFieldsToUpdate.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal("x".to_string()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(preflight().status(), StatusCode::OK);
    }
}
