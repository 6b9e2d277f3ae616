use axum::http::HeaderMap;
use subtle::ConstantTimeEq;

use crate::error::ApiError;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Checks `X-API-Key` against the configured secret. Both must be non-empty
/// and byte-equal; an unset secret rejects every request.
pub fn authorize(headers: &HeaderMap, expected: &str) -> Result<(), ApiError> {
    let presented = headers
        .get(API_KEY_HEADER)
        .map(|value| value.as_bytes())
        .unwrap_or_default();

    if keys_match(presented, expected.as_bytes()) {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}

fn keys_match(presented: &[u8], expected: &[u8]) -> bool {
    if presented.is_empty() || expected.is_empty() {
        return false;
    }
    presented.ct_eq(expected).into()
}
