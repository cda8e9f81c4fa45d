//! `Authorization: Bearer <token>` header handling.

use http::HeaderMap;
use http::header::AUTHORIZATION;

/// Literal scheme expected in the `Authorization` header. Case-sensitive.
pub const BEARER_SCHEME: &str = "Bearer";

/// Why a request carried no usable bearer credential.
///
/// Both variants are surfaced identically to clients (401 with no reason).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BearerError {
    #[error("missing authorization header")]
    Missing,
    #[error("malformed authorization header")]
    Malformed,
}

/// Split a raw `Authorization` value into its token part.
///
/// The value must be exactly two parts separated by a single space, the first
/// being the literal `Bearer`. The token itself is not validated here.
///
/// ```
/// use atelier_auth_types::bearer::{BearerError, parse_bearer};
///
/// assert_eq!(parse_bearer(Some("Bearer abc")), Ok("abc"));
/// assert_eq!(parse_bearer(None), Err(BearerError::Missing));
/// assert_eq!(parse_bearer(Some("Basic abc")), Err(BearerError::Malformed));
/// ```
pub fn parse_bearer(value: Option<&str>) -> Result<&str, BearerError> {
    let value = value.ok_or(BearerError::Missing)?;
    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(BEARER_SCHEME), Some(token), None) => Ok(token),
        _ => Err(BearerError::Malformed),
    }
}

/// Read the raw `Authorization` value from request headers.
///
/// Non-UTF-8 bytes are replaced rather than dropped so that a garbled header
/// is reported as malformed, not as missing.
pub fn authorization_value(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
}

/// Build the header value a client sends for `token`.
pub fn bearer_value(token: &str) -> String {
    format!("{BEARER_SCHEME} {token}")
}
