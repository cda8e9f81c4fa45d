//! Bearer header helpers for integration tests.

use atelier_auth_types::bearer::bearer_value;
use http::{HeaderMap, HeaderValue, header::AUTHORIZATION};

/// A bearer token presented by a test client.
pub struct BearerAuth {
    pub token: String,
}

impl BearerAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// The full `Authorization` header value, `Bearer <token>`.
    pub fn value(&self) -> String {
        bearer_value(&self.token)
    }

    /// Headers as a client would send them.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(AUTHORIZATION, HeaderValue::from_str(&self.value()).unwrap());
        map
    }
}

/// Headers carrying an arbitrary raw `Authorization` value, for malformed-header cases.
pub fn raw_authorization(value: &str) -> HeaderMap {
    let mut map = HeaderMap::new();
    map.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    map
}
