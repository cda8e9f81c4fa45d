//! Access-control vocabulary: token scopes and permission codes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What a bearer token may be used for.
///
/// A token minted for one scope never authenticates an operation that requires
/// another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scope {
    Authentication,
    Activation,
    PasswordReset,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::Activation => "activation",
            Self::PasswordReset => "password-reset",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown token scope: {0}")]
pub struct UnknownScope(pub String);

impl FromStr for Scope {
    type Err = UnknownScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "authentication" => Ok(Self::Authentication),
            "activation" => Ok(Self::Activation),
            "password-reset" => Ok(Self::PasswordReset),
            other => Err(UnknownScope(other.to_owned())),
        }
    }
}

/// Fine-grained capability code, e.g. `"clothes:write"`.
///
/// Codes are opaque strings; the mapping from roles to codes lives in the
/// `roles_permissions` table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(String);

impl Permission {
    pub const BRANDS_READ: &'static str = "brands:read";
    pub const BRANDS_WRITE: &'static str = "brands:write";
    pub const CLOTHES_READ: &'static str = "clothes:read";
    pub const CLOTHES_WRITE: &'static str = "clothes:write";
    pub const CARTS_READ: &'static str = "carts:read";

    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
