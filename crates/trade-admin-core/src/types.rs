//! Identity and credential types shared by the session layer and the console

use serde::{Deserialize, Serialize};
use std::fmt;

/// The authenticated staff member as reported by the login endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    /// Backend user identifier
    #[serde(alias = "_id")]
    pub id: String,

    /// Display name
    pub name: String,

    /// Login email
    pub email: String,

    /// Role string (`admin`, `user`, ...)
    #[serde(default)]
    pub role: String,
}

impl Identity {
    /// Whether the backend reported an administrator role
    pub fn is_admin(&self) -> bool {
        self.role.eq_ignore_ascii_case("admin")
    }
}

/// Login credentials: identifier plus secret
#[derive(Clone, Serialize, PartialEq, Eq)]
pub struct Credentials {
    /// Account identifier (email)
    #[serde(rename = "email")]
    pub identifier: String,

    /// Account secret
    #[serde(rename = "password")]
    pub secret: String,
}

impl Credentials {
    /// Create a new credential pair
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Opaque bearer credential issued at login
///
/// The raw value is only reachable through [`BearerToken::expose`]; `Debug` and
/// `Display` print a short fingerprint so tokens never end up in logs.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wrap a raw token value
    ///
    /// Surrounding whitespace is trimmed. Returns `None` for empty values and
    /// for values with anything but visible ASCII left, since those cannot be
    /// sent in an `Authorization` header.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_graphic()) {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The raw token, for the `Authorization` header and durable storage
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Header value in `Bearer <token>` form
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.0)
    }

    /// Short non-reversible label for log lines
    pub fn fingerprint(&self) -> String {
        let tail: String = self
            .0
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("…{tail} ({} chars)", self.0.chars().count())
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BearerToken({})", self.fingerprint())
    }
}

impl fmt::Display for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fingerprint())
    }
}
