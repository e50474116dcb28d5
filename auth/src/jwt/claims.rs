use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Claim set carried by a session token.
///
/// Deliberately minimal: the subject username and an expiration timestamp.
/// The token proves identity by signature alone, so no server-side session
/// state exists for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// Subject (username)
    pub sub: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl SessionClaims {
    /// Create claims for a username expiring after the given validity window.
    pub fn for_subject(username: impl Into<String>, validity: Duration) -> Self {
        Self {
            sub: username.into(),
            exp: (Utc::now() + validity).timestamp(),
        }
    }

    /// Whether the claims are expired at the given Unix timestamp.
    ///
    /// A token is valid strictly before its expiration instant.
    pub fn is_expired_at(&self, timestamp: i64) -> bool {
        self.exp <= timestamp
    }
}
