use thiserror::Error;

/// Error type for session token operations.
///
/// An expired token is not an error here; expiry is reported as a
/// [`Verification`](super::Verification) outcome so callers can treat
/// expired and invalid tokens differently.
#[derive(Debug, Clone, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is invalid: {0}")]
    InvalidToken(String),
}
