use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::SessionClaims;
use super::errors::JwtError;

/// Outcome of verifying a structurally valid, correctly signed token.
///
/// Callers decide how to react: an `Expired` bearer is treated as anonymous
/// by the lax middleware, while an invalid signature surfaces as [`JwtError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Active { username: String },
    Expired { username: String },
}

/// Signs and verifies compact session tokens.
///
/// Uses HS256 with a secret loaded once at process start; verification is
/// purely computational and needs no shared mutable state.
pub struct JwtCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl JwtCodec {
    /// Create a codec from server-held secret key material.
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Mint a compact signed token for a username.
    ///
    /// Claims are `{sub: username, exp: now + validity}`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn mint(&self, username: &str, validity: Duration) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);
        let claims = SessionClaims::for_subject(username, validity);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Verify a token's signature, then read its expiration.
    ///
    /// Signature is checked first; only then is `exp` compared against the
    /// clock, so an expired-but-authentic token still yields its subject.
    ///
    /// # Errors
    /// * `InvalidToken` - Malformed token or signature mismatch
    pub fn verify(&self, token: &str) -> Result<Verification, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is reported as an outcome, not rejected during decoding
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["sub", "exp"]);

        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

        let claims = token_data.claims;
        if claims.is_expired_at(Utc::now().timestamp()) {
            Ok(Verification::Expired {
                username: claims.sub,
            })
        } else {
            Ok(Verification::Active {
                username: claims.sub,
            })
        }
    }
}
