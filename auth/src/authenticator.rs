use chrono::Duration;

use crate::jwt::JwtCodec;
use crate::jwt::JwtError;
use crate::jwt::Verification;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Status flags consulted by the sign-in decision.
///
/// A plain value instead of a polymorphic user-details object; the decision
/// over it is a pure function of these flags and the password check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountStatus {
    pub enabled: bool,
    pub locked: bool,
    pub account_expired: bool,
    pub credentials_expired: bool,
}

/// Sign-in failures.
///
/// An expired account or expired credentials surface as `BadCredentials`,
/// indistinguishable from a wrong password, so callers cannot probe account
/// state. `Disabled` is distinct because the service reacts to it by
/// checking the verification token.
#[derive(Debug, thiserror::Error)]
pub enum SignInError {
    #[error("Invalid credentials")]
    BadCredentials,

    #[error("Account is locked")]
    Locked,

    #[error("Account is not enabled")]
    Disabled,

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("JWT error: {0}")]
    Jwt(#[from] JwtError),
}

/// Combines password verification, the status decision, and token minting.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    codec: JwtCodec,
}

/// Pure sign-in decision over account status flags.
///
/// Check order mirrors the usual pre/post split: locked and disabled are
/// reported before the password is even considered, expiry flags fold into
/// `BadCredentials` afterwards.
pub fn check_account_status(status: &AccountStatus) -> Result<(), SignInError> {
    if status.locked {
        return Err(SignInError::Locked);
    }
    if !status.enabled {
        return Err(SignInError::Disabled);
    }
    if status.account_expired {
        return Err(SignInError::BadCredentials);
    }
    Ok(())
}

impl Authenticator {
    /// Create a new authenticator from JWT secret key material.
    pub fn new(jwt_secret: &[u8]) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            codec: JwtCodec::new(jwt_secret),
        }
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Run the full sign-in decision and mint a session token on success.
    ///
    /// # Arguments
    /// * `status` - Account status flags
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `username` - Token subject on success
    /// * `validity` - Session token validity window
    ///
    /// # Errors
    /// * `Locked` - Account is locked
    /// * `Disabled` - Account has not been verified yet
    /// * `BadCredentials` - Wrong password or expired account/credentials
    /// * `Password` / `Jwt` - Infrastructure failure
    pub fn sign_in(
        &self,
        status: &AccountStatus,
        password: &str,
        stored_hash: &str,
        username: &str,
        validity: Duration,
    ) -> Result<String, SignInError> {
        check_account_status(status)?;

        let password_matches = self.password_hasher.verify(password, stored_hash)?;
        if !password_matches {
            return Err(SignInError::BadCredentials);
        }

        if status.credentials_expired {
            return Err(SignInError::BadCredentials);
        }

        Ok(self.codec.mint(username, validity)?)
    }

    /// Verify a session token.
    ///
    /// # Errors
    /// * `JwtError` - Malformed token or signature mismatch
    pub fn verify_session(&self, token: &str) -> Result<Verification, JwtError> {
        self.codec.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    fn enabled_status() -> AccountStatus {
        AccountStatus {
            enabled: true,
            ..AccountStatus::default()
        }
    }

    #[test]
    fn test_sign_in_success() {
        let authenticator = Authenticator::new(SECRET);

        let password = "my_password";
        let hash = authenticator
            .hash_password(password)
            .expect("Failed to hash password");

        let token = authenticator
            .sign_in(&enabled_status(), password, &hash, "alice", Duration::days(10))
            .expect("Sign-in failed");
        assert!(!token.is_empty());

        let verification = authenticator
            .verify_session(&token)
            .expect("Token verification failed");
        assert_eq!(
            verification,
            Verification::Active {
                username: "alice".to_string()
            }
        );
    }

    #[test]
    fn test_sign_in_wrong_password() {
        let authenticator = Authenticator::new(SECRET);

        let hash = authenticator
            .hash_password("my_password")
            .expect("Failed to hash password");

        let result = authenticator.sign_in(
            &enabled_status(),
            "wrong_password",
            &hash,
            "alice",
            Duration::days(10),
        );
        assert!(matches!(result, Err(SignInError::BadCredentials)));
    }

    #[test]
    fn test_sign_in_locked_account() {
        let authenticator = Authenticator::new(SECRET);

        let hash = authenticator
            .hash_password("my_password")
            .expect("Failed to hash password");

        let status = AccountStatus {
            enabled: true,
            locked: true,
            ..AccountStatus::default()
        };
        let result =
            authenticator.sign_in(&status, "my_password", &hash, "alice", Duration::days(10));
        assert!(matches!(result, Err(SignInError::Locked)));
    }

    #[test]
    fn test_sign_in_disabled_account() {
        let authenticator = Authenticator::new(SECRET);

        let hash = authenticator
            .hash_password("my_password")
            .expect("Failed to hash password");

        let result = authenticator.sign_in(
            &AccountStatus::default(),
            "my_password",
            &hash,
            "alice",
            Duration::days(10),
        );
        assert!(matches!(result, Err(SignInError::Disabled)));
    }

    #[test]
    fn test_locked_takes_precedence_over_disabled() {
        let status = AccountStatus {
            enabled: false,
            locked: true,
            ..AccountStatus::default()
        };
        assert!(matches!(
            check_account_status(&status),
            Err(SignInError::Locked)
        ));
    }

    #[test]
    fn test_expired_flags_fold_into_bad_credentials() {
        let authenticator = Authenticator::new(SECRET);

        let hash = authenticator
            .hash_password("my_password")
            .expect("Failed to hash password");

        let account_expired = AccountStatus {
            enabled: true,
            account_expired: true,
            ..AccountStatus::default()
        };
        assert!(matches!(
            authenticator.sign_in(
                &account_expired,
                "my_password",
                &hash,
                "alice",
                Duration::days(10)
            ),
            Err(SignInError::BadCredentials)
        ));

        let credentials_expired = AccountStatus {
            enabled: true,
            credentials_expired: true,
            ..AccountStatus::default()
        };
        assert!(matches!(
            authenticator.sign_in(
                &credentials_expired,
                "my_password",
                &hash,
                "alice",
                Duration::days(10)
            ),
            Err(SignInError::BadCredentials)
        ));
    }
}
