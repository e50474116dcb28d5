//! Authentication infrastructure library
//!
//! Provides the building blocks the account service composes at sign-in:
//! - Password hashing (Argon2id)
//! - Session token minting and verification (HS256 JWT)
//! - The sign-in decision over account status flags
//!
//! The service defines its own domain traits and adapts these implementations,
//! which keeps this crate free of any persistence or transport concern.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Session Tokens
//! ```
//! use auth::{JwtCodec, Verification};
//! use chrono::Duration;
//!
//! let codec = JwtCodec::new(b"secret_key_at_least_32_bytes_long!");
//! let token = codec.mint("alice", Duration::days(10)).unwrap();
//! match codec.verify(&token).unwrap() {
//!     Verification::Active { username } => assert_eq!(username, "alice"),
//!     Verification::Expired { .. } => unreachable!(),
//! }
//! ```
//!
//! ## Sign-in
//! ```
//! use auth::{AccountStatus, Authenticator};
//! use chrono::Duration;
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!");
//! let hash = auth.hash_password("password123").unwrap();
//!
//! let status = AccountStatus {
//!     enabled: true,
//!     ..AccountStatus::default()
//! };
//! let jwt = auth
//!     .sign_in(&status, "password123", &hash, "alice", Duration::days(10))
//!     .unwrap();
//! assert!(!jwt.is_empty());
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AccountStatus;
pub use authenticator::Authenticator;
pub use authenticator::SignInError;
pub use jwt::JwtCodec;
pub use jwt::JwtError;
pub use jwt::SessionClaims;
pub use jwt::Verification;
pub use password::PasswordError;
pub use password::PasswordHasher;
