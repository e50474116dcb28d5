use thiserror::Error;

/// Error for AccountId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("must not be empty")]
    Empty,

    #[error("must be at most {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error("must not contain whitespace")]
    ContainsWhitespace,
}

/// Single password-policy violation; registration reports all of them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordPolicyViolation {
    #[error("must be at least {min} characters")]
    TooShort { min: usize },

    #[error("must be at most {max} characters")]
    TooLong { max: usize },

    #[error("must contain at least one lowercase letter")]
    MissingLowercase,

    #[error("must contain at least one uppercase letter")]
    MissingUppercase,

    #[error("must contain at least one digit")]
    MissingDigit,

    #[error("must not contain whitespace")]
    ContainsWhitespace,
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("invalid email format: {0}")]
    InvalidFormat(String),

    #[error("must be between {min} and {max} characters")]
    InvalidLength { min: usize, max: usize },
}

/// Error for PersonName validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersonNameError {
    #[error("must not be blank")]
    Blank,

    #[error("must be at most {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error("must not start or end with whitespace")]
    SurroundingWhitespace,
}

/// Error for BirthDate validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BirthDateError {
    #[error("must be in the past")]
    NotInPast,
}

/// Top-level error for all account operations.
///
/// The first group is the recoverable taxonomy the boundary translates into
/// wire responses; the rest are value-object conversions and infrastructure
/// faults that surface as a generic server error.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("An account with username {0} already exists")]
    UserExists(String),

    #[error("Invalid credentials")]
    BadCredentials,

    #[error("Account is locked")]
    Locked,

    #[error("Account has not been verified yet")]
    Disabled,

    #[error("Unknown email verification token")]
    BadVerificationToken,

    #[error("Email verification token has expired")]
    ExpiredVerificationToken,

    #[error("Account not found: {0}")]
    NotFound(String),

    /// Optimistic-concurrency failure: the caller's version is stale.
    #[error("Concurrent modification detected: {0}")]
    Conflict(String),

    // Value object conversion errors (for rows read back from the store)
    #[error("Invalid account ID: {0}")]
    InvalidAccountId(#[from] AccountIdError),

    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid name: {0}")]
    InvalidPersonName(#[from] PersonNameError),

    #[error("Invalid birth date: {0}")]
    InvalidBirthDate(#[from] BirthDateError),

    // Infrastructure errors
    #[error("Password error: {0}")]
    Password(#[from] auth::PasswordError),

    #[error("Session token error: {0}")]
    Jwt(#[from] auth::JwtError),

    #[error("Store error: {0}")]
    Repository(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AccountError {
    fn from(err: anyhow::Error) -> Self {
        AccountError::Unknown(err.to_string())
    }
}
