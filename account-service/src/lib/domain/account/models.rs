use std::fmt;
use std::str::FromStr;

use auth::AccountStatus;
use chrono::DateTime;
use chrono::Duration;
use chrono::NaiveDate;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::account::errors::AccountIdError;
use crate::account::errors::BirthDateError;
use crate::account::errors::EmailError;
use crate::account::errors::PasswordPolicyViolation;
use crate::account::errors::PersonNameError;
use crate::account::errors::UsernameError;

/// Account aggregate entity.
///
/// Created disabled by registration; enabled exactly once by a successful
/// verification-token redemption. The remaining status flags are written by
/// collaborators outside this service and only read here.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub username: Username,
    pub password_hash: String,
    pub email: EmailAddress,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub birth_date: BirthDate,
    pub gender: Gender,
    pub enabled: bool,
    pub locked: bool,
    pub account_expired: bool,
    pub credentials_expired: bool,
    /// Optimistic-concurrency counter, incremented by the store on each save.
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Build a fresh, disabled account from a registration command.
    ///
    /// # Arguments
    /// * `command` - Validated registration data
    /// * `password_hash` - Already-hashed password (never the raw secret)
    pub fn register(command: RegisterAccountCommand, password_hash: String) -> Self {
        Self {
            id: AccountId::new(),
            username: command.username,
            password_hash,
            email: command.email,
            first_name: command.first_name,
            last_name: command.last_name,
            birth_date: command.birth_date,
            gender: command.gender,
            enabled: false,
            locked: false,
            account_expired: false,
            credentials_expired: false,
            version: 0,
            created_at: Utc::now(),
        }
    }

    /// Snapshot of the flags the sign-in decision consumes.
    pub fn status(&self) -> AccountStatus {
        AccountStatus {
            enabled: self.enabled,
            locked: self.locked,
            account_expired: self.account_expired,
            credentials_expired: self.credentials_expired,
        }
    }
}

/// Account unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Generate a new random account ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an account ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, AccountIdError> {
        Uuid::parse_str(s)
            .map(AccountId)
            .map_err(|e| AccountIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Ensures the username is 1-50 characters with no whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    const MAX_LENGTH: usize = 50;

    /// Create a new valid username.
    ///
    /// # Errors
    /// * `Empty` - Username has no characters
    /// * `TooLong` - Username longer than 50 characters
    /// * `ContainsWhitespace` - Username contains whitespace
    pub fn new(username: String) -> Result<Self, UsernameError> {
        if username.is_empty() {
            return Err(UsernameError::Empty);
        }
        let length = username.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }
        if username.chars().any(char::is_whitespace) {
            return Err(UsernameError::ContainsWhitespace);
        }
        Ok(Self(username))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Raw password accepted at registration, validated against the password
/// policy before it is ever hashed. The plaintext never leaves the service
/// and is not printed by the `Debug` implementation.
#[derive(Clone)]
pub struct RawPassword(String);

impl RawPassword {
    const MIN_LENGTH: usize = 8;
    const MAX_LENGTH: usize = 255;

    /// Validate a candidate password against the policy.
    ///
    /// All violations are collected so the caller can report every problem
    /// at once rather than the first one found.
    pub fn new(password: String) -> Result<Self, Vec<PasswordPolicyViolation>> {
        let mut violations = Vec::new();
        let length = password.chars().count();
        if length < Self::MIN_LENGTH {
            violations.push(PasswordPolicyViolation::TooShort {
                min: Self::MIN_LENGTH,
            });
        }
        if length > Self::MAX_LENGTH {
            violations.push(PasswordPolicyViolation::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if !password.chars().any(|c| c.is_ascii_lowercase()) {
            violations.push(PasswordPolicyViolation::MissingLowercase);
        }
        if !password.chars().any(|c| c.is_ascii_uppercase()) {
            violations.push(PasswordPolicyViolation::MissingUppercase);
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            violations.push(PasswordPolicyViolation::MissingDigit);
        }
        if password.chars().any(char::is_whitespace) {
            violations.push(PasswordPolicyViolation::ContainsWhitespace);
        }
        if violations.is_empty() {
            Ok(Self(password))
        } else {
            Err(violations)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RawPassword(..)")
    }
}

/// Email address type
///
/// Validates format using an RFC 5322 compliant parser plus length bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    const MIN_LENGTH: usize = 6;
    const MAX_LENGTH: usize = 255;

    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    /// * `InvalidLength` - Email outside the 6-255 character range
    pub fn new(email: String) -> Result<Self, EmailError> {
        let length = email.chars().count();
        if !(Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&length) {
            return Err(EmailError::InvalidLength {
                min: Self::MIN_LENGTH,
                max: Self::MAX_LENGTH,
            });
        }
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Person name value type (first or last name).
///
/// 1-100 characters, no leading or trailing whitespace, not blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName(String);

impl PersonName {
    const MAX_LENGTH: usize = 100;

    /// Create a new validated person name.
    ///
    /// # Errors
    /// * `Blank` - Name is empty or only whitespace
    /// * `TooLong` - Name longer than 100 characters
    /// * `SurroundingWhitespace` - Name starts or ends with whitespace
    pub fn new(name: String) -> Result<Self, PersonNameError> {
        if name.trim().is_empty() {
            return Err(PersonNameError::Blank);
        }
        let length = name.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(PersonNameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }
        if name.trim() != name {
            return Err(PersonNameError::SurroundingWhitespace);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Birth date value type, strictly in the past.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BirthDate(NaiveDate);

impl BirthDate {
    /// Create a validated birth date.
    ///
    /// # Errors
    /// * `NotInPast` - Date is today or later
    pub fn new(date: NaiveDate) -> Result<Self, BirthDateError> {
        if date >= Utc::now().date_naive() {
            return Err(BirthDateError::NotInPast);
        }
        Ok(Self(date))
    }

    pub fn as_date(&self) -> NaiveDate {
        self.0
    }
}

/// Gender as declared at registration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    #[default]
    Unspecified,
    Female,
    Male,
}

/// One-per-account opaque verification token.
///
/// The value is an unguessable 128-bit random identifier rendered as a UUID.
/// Redemption after expiry never reuses the old value; a replacement token
/// with a fresh value and expiry is issued instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationToken {
    pub value: Uuid,
    pub account_id: AccountId,
    pub expires_at: DateTime<Utc>,
}

impl VerificationToken {
    /// Issue a token for an account, expiring after the given period.
    ///
    /// The value comes from a cryptographically secure random source.
    pub fn issue(account_id: AccountId, validity: Duration) -> Self {
        Self {
            value: Uuid::new_v4(),
            account_id,
            expires_at: Utc::now() + validity,
        }
    }

    /// Whether the token is expired at the given instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Command to register a new account with domain types.
///
/// Structural validation happens at the boundary while building this
/// command; the service itself re-checks only username uniqueness, the one
/// guarantee that needs a store round-trip.
#[derive(Debug)]
pub struct RegisterAccountCommand {
    pub username: Username,
    pub email: EmailAddress,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub birth_date: BirthDate,
    pub gender: Gender,
    pub password: RawPassword,
}

/// Request-scoped context forwarded with operations that may emit a
/// verification-needed signal: where the emailed callback link should point
/// and which locale the notification should use.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub callback_base_url: String,
    pub locale: String,
}
