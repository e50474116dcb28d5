use async_trait::async_trait;
use uuid::Uuid;

use crate::account::errors::AccountError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::RegisterAccountCommand;
use crate::account::models::RequestContext;
use crate::account::models::Username;
use crate::account::models::VerificationToken;
use crate::account::notifications::VerificationNeeded;

/// Port for account domain service operations.
#[async_trait]
pub trait AccountServicePort: Send + Sync + 'static {
    /// Register a new, disabled account.
    ///
    /// Re-checks the one structural guarantee that needs a store round-trip
    /// (username uniqueness), hashes the password, persists the account, and
    /// emits a verification-needed signal.
    ///
    /// # Errors
    /// * `UserExists` - Username is already taken
    /// * `Repository` - Store operation failed
    async fn register(
        &self,
        command: RegisterAccountCommand,
        context: &RequestContext,
    ) -> Result<Account, AccountError>;

    /// Issue a verification token for an account, replacing any existing one.
    ///
    /// # Errors
    /// * `NotFound` - No account with this ID
    /// * `Repository` - Store operation failed
    async fn create_verification_token(
        &self,
        account_id: &AccountId,
    ) -> Result<VerificationToken, AccountError>;

    /// Redeem a verification token, enabling its account.
    ///
    /// An expired token is replaced by a fresh one and a resend signal is
    /// emitted before the failure is reported; the account stays disabled.
    ///
    /// # Errors
    /// * `BadVerificationToken` - Token value unknown (including already
    ///   consumed values)
    /// * `ExpiredVerificationToken` - Token found but stale; a replacement
    ///   has already been issued
    /// * `Repository` - Store operation failed
    async fn redeem_verification_token(
        &self,
        value: Uuid,
        context: &RequestContext,
    ) -> Result<(), AccountError>;

    /// Verify credentials and mint a session token.
    ///
    /// # Errors
    /// * `BadCredentials` - Wrong password or unknown username, deliberately
    ///   not distinguished
    /// * `Locked` - Account is locked
    /// * `Disabled` - Account unverified and its token still valid
    /// * `ExpiredVerificationToken` - Account unverified and its token
    ///   expired; a replacement has already been issued
    async fn authenticate(
        &self,
        username: &Username,
        password: &str,
        context: &RequestContext,
    ) -> Result<String, AccountError>;

    /// Retrieve an account by username.
    ///
    /// # Errors
    /// * `NotFound` - No account with this username
    /// * `Repository` - Store operation failed
    async fn get_account(&self, username: &Username) -> Result<Account, AccountError>;
}

/// Persistence operations for the account aggregate.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Retrieve an account by username.
    ///
    /// # Errors
    /// * `Repository` - Store operation failed
    async fn find_by_username(&self, username: &Username)
        -> Result<Option<Account>, AccountError>;

    /// Retrieve an account by identifier.
    ///
    /// # Errors
    /// * `Repository` - Store operation failed
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError>;

    /// Persist an account, incrementing its version.
    ///
    /// # Errors
    /// * `UserExists` - Username uniqueness violated
    /// * `Conflict` - The caller's version is stale
    /// * `Repository` - Store operation failed
    async fn save(&self, account: Account) -> Result<Account, AccountError>;

    /// Persist an enabled account and delete its verification token in the
    /// same transaction. No observer may see the account enabled with the
    /// token still present, or vice versa.
    ///
    /// # Errors
    /// * `Conflict` - The caller's version is stale
    /// * `Repository` - Store operation failed
    async fn enable(&self, account: Account) -> Result<Account, AccountError>;
}

/// Persistence operations for verification tokens.
#[async_trait]
pub trait VerificationTokenStore: Send + Sync + 'static {
    /// Retrieve a token by its opaque value.
    ///
    /// # Errors
    /// * `Repository` - Store operation failed
    async fn find_by_value(&self, value: Uuid)
        -> Result<Option<VerificationToken>, AccountError>;

    /// Retrieve the token of an account, if any.
    ///
    /// # Errors
    /// * `Repository` - Store operation failed
    async fn find_by_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<VerificationToken>, AccountError>;

    /// Insert a token, or overwrite the value and expiry of the account's
    /// existing one. At most one token per account exists at any time.
    ///
    /// # Errors
    /// * `Repository` - Store operation failed
    async fn upsert(&self, token: VerificationToken) -> Result<VerificationToken, AccountError>;

    /// Remove the token of an account, if any.
    ///
    /// # Errors
    /// * `Repository` - Store operation failed
    async fn delete_for_account(&self, account_id: &AccountId) -> Result<(), AccountError>;
}

/// Outbound channel for verification-needed signals.
///
/// Dispatch is fire-and-forget: implementations must not block the caller
/// and must swallow (but log) delivery failures.
pub trait VerificationNotifier: Send + Sync + 'static {
    fn notify(&self, signal: VerificationNeeded);
}
