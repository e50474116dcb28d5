use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use auth::SignInError;
use chrono::Duration;
use chrono::Utc;
use uuid::Uuid;

use crate::account::errors::AccountError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::RegisterAccountCommand;
use crate::account::models::RequestContext;
use crate::account::models::Username;
use crate::account::models::VerificationToken;
use crate::account::notifications::VerificationNeeded;
use crate::account::ports::AccountServicePort;
use crate::account::ports::CredentialStore;
use crate::account::ports::VerificationNotifier;
use crate::account::ports::VerificationTokenStore;

/// Domain service implementation for account operations.
///
/// Composes the credential store, token store, password hasher, JWT codec
/// and notification channel into the register / verify / sign-in operations,
/// enforcing the account state machine along the way.
pub struct AccountService<CS, TS, VN>
where
    CS: CredentialStore,
    TS: VerificationTokenStore,
    VN: VerificationNotifier,
{
    credential_store: Arc<CS>,
    token_store: Arc<TS>,
    notifier: Arc<VN>,
    authenticator: Arc<Authenticator>,
    verification_period: Duration,
    session_period: Duration,
}

impl<CS, TS, VN> AccountService<CS, TS, VN>
where
    CS: CredentialStore,
    TS: VerificationTokenStore,
    VN: VerificationNotifier,
{
    /// Create a new account service with injected dependencies.
    ///
    /// # Arguments
    /// * `credential_store` - Account persistence implementation
    /// * `token_store` - Verification token persistence implementation
    /// * `notifier` - Outbound channel for verification signals
    /// * `authenticator` - Password hashing and session token handling
    /// * `verification_period` - How long verification tokens stay valid
    /// * `session_period` - How long session tokens stay valid
    pub fn new(
        credential_store: Arc<CS>,
        token_store: Arc<TS>,
        notifier: Arc<VN>,
        authenticator: Arc<Authenticator>,
        verification_period: Duration,
        session_period: Duration,
    ) -> Self {
        Self {
            credential_store,
            token_store,
            notifier,
            authenticator,
            verification_period,
            session_period,
        }
    }

    async fn account_for_token(
        &self,
        token: &VerificationToken,
    ) -> Result<Account, AccountError> {
        self.credential_store
            .find_by_id(&token.account_id)
            .await?
            .ok_or_else(|| {
                AccountError::Repository(format!(
                    "no account for verification token (account_id: {})",
                    token.account_id
                ))
            })
    }

    /// Replace the account's token and emit a resend signal carrying the
    /// fresh value.
    async fn rotate_token(
        &self,
        account: &Account,
        context: &RequestContext,
    ) -> Result<(), AccountError> {
        let replacement = VerificationToken::issue(account.id, self.verification_period);
        let replacement = self.token_store.upsert(replacement).await?;
        self.notifier.notify(VerificationNeeded::for_replacement(
            account,
            replacement.value,
            context,
        ));
        tracing::info!(
            account_id = %account.id,
            expires_at = %replacement.expires_at,
            "Replaced expired verification token"
        );
        Ok(())
    }
}

#[async_trait]
impl<CS, TS, VN> AccountServicePort for AccountService<CS, TS, VN>
where
    CS: CredentialStore,
    TS: VerificationTokenStore,
    VN: VerificationNotifier,
{
    async fn register(
        &self,
        command: RegisterAccountCommand,
        context: &RequestContext,
    ) -> Result<Account, AccountError> {
        // Two registrations racing on the same username slip past this
        // pre-check; the store's uniqueness constraint settles the race.
        if self
            .credential_store
            .find_by_username(&command.username)
            .await?
            .is_some()
        {
            return Err(AccountError::UserExists(command.username.to_string()));
        }

        let password_hash = self.authenticator.hash_password(command.password.as_str())?;
        let account = Account::register(command, password_hash);

        let account = self.credential_store.save(account).await?;

        self.notifier
            .notify(VerificationNeeded::for_registration(&account, context));

        tracing::info!(account_id = %account.id, username = %account.username, "Account registered");
        Ok(account)
    }

    async fn create_verification_token(
        &self,
        account_id: &AccountId,
    ) -> Result<VerificationToken, AccountError> {
        let account = self
            .credential_store
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| AccountError::NotFound(account_id.to_string()))?;

        let token = VerificationToken::issue(account.id, self.verification_period);
        self.token_store.upsert(token).await
    }

    async fn redeem_verification_token(
        &self,
        value: Uuid,
        context: &RequestContext,
    ) -> Result<(), AccountError> {
        let token = self
            .token_store
            .find_by_value(value)
            .await?
            .ok_or(AccountError::BadVerificationToken)?;

        let account = self.account_for_token(&token).await?;

        if token.is_expired_at(Utc::now()) {
            self.rotate_token(&account, context).await?;
            return Err(AccountError::ExpiredVerificationToken);
        }

        let mut account = account;
        account.enabled = true;
        // Saves the account and deletes the token in one transaction, so a
        // second redemption of the same value finds nothing.
        let account = self.credential_store.enable(account).await?;

        tracing::info!(account_id = %account.id, username = %account.username, "Account enabled");
        Ok(())
    }

    async fn authenticate(
        &self,
        username: &Username,
        password: &str,
        context: &RequestContext,
    ) -> Result<String, AccountError> {
        // Unknown username and wrong password are indistinguishable to the
        // caller, which prevents username enumeration.
        let account = self
            .credential_store
            .find_by_username(username)
            .await?
            .ok_or(AccountError::BadCredentials)?;

        let sign_in = self.authenticator.sign_in(
            &account.status(),
            password,
            &account.password_hash,
            account.username.as_str(),
            self.session_period,
        );

        match sign_in {
            Ok(jwt) => Ok(jwt),
            Err(SignInError::Disabled) => {
                // A disabled account with an expired token gets a fresh one
                // on sign-in attempts, not only on explicit verification.
                let token = self.token_store.find_by_account(&account.id).await?;
                match token {
                    Some(token) if token.is_expired_at(Utc::now()) => {
                        self.rotate_token(&account, context).await?;
                        Err(AccountError::ExpiredVerificationToken)
                    }
                    _ => Err(AccountError::Disabled),
                }
            }
            Err(SignInError::Locked) => Err(AccountError::Locked),
            Err(SignInError::BadCredentials) => Err(AccountError::BadCredentials),
            Err(SignInError::Password(e)) => Err(AccountError::Password(e)),
            Err(SignInError::Jwt(e)) => Err(AccountError::Jwt(e)),
        }
    }

    async fn get_account(&self, username: &Username) -> Result<Account, AccountError> {
        self.credential_store
            .find_by_username(username)
            .await?
            .ok_or_else(|| AccountError::NotFound(username.to_string()))
    }
}
