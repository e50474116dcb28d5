use uuid::Uuid;

use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::RequestContext;

/// Signal that an account needs (re)notification with a verification link.
///
/// Emitted fire-and-forget by the service; the request completes before the
/// email is necessarily sent. When `token` is `None` the consumer issues a
/// fresh token itself (the registration path); otherwise it carries the
/// token value current at emission time.
#[derive(Debug, Clone)]
pub struct VerificationNeeded {
    pub account_id: AccountId,
    pub username: String,
    pub email: String,
    pub token: Option<Uuid>,
    pub callback_base_url: String,
    pub locale: String,
}

impl VerificationNeeded {
    /// Build a signal for a freshly registered account; the consumer will
    /// issue the token.
    pub fn for_registration(account: &Account, context: &RequestContext) -> Self {
        Self {
            account_id: account.id,
            username: account.username.to_string(),
            email: account.email.as_str().to_string(),
            token: None,
            callback_base_url: context.callback_base_url.clone(),
            locale: context.locale.clone(),
        }
    }

    /// Build a resend signal carrying an already-issued replacement token.
    pub fn for_replacement(account: &Account, token: Uuid, context: &RequestContext) -> Self {
        Self {
            account_id: account.id,
            username: account.username.to_string(),
            email: account.email.as_str().to_string(),
            token: Some(token),
            callback_base_url: context.callback_base_url.clone(),
            locale: context.locale.clone(),
        }
    }
}
