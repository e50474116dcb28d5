use std::sync::Arc;

use tokio::sync::mpsc;
use uuid::Uuid;

use super::mailer::VerificationMailer;
use crate::account::notifications::VerificationNeeded;
use crate::account::ports::AccountServicePort;

/// Consume verification signals until every sender is gone.
///
/// Each signal is handled independently; a failure is logged and the worker
/// moves on, since the triggering request already succeeded.
pub async fn run_verification_worker(
    mut receiver: mpsc::UnboundedReceiver<VerificationNeeded>,
    account_service: Arc<dyn AccountServicePort>,
    mailer: Arc<dyn VerificationMailer>,
) {
    while let Some(signal) = receiver.recv().await {
        if let Err(e) = handle_signal(&signal, account_service.as_ref(), mailer.as_ref()).await {
            tracing::error!(
                error = %e,
                account_id = %signal.account_id,
                "Failed to send verification notification"
            );
        }
    }
    tracing::info!("Verification worker stopped");
}

async fn handle_signal(
    signal: &VerificationNeeded,
    account_service: &dyn AccountServicePort,
    mailer: &dyn VerificationMailer,
) -> Result<(), anyhow::Error> {
    // Registration signals carry no token; the replacement paths issue one
    // before emitting so the emailed value is the stored value.
    let token_value = match signal.token {
        Some(value) => value,
        None => {
            account_service
                .create_verification_token(&signal.account_id)
                .await?
                .value
        }
    };

    let link = verification_link(&signal.callback_base_url, token_value);
    mailer
        .send_verification(&signal.email, &signal.username, &link)
        .await
}

fn verification_link(base_url: &str, token_value: Uuid) -> String {
    format!(
        "{}/email_verification?token={}",
        base_url.trim_end_matches('/'),
        token_value
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_link_format() {
        let value = Uuid::nil();
        assert_eq!(
            verification_link("http://localhost:8080/", value),
            "http://localhost:8080/email_verification?token=00000000-0000-0000-0000-000000000000"
        );
    }
}
