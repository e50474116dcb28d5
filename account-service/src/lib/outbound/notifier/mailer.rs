use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::AsyncSmtpTransport;
use lettre::AsyncTransport;
use lettre::Message;
use lettre::Tokio1Executor;

use crate::config::EmailConfig;

/// Delivery mechanism for verification messages.
#[async_trait]
pub trait VerificationMailer: Send + Sync + 'static {
    async fn send_verification(
        &self,
        to: &str,
        username: &str,
        link: &str,
    ) -> Result<(), anyhow::Error>;
}

/// Pick a mailer from the email configuration: SMTP when a host is
/// configured, otherwise a logging stand-in so the service stays usable in
/// development.
pub fn mailer_from_config(
    config: &EmailConfig,
) -> Result<Arc<dyn VerificationMailer>, anyhow::Error> {
    match (&config.smtp_host, &config.smtp_username, &config.smtp_password) {
        (Some(host), Some(username), Some(password)) => Ok(Arc::new(SmtpMailer::new(
            host,
            username.clone(),
            password.clone(),
            config.from_address.clone(),
        )?)),
        _ => {
            tracing::info!("SMTP not configured, verification links will be logged instead");
            Ok(Arc::new(LogMailer))
        }
    }
}

/// Mailer backed by an SMTP relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    pub fn new(
        host: &str,
        username: String,
        password: String,
        from_address: String,
    ) -> Result<Self, anyhow::Error> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
            .credentials(Credentials::new(username, password))
            .build();
        Ok(Self {
            transport,
            from_address,
        })
    }
}

#[async_trait]
impl VerificationMailer for SmtpMailer {
    async fn send_verification(
        &self,
        to: &str,
        username: &str,
        link: &str,
    ) -> Result<(), anyhow::Error> {
        let body = format!(
            "<html><body>\
             <p>Hello {username},</p>\
             <p>Please confirm your email address by following this link:</p>\
             <p><a href=\"{link}\">{link}</a></p>\
             <p>The link stops working after a while; requesting it again or \
             signing in will send you a fresh one.</p>\
             </body></html>"
        );
        let message = Message::builder()
            .from(self.from_address.parse()?)
            .to(to.parse()?)
            .subject("Confirm your email address")
            .header(ContentType::TEXT_HTML)
            .body(body)?;

        self.transport.send(message).await?;
        tracing::info!(to = %to, "Verification email sent");
        Ok(())
    }
}

/// Mailer that writes the verification link to the log instead of sending
/// anything.
pub struct LogMailer;

#[async_trait]
impl VerificationMailer for LogMailer {
    async fn send_verification(
        &self,
        to: &str,
        username: &str,
        link: &str,
    ) -> Result<(), anyhow::Error> {
        tracing::info!(to = %to, username = %username, link = %link, "Verification link");
        Ok(())
    }
}
