pub mod channel;
pub mod mailer;
pub mod worker;

pub use channel::ChannelNotifier;
pub use mailer::mailer_from_config;
pub use mailer::LogMailer;
pub use mailer::SmtpMailer;
pub use mailer::VerificationMailer;
pub use worker::run_verification_worker;
