use tokio::sync::mpsc;

use crate::account::notifications::VerificationNeeded;
use crate::account::ports::VerificationNotifier;

/// Notifier that hands signals to an in-process worker over an unbounded
/// channel. Sending never blocks the request path; if the worker is gone the
/// signal is dropped and logged, and the triggering request still succeeds.
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<VerificationNeeded>,
}

impl ChannelNotifier {
    /// Create a notifier together with the receiving end the worker consumes.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<VerificationNeeded>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl VerificationNotifier for ChannelNotifier {
    fn notify(&self, signal: VerificationNeeded) {
        if let Err(e) = self.sender.send(signal) {
            tracing::error!(
                account_id = %e.0.account_id,
                "Verification worker unavailable, dropping signal"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::models::AccountId;

    fn signal() -> VerificationNeeded {
        VerificationNeeded {
            account_id: AccountId::new(),
            username: "alice".to_string(),
            email: "a@a.co".to_string(),
            token: None,
            callback_base_url: "http://localhost:8080".to_string(),
            locale: "en".to_string(),
        }
    }

    #[tokio::test]
    async fn test_notify_delivers_to_receiver() {
        let (notifier, mut receiver) = ChannelNotifier::new();
        let sent = signal();
        let account_id = sent.account_id;

        notifier.notify(sent);

        let received = receiver.recv().await.expect("nothing received");
        assert_eq!(received.account_id, account_id);
    }

    #[test]
    fn test_notify_survives_a_dropped_receiver() {
        let (notifier, receiver) = ChannelNotifier::new();
        drop(receiver);

        // Must not panic or block
        notifier.notify(signal());
    }
}
