//! Notification background worker
//!
//! Consumes the outbox and hands each message to the mailer. Exits when
//! every [`super::Notifier`] has been dropped.

use std::sync::Arc;
use tokio::sync::mpsc;

use super::{Mailer, Notification};

pub struct NotificationWorker {
    mailer: Arc<dyn Mailer>,
}

impl NotificationWorker {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    /// Run until the channel closes
    pub async fn run(self, mut rx: mpsc::Receiver<Notification>) {
        tracing::info!("Notification worker started");

        while let Some(notification) = rx.recv().await {
            let email = notification.render();
            match self.mailer.send(&email).await {
                Ok(()) => {
                    tracing::debug!(kind = notification.kind(), to = %email.to, "Notification sent");
                }
                Err(e) => {
                    tracing::warn!(
                        kind = notification.kind(),
                        to = %email.to,
                        error = %e,
                        "Notification delivery failed"
                    );
                }
            }
        }

        tracing::info!("Notification channel closed, worker stopping");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::mailer::RecordingMailer;
    use crate::notify::{MailError, Notifier};
    use crate::notify::mailer::Email;
    use async_trait::async_trait;

    struct FailingMailer;

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, email: &Email) -> Result<(), MailError> {
            Err(MailError::InvalidAddress(email.to.clone()))
        }
    }

    fn otp(to: &str) -> Notification {
        Notification::VerificationOtp {
            to: to.into(),
            name: "A".into(),
            otp: 123456,
        }
    }

    #[tokio::test]
    async fn delivers_in_order_and_stops_on_close() {
        let mailer = RecordingMailer::new();
        let (notifier, rx) = Notifier::channel(8);
        let handle = tokio::spawn(NotificationWorker::new(Arc::new(mailer.clone())).run(rx));

        notifier.notify(otp("a@x.com"));
        notifier.notify(otp("b@x.com"));
        drop(notifier);
        handle.await.unwrap();

        let to: Vec<String> = mailer.sent().into_iter().map(|e| e.to).collect();
        assert_eq!(to, vec!["a@x.com", "b@x.com"]);
    }

    #[tokio::test]
    async fn failures_do_not_stop_the_worker() {
        let (notifier, rx) = Notifier::channel(8);
        let handle = tokio::spawn(NotificationWorker::new(Arc::new(FailingMailer)).run(rx));
        notifier.notify(otp("a@x.com"));
        notifier.notify(otp("b@x.com"));
        drop(notifier);
        handle.await.unwrap();
    }
}
