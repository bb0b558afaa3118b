//! Notification outbox
//!
//! Services enqueue [`Notification`]s without waiting; the
//! [`NotificationWorker`] renders and delivers them through a [`Mailer`].
//! Delivery is best effort: a full queue, a stopped worker or a mail failure
//! is logged and the notification dropped.

pub mod mailer;
pub mod worker;

pub use mailer::{Email, LogMailer, MailError, Mailer, SmtpMailer};
pub use worker::NotificationWorker;

use tokio::sync::mpsc::{self, error::TrySendError};

/// Queue depth before new notifications are dropped
pub const OUTBOX_CAPACITY: usize = 1024;

/// A message to deliver, with everything needed to render it
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// Email verification code sent at registration / resend
    VerificationOtp { to: String, name: String, otp: i64 },
    /// Confirmation to the customer who placed an order
    OrderPlaced {
        to: String,
        name: String,
        model_name: String,
        order_id: i64,
    },
    /// Alert to the admin mailbox about a new order
    NewOrderAlert {
        to: String,
        customer_name: String,
        customer_email: String,
        customer_phone: String,
        model_name: String,
        order_id: i64,
    },
    /// Password reset link
    PasswordReset {
        to: String,
        name: String,
        link: String,
    },
}

impl Notification {
    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::VerificationOtp { .. } => "verification_otp",
            Notification::OrderPlaced { .. } => "order_placed",
            Notification::NewOrderAlert { .. } => "new_order_alert",
            Notification::PasswordReset { .. } => "password_reset",
        }
    }

    pub fn render(&self) -> Email {
        match self {
            Notification::VerificationOtp { to, name, otp } => Email {
                to: to.clone(),
                subject: "Verify your GetFurnitures account".into(),
                body: format!(
                    "Hi {name},\n\nYour verification code is: {otp}\n\n\
                     Enter it in the app to activate your account."
                ),
            },
            Notification::OrderPlaced {
                to,
                name,
                model_name,
                order_id,
            } => Email {
                to: to.clone(),
                subject: "Your order has been placed".into(),
                body: format!(
                    "Hi {name},\n\nWe received your order #{order_id} for {model_name}.\n\
                     Our team will contact you shortly."
                ),
            },
            Notification::NewOrderAlert {
                to,
                customer_name,
                customer_email,
                customer_phone,
                model_name,
                order_id,
            } => Email {
                to: to.clone(),
                subject: format!("New order #{order_id}"),
                body: format!(
                    "A new order was placed.\n\nOrder: #{order_id}\nProduct: {model_name}\n\
                     Customer: {customer_name} <{customer_email}>\nPhone: {customer_phone}"
                ),
            },
            Notification::PasswordReset { to, name, link } => Email {
                to: to.clone(),
                subject: "Reset your GetFurnitures password".into(),
                body: format!(
                    "Hi {name},\n\nUse the link below to choose a new password. \
                     It expires in 10 minutes.\n\n{link}\n\n\
                     If you did not ask for this, ignore this email."
                ),
            },
        }
    }
}

/// Sending half of the outbox
#[derive(Clone, Debug)]
pub struct Notifier {
    tx: mpsc::Sender<Notification>,
}

impl Notifier {
    /// Create an outbox, returning the receiver for the worker
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Notification>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Enqueue without waiting
    pub fn notify(&self, notification: Notification) {
        match self.tx.try_send(notification) {
            Ok(()) => {}
            Err(TrySendError::Full(n)) => {
                tracing::warn!(kind = n.kind(), "Notification outbox full, dropping");
            }
            Err(TrySendError::Closed(n)) => {
                tracing::error!(kind = n.kind(), "Notification worker stopped, dropping");
            }
        }
    }
}
