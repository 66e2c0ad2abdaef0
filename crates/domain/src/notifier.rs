//! Outbound notifications: password reset tokens, contact messages, low-stock alerts.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::fuel::FuelType;
use crate::ids::{StationId, TankId};

/// A message to deliver to a person outside the request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Notification {
    #[serde(rename_all = "camelCase")]
    PasswordReset {
        email: String,
        token: String,
        expires_at: DateTime<Utc>,
    },

    #[serde(rename_all = "camelCase")]
    ContactMessage {
        first_name: String,
        last_name: String,
        phone_number: String,
        email: String,
        message: String,
    },

    #[serde(rename_all = "camelCase")]
    LowStock {
        station_id: StationId,
        tank_id: TankId,
        title: String,
        fuel_type: FuelType,
        current_quantity: f64,
        threshold: f64,
    },
}

impl Notification {
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::PasswordReset { .. } => "password_reset",
            Notification::ContactMessage { .. } => "contact_message",
            Notification::LowStock { .. } => "low_stock",
        }
    }
}

/// Errors from a notification channel.
#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

/// Trait for notification channels.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers one notification.
    async fn send(&self, notification: Notification) -> Result<(), NotifierError>;
}

/// Notifier that writes each notification as a structured log record.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: Notification) -> Result<(), NotifierError> {
        match &notification {
            Notification::PasswordReset {
                email,
                token,
                expires_at,
            } => {
                tracing::info!(kind = notification.kind(), %email, %token, %expires_at, "password reset requested");
            }
            Notification::ContactMessage {
                first_name,
                last_name,
                email,
                phone_number,
                message,
            } => {
                tracing::info!(
                    kind = notification.kind(),
                    from = %format!("{first_name} {last_name}"),
                    %email,
                    %phone_number,
                    %message,
                    "contact message received"
                );
            }
            Notification::LowStock {
                station_id,
                tank_id,
                title,
                fuel_type,
                current_quantity,
                threshold,
            } => {
                tracing::warn!(
                    kind = notification.kind(),
                    %station_id,
                    %tank_id,
                    %title,
                    %fuel_type,
                    current_quantity,
                    threshold,
                    "tank at or below low-stock threshold"
                );
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct InMemoryNotifierState {
    sent: Vec<Notification>,
    fail_on_send: bool,
}

/// In-memory notifier for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotifier {
    state: Arc<RwLock<InMemoryNotifierState>>,
}

impl InMemoryNotifier {
    /// Creates a new in-memory notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the notifier to fail every send.
    pub fn set_fail_on_send(&self, fail: bool) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .fail_on_send = fail;
    }

    /// Returns every notification delivered so far.
    pub fn sent(&self) -> Vec<Notification> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .sent
            .clone()
    }

    /// Returns the most recent reset token sent to `email`.
    pub fn last_reset_token(&self, email: &str) -> Option<String> {
        self.sent().into_iter().rev().find_map(|n| match n {
            Notification::PasswordReset {
                email: to, token, ..
            } if to.eq_ignore_ascii_case(email) => Some(token),
            _ => None,
        })
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn send(&self, notification: Notification) -> Result<(), NotifierError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.fail_on_send {
            return Err(NotifierError::Delivery("mail transport unavailable".into()));
        }
        state.sent.push(notification);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reset(email: &str, token: &str) -> Notification {
        Notification::PasswordReset {
            email: email.into(),
            token: token.into(),
            expires_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn records_sent_notifications() {
        let notifier = InMemoryNotifier::new();
        notifier.send(reset("a@b.co", "t1")).await.unwrap();
        notifier.send(reset("a@b.co", "t2")).await.unwrap();

        assert_eq!(notifier.sent().len(), 2);
        assert_eq!(notifier.last_reset_token("A@B.CO").as_deref(), Some("t2"));
        assert_eq!(notifier.last_reset_token("x@y.zz"), None);
    }

    #[tokio::test]
    async fn can_be_told_to_fail() {
        let notifier = InMemoryNotifier::new();
        notifier.set_fail_on_send(true);
        assert!(notifier.send(reset("a@b.co", "t")).await.is_err());
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn log_notifier_always_succeeds() {
        assert!(LogNotifier.send(reset("a@b.co", "t")).await.is_ok());
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_value(reset("a@b.co", "t")).unwrap();
        assert_eq!(json["kind"], "passwordReset");
        assert_eq!(json["email"], "a@b.co");
        assert!(json.get("expiresAt").is_some());
    }
}
