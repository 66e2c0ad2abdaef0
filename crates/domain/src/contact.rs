//! Public contact form.

use std::sync::Arc;

use serde::Deserialize;

use crate::error::{DomainError, ValidationError};
use crate::notifier::{Notification, Notifier};
use crate::validation::{email, required};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

impl ContactMessage {
    fn validate(&self) -> Result<Notification, ValidationError> {
        let first_name = required("firstName", self.first_name.as_deref());
        let last_name = required("lastName", self.last_name.as_deref());
        let phone_number = required("phoneNumber", self.phone_number.as_deref());
        let email = email("email", self.email.as_deref());
        let message = required("message", self.message.as_deref());

        match (first_name, last_name, phone_number, email, message) {
            (Ok(first_name), Ok(last_name), Ok(phone_number), Ok(email), Ok(message)) => {
                Ok(Notification::ContactMessage {
                    first_name,
                    last_name,
                    phone_number,
                    email,
                    message,
                })
            }
            (a, b, c, d, e) => Err(ValidationError::from_errors(
                [a.err(), b.err(), c.err(), d.err(), e.err()]
                    .into_iter()
                    .flatten()
                    .collect(),
            )),
        }
    }
}

/// Forwards contact form submissions to the notifier.
pub struct ContactService {
    notifier: Arc<dyn Notifier>,
}

impl ContactService {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    #[tracing::instrument(skip(self, input))]
    pub async fn submit(&self, input: ContactMessage) -> Result<(), DomainError> {
        let notification = input.validate()?;
        self.notifier.send(notification).await?;
        tracing::info!("contact message forwarded");
        Ok(())
    }
}
