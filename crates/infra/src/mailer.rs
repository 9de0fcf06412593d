//! `Mailer` implementations.
//!
//! No SMTP transport is wired in: the server logs outgoing mail, tests
//! capture it.

use std::sync::Mutex;

use async_trait::async_trait;

use storefront_accounts::{MailError, Mailer, OutgoingEmail};

/// Writes each message to the log instead of delivering it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            body = %email.html_body,
            "outgoing email"
        );
        Ok(())
    }
}

/// Keeps sent messages in memory (tests/dev).
#[derive(Debug, Default)]
pub struct InMemoryMailer {
    outbox: Mutex<Vec<OutgoingEmail>>,
    fail: bool,
}

impl InMemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose every delivery fails.
    pub fn failing() -> Self {
        Self {
            outbox: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.outbox
            .lock()
            .map(|outbox| outbox.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for InMemoryMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError(format!("delivery to {} refused", email.to)));
        }
        self.outbox
            .lock()
            .map_err(|_| MailError("outbox lock poisoned".to_string()))?
            .push(email);
        Ok(())
    }
}
