// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact email composition and delivery.
//!
//! [`compose`] builds a transport-independent [`ContactEmail`] from a
//! genuine submission. A [`Mailer`] hands it to a transport; [`SmtpMailer`]
//! is the production one, built on lettre's async SMTP transport.

use crate::config::{MailSettings, SmtpConfig};
use crate::sanitize::{escape_html, line_breaks_to_html};
use crate::validator::ContactSubmission;
use anyhow::{anyhow, bail, Context};
use email_address::EmailAddress;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::future::Future;
use tracing::debug;

/// A fully composed contact email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactEmail {
    pub from_name: String,
    pub from: EmailAddress,
    pub reply_to: EmailAddress,
    pub to: EmailAddress,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Something that can deliver a [`ContactEmail`].
#[cfg_attr(test, mockall::automock)]
pub trait Mailer: Send + Sync + 'static {
    fn send(&self, email: ContactEmail) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// Compose the outgoing email for a genuine submission.
///
/// Subject, reply-to and text body carry the raw values; only the HTML body
/// uses escaped ones.
pub fn compose(submission: &ContactSubmission, settings: &MailSettings) -> ContactEmail {
    let html_name = escape_html(&submission.name);
    let html_email = escape_html(submission.email.as_str());
    let html_message = line_breaks_to_html(&escape_html(&submission.message));

    ContactEmail {
        from_name: settings.from_name.clone(),
        from: settings.from.clone(),
        reply_to: submission.email.clone(),
        to: settings.to.clone(),
        subject: format!("New portfolio contact - {}", submission.name),
        html: format!(
            "<h2>New portfolio contact</h2>\n\
             <p><strong>Name:</strong> {html_name}</p>\n\
             <p><strong>Email:</strong> {html_email}</p>\n\
             <p><strong>Message:</strong><br/>{html_message}</p>\n"
        ),
        text: format!(
            "Name: {}\nEmail: {}\nMessage:\n{}",
            submission.name, submission.email, submission.message
        ),
    }
}

/// SMTP delivery over implicit TLS.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .with_context(|| format!("Invalid SMTP host {}", config.host))?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self { transport })
    }

    /// Open a connection and check the server greets us.
    pub async fn ping(&self) -> anyhow::Result<()> {
        self.transport
            .test_connection()
            .await?
            .then_some(())
            .ok_or_else(|| anyhow!("Failed to ping SMTP server"))
    }
}

impl Mailer for SmtpMailer {
    async fn send(&self, email: ContactEmail) -> anyhow::Result<()> {
        let message = build_message(&email)?;
        let response = self
            .transport
            .send(message)
            .await
            .context("SMTP delivery failed")?;

        if !response.is_positive() {
            bail!("SMTP server rejected message: {}", response.code());
        }
        debug!(code = %response.code(), "Contact email accepted by SMTP server");
        Ok(())
    }
}

fn build_message(email: &ContactEmail) -> anyhow::Result<Message> {
    let from = Mailbox::new(Some(email.from_name.clone()), address(&email.from)?);
    let reply_to = Mailbox::new(None, address(&email.reply_to)?);
    let to = Mailbox::new(None, address(&email.to)?);

    Message::builder()
        .from(from)
        .reply_to(reply_to)
        .to(to)
        .subject(email.subject.clone())
        .multipart(MultiPart::alternative_plain_html(
            email.text.clone(),
            email.html.clone(),
        ))
        .context("Failed to build contact email")
}

fn address(email: &EmailAddress) -> anyhow::Result<Address> {
    email
        .as_str()
        .parse()
        .with_context(|| format!("Address not usable for SMTP: {email}"))
}
