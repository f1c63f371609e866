// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact submission validator.
//!
//! Turns a raw request body into a [`ContactSubmission`]:
//! - Content-Type must be `application/json`
//! - Body must be a JSON object
//! - `name`, `email` and `message` are required strings, trimmed
//! - Length bounds are counted in characters after trimming
//! - `email` must be a syntactically valid address with a top-level domain
//! - `_hp` (honeypot) may be omitted; when present it must be a string

use email_address::{EmailAddress, Options};
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::debug;

pub const NAME_MAX_CHARS: usize = 80;
pub const EMAIL_MAX_CHARS: usize = 120;
pub const MESSAGE_MAX_CHARS: usize = 3000;

/// Validation error types.
///
/// The variant is for logs and tests only; callers of the HTTP API get a
/// generic message whichever rule failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid Content-Type: expected application/json, got {0:?}")]
    ContentType(Option<String>),

    #[error("Malformed body: {0}")]
    Malformed(String),

    #[error("Field {field} must be between {min} and {max} characters, got {actual}")]
    Length {
        field: &'static str,
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("Invalid email address")]
    InvalidEmail,
}

/// A contact submission that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: EmailAddress,
    pub message: String,
    pub honeypot: Option<String>,
}

/// Wire shape of the request body. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct ContactForm {
    name: String,
    email: String,
    message: String,
    #[serde(rename = "_hp", default, deserialize_with = "present_string")]
    honeypot: Option<String>,
}

/// An optional field that, once present, must hold a string; `null` is rejected.
fn present_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(Some)
}

/// Validate the Content-Type header, ignoring parameters such as charset.
pub fn validate_content_type(content_type: Option<&str>) -> Result<(), ValidationError> {
    // Extract just the media type, ignoring charset etc.
    let media_type =
        content_type.map(|s| s.split(';').next().unwrap_or(s).trim().to_lowercase());

    match media_type.as_deref() {
        Some("application/json") => Ok(()),
        _ => {
            debug!(content_type = ?media_type, "Content-Type invalid");
            Err(ValidationError::ContentType(media_type))
        }
    }
}

/// Validate a raw JSON request body.
pub fn validate(body: &[u8]) -> Result<ContactSubmission, ValidationError> {
    let value: serde_json::Value = serde_json::from_slice(body).map_err(malformed)?;
    if !value.is_object() {
        debug!("Request body is not a JSON object");
        return Err(ValidationError::Malformed("expected a JSON object".to_string()));
    }
    let form: ContactForm = serde_json::from_value(value).map_err(malformed)?;

    let name = bounded("name", &form.name, 1, NAME_MAX_CHARS)?;
    let email = bounded("email", &form.email, 1, EMAIL_MAX_CHARS)?;
    let message = bounded("message", &form.message, 1, MESSAGE_MAX_CHARS)?;

    let email = EmailAddress::parse_with_options(email, email_options()).map_err(|err| {
        debug!(error = %err, "Invalid email address");
        ValidationError::InvalidEmail
    })?;

    Ok(ContactSubmission {
        name: name.to_string(),
        email,
        message: message.to_string(),
        honeypot: form.honeypot,
    })
}

fn malformed(err: serde_json::Error) -> ValidationError {
    debug!(error = %err, "Request body does not match contact form shape");
    ValidationError::Malformed(err.to_string())
}

fn email_options() -> Options {
    Options::default()
        .with_required_tld()
        .without_domain_literal()
        .without_display_text()
}

/// Trim `value` and check its length in characters.
fn bounded<'a>(
    field: &'static str,
    value: &'a str,
    min: usize,
    max: usize,
) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    let actual = trimmed.chars().count();
    if (min..=max).contains(&actual) {
        Ok(trimmed)
    } else {
        debug!(field, actual, min, max, "Field length out of bounds");
        Err(ValidationError::Length {
            field,
            min,
            max,
            actual,
        })
    }
}
