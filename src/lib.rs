// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Relay
//!
//! A small backend for a website contact form:
//!
//! - `GET /health` liveness probe
//! - `POST /contact` validates a submission and relays it by email
//! - Honeypot field that silently drops bot submissions
//! - HTML escaping of user text in the HTML body
//! - Per-client rate limiting (5 requests per minute default)
//! - Origin allow-list and hardening response headers

pub mod app;
pub mod config;
pub mod cors;
pub mod error;
pub mod handlers;
pub mod honeypot;
pub mod limiter;
pub mod mailer;
pub mod sanitize;
pub mod security;
pub mod validator;

pub use config::Config;
pub use limiter::{RateLimitResult, RateLimiter};
pub use mailer::{ContactEmail, Mailer, SmtpMailer};
pub use validator::{ContactSubmission, ValidationError};
