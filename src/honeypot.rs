// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Honeypot check.
//!
//! The `_hp` field is hidden from people filling in the form. Anything that
//! fills it is treated as a bot: the request is answered exactly like a
//! genuine one but nothing is sent.

use crate::validator::ContactSubmission;

/// Whether the honeypot carries any non-whitespace content.
pub fn is_abusive(submission: &ContactSubmission) -> bool {
    submission
        .honeypot
        .as_deref()
        .is_some_and(|hp| !hp.trim().is_empty())
}
