// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTML escaping for user-supplied text embedded in the HTML email body.
//!
//! The plain-text body is sent verbatim and never goes through here.

/// Escape the five HTML-significant characters.
///
/// Single pass: an existing entity such as `&amp;` is escaped again.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Turn `\r\n` and `\n` line endings into `<br/>`.
pub fn line_breaks_to_html(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\n', "<br/>")
}
