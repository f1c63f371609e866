// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for the contact endpoint and their HTTP mapping.

use crate::validator::ValidationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

pub const INVALID_INPUT_MESSAGE: &str = "Invalid input";
pub const SEND_FAILURE_MESSAGE: &str = "Failed to send email";

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
}

impl ErrorResponse {
    pub fn new(error: &'static str) -> Self {
        Self { error }
    }
}

/// Contact request failures.
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("Invalid contact submission: {0}")]
    Invalid(#[from] ValidationError),

    #[error("Failed to deliver contact email")]
    Delivery(#[source] anyhow::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ContactError>;

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        match self {
            ContactError::Invalid(err) => {
                debug!(error = %err, "Rejected contact submission");
                (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse::new(INVALID_INPUT_MESSAGE)),
                )
                    .into_response()
            }
            ContactError::Delivery(err) => {
                error!(error = ?err, "Failed to send contact email");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new(SEND_FAILURE_MESSAGE)),
                )
                    .into_response()
            }
        }
    }
}
