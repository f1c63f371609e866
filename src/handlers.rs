// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the contact relay service.
//!
//! `/contact` walks a submission through validation, the honeypot check and
//! delivery. Invalid input and delivery failures map to generic errors via
//! [`ContactError`]; a tripped honeypot answers like a successful send.

use crate::config::MailSettings;
use crate::error::{ContactError, Result};
use crate::honeypot;
use crate::mailer::{compose, Mailer};
use crate::validator;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Shared application state.
pub struct AppState<M> {
    pub mailer: M,
    pub mail: MailSettings,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
}

/// Successful (or silently dropped) contact submission.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

/// Validate a contact submission and relay it by email.
pub async fn contact<M: Mailer>(
    State(state): State<Arc<AppState<M>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SuccessResponse>> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    validator::validate_content_type(content_type)?;
    let submission = validator::validate(&body)?;

    if honeypot::is_abusive(&submission) {
        info!("Honeypot filled, dropping submission");
        return Ok(Json(SuccessResponse { success: true }));
    }

    let email = compose(&submission, &state.mail);
    debug!(subject = %email.subject, "Dispatching contact email");
    state
        .mailer
        .send(email)
        .await
        .map_err(ContactError::Delivery)?;

    info!("Contact email sent");
    Ok(Json(SuccessResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{INVALID_INPUT_MESSAGE, SEND_FAILURE_MESSAGE};
    use crate::mailer::MockMailer;
    use anyhow::anyhow;
    use axum::{
        http::{HeaderValue, StatusCode},
        response::IntoResponse,
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};

    fn state(mailer: MockMailer) -> State<Arc<AppState<MockMailer>>> {
        State(Arc::new(AppState {
            mailer,
            mail: MailSettings {
                from_name: "Contact Form".to_string(),
                from: "relay@example.com".parse().unwrap(),
                to: "inbox@example.org".parse().unwrap(),
            },
        }))
    }

    fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers
    }

    async fn call(mailer: MockMailer, body: Value) -> (StatusCode, Value) {
        let body = Bytes::from(serde_json::to_vec(&body).unwrap());
        let response = contact(state(mailer), json_headers(), body)
            .await
            .into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_genuine_submission_is_sent_once() {
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .once()
            .withf(|email| {
                email.subject == "New portfolio contact - Ana"
                    && email.reply_to.as_str() == "ana@example.com"
                    && email.to.as_str() == "inbox@example.org"
            })
            .return_once(|_| Box::pin(std::future::ready(Ok(()))));

        let (status, body) = call(
            mailer,
            json!({"name": "Ana", "email": "ana@example.com", "message": "Olá!"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true}));
    }

    #[tokio::test]
    async fn test_invalid_submission_never_sends() {
        let mut mailer = MockMailer::new();
        mailer.expect_send().never();

        let (status, body) = call(
            mailer,
            json!({"name": "", "email": "ana@example.com", "message": "hi"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": INVALID_INPUT_MESSAGE}));
    }

    #[tokio::test]
    async fn test_honeypot_answers_success_without_sending() {
        let mut mailer = MockMailer::new();
        mailer.expect_send().never();

        let (status, body) = call(
            mailer,
            json!({"name": "Bot", "email": "bot@example.com", "message": "spam", "_hp": "filled"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true}));
    }

    #[tokio::test]
    async fn test_delivery_failure_is_generic() {
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .once()
            .return_once(|_| Box::pin(std::future::ready(Err(anyhow!("535 auth failed")))));

        let (status, body) = call(
            mailer,
            json!({"name": "Ana", "email": "ana@example.com", "message": "hi"}),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": SEND_FAILURE_MESSAGE}));
    }

    #[tokio::test]
    async fn test_wrong_content_type_rejected() {
        let mut mailer = MockMailer::new();
        mailer.expect_send().never();

        let response = contact(
            state(mailer),
            HeaderMap::new(),
            Bytes::from_static(br#"{"name":"Ana","email":"ana@example.com","message":"hi"}"#),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_health() {
        let Json(response) = health().await;
        assert!(response.ok);
    }
}
