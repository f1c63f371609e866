// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test harness for driving the full contact relay router.

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Request, Response},
    Router,
};
use contact_relay::{
    app::router,
    config::{CorsConfig, MailSettings, RateLimitConfig},
    handlers::AppState,
    limiter::RateLimiter,
    mailer::{ContactEmail, Mailer},
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Mailer that records every email instead of sending it.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<ContactEmail>>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<ContactEmail> {
        self.sent.lock().unwrap().clone()
    }
}

impl Mailer for RecordingMailer {
    async fn send(&self, email: ContactEmail) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(email);
        if self.fail {
            anyhow::bail!("554 transaction failed: relay access denied");
        }
        Ok(())
    }
}

/// Router wired with a recording mailer.
pub struct TestApp {
    pub app: Router,
    pub mailer: RecordingMailer,
}

impl TestApp {
    pub fn new(mailer: RecordingMailer) -> Self {
        Self::with_cors(mailer, "")
    }

    pub fn with_cors(mailer: RecordingMailer, origins: &str) -> Self {
        let state = Arc::new(AppState {
            mailer: mailer.clone(),
            mail: MailSettings {
                from_name: "Contact Form".to_string(),
                from: "relay@example.com".parse().unwrap(),
                to: "inbox@example.org".parse().unwrap(),
            },
        });
        let limiter = Arc::new(RateLimiter::new(RateLimitConfig::default()));
        let cors = CorsConfig::parse(origins).unwrap();

        Self {
            app: router(state, limiter, &cors),
            mailer,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// POST a JSON body to `/contact` from `peer`.
    pub async fn post_contact(&self, peer: &str, body: &Value) -> Response<Body> {
        self.send(contact_request(peer, body.to_string())).await
    }
}

pub fn contact_request(peer: &str, body: String) -> Request<Body> {
    let peer: SocketAddr = peer.parse().unwrap();
    Request::builder()
        .method("POST")
        .uri("/contact")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, body.len())
        .extension(ConnectInfo(peer))
        .body(Body::from(body))
        .unwrap()
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
