// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Router assembly.
//!
//! Layers, outermost first: tracing, security headers, origin guard, CORS,
//! body limit. The rate limiter only wraps `/contact` and sits inside the
//! body limit, so requests refused for size never count against a client.

use crate::config::CorsConfig;
use crate::cors::{cors_layer, origin_guard};
use crate::handlers::{contact, health, AppState};
use crate::limiter::{rate_limit, RateLimiter};
use crate::mailer::Mailer;
use crate::security::add_security_headers;
use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Maximum accepted request body (50 KB).
pub const BODY_LIMIT_BYTES: usize = 50 * 1024;

/// Build the service router.
pub fn router<M: Mailer>(
    state: Arc<AppState<M>>,
    limiter: Arc<RateLimiter>,
    cors: &CorsConfig,
) -> Router {
    let contact_routes = Router::new()
        .route("/contact", post(contact::<M>))
        .route_layer(from_fn_with_state(limiter, rate_limit));

    let app = Router::new()
        .route("/health", get(health))
        .merge(contact_routes)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(cors_layer(cors))
        .layer(from_fn_with_state(Arc::new(cors.clone()), origin_guard))
        .with_state(state);

    add_security_headers(app).layer(TraceLayer::new_for_http())
}
