// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Cross-origin policy.
//!
//! Browsers presenting an `Origin` outside the allow-list are turned away
//! with a 403 before routing. Callers without an `Origin` header (curl,
//! server-to-server) are always let through.

use crate::config::CorsConfig;
use crate::error::ErrorResponse;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;

pub const CORS_REJECTION_MESSAGE: &str = "Not allowed by CORS";

/// CORS response headers for admitted origins.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let allow_origin = if config.allows_any() {
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// Middleware rejecting requests from origins outside the allow-list.
pub async fn origin_guard(
    State(config): State<Arc<CorsConfig>>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(origin) = request.headers().get(header::ORIGIN) {
        let allowed =
            config.allows_any() || origin.to_str().is_ok_and(|o| config.is_allowed(o));
        if !allowed {
            info!(origin = ?origin, path = %request.uri().path(), "Origin not allowed");
            return (
                StatusCode::FORBIDDEN,
                Json(ErrorResponse::new(CORS_REJECTION_MESSAGE)),
            )
                .into_response();
        }
    }

    next.run(request).await
}
