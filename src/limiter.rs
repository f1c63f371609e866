// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter for the contact endpoint.
//!
//! Each client gets a window that opens with its first request. Up to
//! `max_requests` requests are admitted inside the window; the rest are
//! turned away until it elapses.
//!
//! The [`rate_limit`] middleware identifies the client, consults the
//! limiter and decorates responses with `RateLimit-*` headers.

use crate::config::RateLimitConfig;
use crate::error::ErrorResponse;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info};

const RATE_LIMIT_POLICY: HeaderName = HeaderName::from_static("ratelimit-policy");
const RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
const RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
const RATE_LIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");
const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Result of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed {
        /// Remaining requests in current window
        remaining: u32,
        /// Time until window resets
        reset_in: Duration,
    },
    /// Request is rate limited
    Limited {
        /// Time until the window resets
        retry_after: Duration,
    },
}

/// Request counter for one client.
#[derive(Debug)]
struct Window {
    started: Instant,
    hits: u32,
}

/// Thread-safe rate limiter.
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Arc<RwLock<HashMap<IpAddr, Window>>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Count a request from `ip` and decide whether it is admitted.
    pub async fn check(&self, ip: IpAddr) -> RateLimitResult {
        let now = Instant::now();
        let length = self.config.window_duration();

        let mut windows = self.windows.write().await;
        let window = windows.entry(ip).or_insert(Window {
            started: now,
            hits: 0,
        });

        if now.duration_since(window.started) >= length {
            window.started = now;
            window.hits = 0;
        }

        let reset_in = length.saturating_sub(now.duration_since(window.started));
        if window.hits >= self.config.max_requests {
            debug!(%ip, ?reset_in, "Client rate limit exceeded");
            return RateLimitResult::Limited {
                retry_after: reset_in,
            };
        }

        window.hits += 1;
        RateLimitResult::Allowed {
            remaining: self.config.max_requests - window.hits,
            reset_in,
        }
    }

    /// Drop windows that have elapsed (should be called periodically).
    pub async fn cleanup(&self) {
        let now = Instant::now();
        let length = self.config.window_duration();

        let mut windows = self.windows.write().await;
        windows.retain(|_, window| now.duration_since(window.started) < length);
    }

    /// Number of clients currently tracked.
    pub async fn tracked_clients(&self) -> usize {
        self.windows.read().await.len()
    }
}

/// Identify the client a request comes from.
///
/// Uses the TCP peer address, or the first parseable `X-Forwarded-For` entry
/// when the service sits behind a trusted proxy. Requests without either
/// share the unspecified address.
pub fn client_ip(request: &Request, trust_proxy: bool) -> IpAddr {
    if trust_proxy {
        if let Some(ip) = forwarded_for(request.headers()) {
            return ip;
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

fn forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get(X_FORWARDED_FOR)?
        .to_str()
        .ok()?
        .split(',')
        .next()
        .and_then(|ip| ip.trim().parse().ok())
}

/// Middleware applying the limiter to every request it wraps.
pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let config = limiter.config();
    let ip = client_ip(&request, config.trust_proxy);

    match limiter.check(ip).await {
        RateLimitResult::Allowed {
            remaining,
            reset_in,
        } => {
            let mut response = next.run(request).await;
            set_headers(response.headers_mut(), config, remaining, reset_in);
            response
        }
        RateLimitResult::Limited { retry_after } => {
            info!(
                %ip,
                retry_after_secs = ceil_secs(retry_after),
                "Request rate limited"
            );
            let mut response = (
                StatusCode::TOO_MANY_REQUESTS,
                [("Retry-After", ceil_secs(retry_after).to_string())],
                Json(ErrorResponse::new(
                    "Too many requests, please try again later.",
                )),
            )
                .into_response();
            set_headers(response.headers_mut(), config, 0, retry_after);
            response
        }
    }
}

fn set_headers(
    headers: &mut HeaderMap,
    config: &RateLimitConfig,
    remaining: u32,
    reset_in: Duration,
) {
    let policy = format!("{};w={}", config.max_requests, config.window_secs);
    if let Ok(policy) = HeaderValue::from_str(&policy) {
        headers.insert(RATE_LIMIT_POLICY, policy);
    }
    headers.insert(RATE_LIMIT_LIMIT, HeaderValue::from(config.max_requests));
    headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(remaining));
    headers.insert(RATE_LIMIT_RESET, HeaderValue::from(ceil_secs(reset_in)));
}

fn ceil_secs(duration: Duration) -> u64 {
    duration.as_millis().div_ceil(1000) as u64
}
