// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Relay Service
//!
//! Receives contact form submissions and forwards them to a fixed mailbox
//! over SMTP.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables (a `.env` file in the
//! working directory is honoured):
//!
//! - `SMTP_HOST`, `SMTP_USER`, `SMTP_PASS`, `CONTACT_TO`: required
//! - `SMTP_PORT`: implicit TLS port (default: 465)
//! - `MAIL_FROM_NAME`: sender display name (default: Contact Form)
//! - `CORS_ORIGIN`: comma-separated allowed origins (default: any)
//! - `BIND_HOST` / `PORT`: listen address (default: 0.0.0.0:3000)
//! - `RATE_LIMIT_MAX`: requests per window on /contact (default: 5)
//! - `RATE_LIMIT_WINDOW_SECS`: window length (default: 60)
//! - `TRUST_PROXY`: key the limiter on X-Forwarded-For (default: false)

use anyhow::Context;
use axum::serve;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use contact_relay::{
    app::router,
    config::Config,
    handlers::AppState,
    limiter::RateLimiter,
    mailer::SmtpMailer,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        bind_addr = %config.bind_addr,
        smtp_host = %config.smtp.host,
        smtp_port = config.smtp.port,
        contact_to = %config.mail.to,
        cors_origins = ?config.cors.allowed_origins,
        rate_limit_max = config.rate_limit.max_requests,
        rate_limit_window_secs = config.rate_limit.window_secs,
        "Starting contact relay"
    );

    let mailer = SmtpMailer::new(&config.smtp)?;
    if let Err(err) = mailer.ping().await {
        warn!(error = %err, "SMTP server not reachable, sends will fail until it is");
    }

    let state = Arc::new(AppState {
        mailer,
        mail: config.mail.clone(),
    });
    let limiter = Arc::new(RateLimiter::new(config.rate_limit.clone()));

    // Spawn cleanup task
    let cleanup_limiter = limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            cleanup_limiter.cleanup().await;
        }
    });

    let app = router(state, limiter, &config.cors);

    // Start server
    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "Server listening");

    serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
