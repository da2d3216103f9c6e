//! # Bidwatch Web
//!
//! HTTP triggers for alert cycles. An external scheduler calls these
//! endpoints; each request runs one stateless cycle.
//!
//! | Route | Response |
//! |-------|----------|
//! | `GET /alert?a=&h=&l=&t=` | JSON string: summary, `"skipped"` or `"error: ..."` |
//! | `GET /alerts` | Cycle report for every configured asset |
//! | `GET /health` | `{"status":"ok"}` |

mod routes;
mod state;

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use thiserror::Error;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

pub use state::AppState;

/// Server startup and runtime failures.
#[derive(Debug, Error)]
pub enum WebError {
    #[error("invalid bind address {address}: {reason}")]
    Address { address: String, reason: String },

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Router with every trigger route and request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::alert::router())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Serve on the configured host and port until `shutdown` resolves.
pub async fn serve<F>(state: AppState, shutdown: F) -> Result<(), WebError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let raw = format!("{}:{}", state.config.host, state.config.port);
    let address: SocketAddr = raw.parse().map_err(|error: std::net::AddrParseError| {
        WebError::Address {
            address: raw.clone(),
            reason: error.to_string(),
        }
    })?;

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|source| WebError::Bind { address, source })?;
    info!(%address, "listening for alert triggers");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(WebError::Serve)?;

    info!("server stopped");
    Ok(())
}
