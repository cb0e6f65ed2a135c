//! Liveness endpoint — lets a hosting platform detect the process is up.
//!
//! No routing: any method on any path gets 200 with a fixed body.

use axum::Router;

const LIVENESS_BODY: &str = "Chatbot is running";

async fn alive() -> &'static str {
    LIVENESS_BODY
}

/// Router whose fallback answers everything.
pub fn liveness_router() -> Router {
    Router::new().fallback(alive)
}

/// Bind and serve the liveness responder until the process exits.
pub async fn serve(port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "Liveness endpoint started");
    axum::serve(listener, liveness_router()).await?;
    Ok(())
}

// ── Tests ───────────────────────────────────────────────────────────
