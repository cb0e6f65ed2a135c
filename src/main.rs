use std::path::Path;
use std::sync::Arc;

use billing_assist::billing::HttpBillingClient;
use billing_assist::classifier::ChatCompletionsClassifier;
use billing_assist::config::Config;
use billing_assist::pipeline::{ChangeListener, MessageProcessor};
use billing_assist::server;
use billing_assist::store::{LibSqlStore, MessageStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up a local .env before reading the environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = Config::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    eprintln!("💬 Billing Assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Billing gateway: {}", config.billing.site_url);
    eprintln!("   Classifier: {} ({})", config.classifier.api_url, config.classifier.model);
    eprintln!("   Liveness: http://0.0.0.0:{}/", config.listen_port);

    // ── Message store ────────────────────────────────────────────────
    let store: Arc<dyn MessageStore> = Arc::new(
        LibSqlStore::new_local(Path::new(&config.store.db_path))
            .await
            .unwrap_or_else(|e| {
                eprintln!(
                    "Error: Failed to open store at {}: {}",
                    config.store.db_path, e
                );
                std::process::exit(1);
            }),
    );
    eprintln!("   Database: {}\n", config.store.db_path);

    // ── Liveness responder ───────────────────────────────────────────
    let port = config.listen_port;
    tokio::spawn(async move {
        if let Err(e) = server::serve(port).await {
            tracing::error!(error = %e, "Liveness endpoint failed");
        }
    });

    // ── Pipeline wiring ──────────────────────────────────────────────
    let classifier = Arc::new(ChatCompletionsClassifier::new(&config.classifier));
    let billing = Arc::new(HttpBillingClient::new(&config.billing));
    let processor = Arc::new(MessageProcessor::new(
        Arc::clone(&store),
        classifier,
        billing,
    ));
    let listener = ChangeListener::new(store, processor, config.poll_interval);

    tokio::select! {
        _ = listener.run() => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
