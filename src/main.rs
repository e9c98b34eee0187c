//! Truverizen - command line client for the Truverizen Platform.
//!
//! Drives the court-index and master-deduplication workflows and the
//! administration endpoints of the Truverizen backend.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use truverizen::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let default_filter = if cli::is_verbose() {
        "truverizen=info"
    } else {
        "truverizen=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    cli::run().await
}
