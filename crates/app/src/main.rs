//! Storefront - opens the configured database, wires the application
//! context and prints its health and cache report.

use std::sync::Arc;

use storefront_app::AppContext;
use storefront_domain::Result;
use storefront_infra::{config, init_logging, LogFormat};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        error!(error = %err, kind = err.label(), "storefront failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let format = std::env::var("STOREFRONT_LOG_FORMAT")
        .ok()
        .and_then(|raw| raw.parse::<LogFormat>().ok())
        .unwrap_or_default();
    init_logging(format)?;

    let config = config::load()?;
    info!(path = %config.database.path, "storefront starting");

    let context = Arc::new(AppContext::open(config).await?);
    let _janitor = context.spawn_janitor();

    // Warm every snapshot once so the report has something to show
    context.products.get_all().await?;
    context.categories.get_all().await?;
    context.users.get_all().await?;
    context.orders.get_all().await?;
    context.inventory.get_all().await?;

    let health = context.health_check().await;
    let rendered = serde_json::to_string_pretty(&health)
        .map_err(|err| storefront_domain::StorefrontError::Internal(err.to_string()))?;
    println!("{rendered}");
    println!("{}", context.cache_report());

    context.shutdown().await
}
