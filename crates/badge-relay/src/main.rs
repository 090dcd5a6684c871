mod bootstrap;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use relay_core::icons::IconMap;
use relay_core::registry::Registry;
use relay_core::settings::Settings;
use relay_runtime::ingress;
use relay_runtime::publisher::StatusPublisher;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::parse();
    let config = settings.to_config()?;

    bootstrap::setup_logging(&settings.log_level)?;
    bootstrap::ensure_status_dir(&config.status_dir)?;

    tracing::info!("badge-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "publishing notification status to {}",
        config.status_file().display()
    );

    let registry = Arc::new(Registry::new());

    let publisher = StatusPublisher::new(registry.clone(), IconMap::builtin(), &config);
    let publisher_handle = tokio::spawn(publisher.run());

    // The listener runs in the foreground; a bind failure propagates and
    // exits the process non-zero. Ctrl+C tears the publisher down cleanly.
    tokio::select! {
        result = ingress::run_listener(&config, registry) => {
            publisher_handle.abort();
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received; shutting down");
            publisher_handle.abort();
        }
    }

    Ok(())
}
