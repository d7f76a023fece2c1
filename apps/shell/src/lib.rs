//! Headless storefront shell.
//!
//! Starts the store-status and catalog queries, feeds them to the
//! availability gate and mounts whichever screen the gate picks.

mod adapters;
mod config;
mod context;
mod error;
mod screens;
mod shell;

use std::sync::Arc;

use anyhow::Context;
use tracing::Instrument;
use tracing_subscriber::EnvFilter;

pub use adapters::LogEventBus;
pub use config::{default_config_path, ConfigError, ShellConfig, API_URL_ENV, CONFIG_PATH_ENV};
pub use context::AppContext;
pub use error::{Result, ShellError};
pub use screens::{Screen, ScreenHost};
pub use shell::Shell;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,storefront=debug")),
        )
        .init();
}

pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    let session = uuid::Uuid::new_v4();
    let span = tracing::info_span!("storefront", %session);

    async move {
        let config = ShellConfig::load().context("failed to load shell configuration")?;
        let ctx = AppContext::new(config, Arc::new(LogEventBus))
            .context("failed to build application context")?;

        let shell = Shell::start(&ctx);

        tokio::signal::ctrl_c()
            .await
            .context("failed to listen for shutdown signal")?;
        tracing::info!(decision = %shell.decision(), "shutting down");

        if let Some(host) = shell.shutdown().await {
            tracing::info!(
                mounted = ?host.mounted(),
                mounts = host.mount_count(),
                "storefront shell stopped"
            );
        }
        Ok::<(), anyhow::Error>(())
    }
    .instrument(span)
    .await
}
