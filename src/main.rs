// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use cluster_protection::config::Config;
use cluster_protection::gke::GkeClusterProvider;
use cluster_protection::handler::ProtectionHandler;
use cluster_protection::logging;
use cluster_protection::manifest::{ArtifactStore, DirectoryStore, DiscardStore, HttpManifestSource};
use cluster_protection::server;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    // Initialize tracing
    logging::init(config.log_target)?;

    info!("Starting cluster protection service");
    info!(
        "Configuration loaded: operator_manifest_url={}, cloud_region={}, testing_mode={}",
        config.operator_manifest_url, config.falcon.cloud_region, config.testing_mode
    );

    let http = reqwest::Client::builder()
        .user_agent(concat!("cluster-protection/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    let artifacts: Arc<dyn ArtifactStore> = match &config.artifact_dir {
        Some(dir) => {
            info!("Keeping manifests in {}", dir.display());
            Arc::new(DirectoryStore::new(dir))
        }
        None => Arc::new(DiscardStore),
    };

    let handler = ProtectionHandler::new(
        config.clone(),
        Arc::new(GkeClusterProvider::new(http.clone(), config.testing_mode)),
        Arc::new(HttpManifestSource::new(http, config.operator_manifest_url.clone())),
        artifacts,
    );

    server::serve(Arc::new(handler), config.port).await
}
