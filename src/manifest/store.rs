// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Persistence of fetched and rendered manifests for later inspection

use crate::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

/// Destination for manifests produced during an invocation
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn persist(&self, name: &str, contents: &str) -> Result<()>;
}

/// Writes each artifact to `<root>/<name>`, replacing earlier versions
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ArtifactStore for DirectoryStore {
    async fn persist(&self, name: &str, contents: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.root.join(name);
        tokio::fs::write(&path, contents).await?;
        debug!("Wrote {} bytes to {}", contents.len(), path.display());
        Ok(())
    }
}

/// Keeps nothing
pub struct DiscardStore;

#[async_trait]
impl ArtifactStore for DiscardStore {
    async fn persist(&self, _name: &str, _contents: &str) -> Result<()> {
        Ok(())
    }
}
