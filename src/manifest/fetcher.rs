// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Retrieval of the externally hosted operator install manifest

use crate::error::{ProtectionError, Result};
use async_trait::async_trait;
use tracing::{info, instrument};
use url::Url;

/// Source of the operator install manifest
#[async_trait]
pub trait ManifestSource: Send + Sync {
    async fn fetch_operator_manifest(&self) -> Result<String>;
}

/// Downloads the manifest over HTTP(S). No retries and no validation: the document is trusted.
pub struct HttpManifestSource {
    http: reqwest::Client,
    url: Url,
}

impl HttpManifestSource {
    pub fn new(http: reqwest::Client, url: Url) -> Self {
        Self { http, url }
    }
}

#[async_trait]
impl ManifestSource for HttpManifestSource {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch_operator_manifest(&self) -> Result<String> {
        info!("Downloading operator manifest");

        let response = self
            .http
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| ProtectionError::ManifestFetchError(format!("GET {} failed: {}", self.url, e)))?;

        if !response.status().is_success() {
            return Err(ProtectionError::ManifestFetchError(format!(
                "GET {} returned {}",
                self.url,
                response.status()
            )));
        }

        response.text().await.map_err(|e| {
            ProtectionError::ManifestFetchError(format!("Failed to read body of {}: {}", self.url, e))
        })
    }
}
