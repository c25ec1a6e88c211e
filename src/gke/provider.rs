// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! GKE cluster lookups and Kubernetes client creation for a cluster

use crate::constants::gcp;
use crate::error::{ProtectionError, Result};
use crate::event::ClusterIdentity;
use crate::kubernetes::{create_cluster_client, create_testing_client};
use crate::types::gke::GkeCluster;
use async_trait::async_trait;
use kube::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

/// Access to the clusters of the cloud provider
#[async_trait]
pub trait ClusterProvider: Send + Sync {
    /// Fetch the current cluster record. Never cached.
    async fn get_cluster(&self, identity: &ClusterIdentity) -> Result<GkeCluster>;

    /// Create a Kubernetes client for a running cluster
    async fn connect(&self, cluster: &GkeCluster) -> Result<Client>;
}

/// Talks to the GKE API with the credentials of the runtime service account
pub struct GkeClusterProvider {
    http: reqwest::Client,
    api_base: String,
    token_url: String,
    testing_mode: bool,
}

#[derive(Deserialize)]
struct AccessToken {
    access_token: String,
}

impl GkeClusterProvider {
    pub fn new(http: reqwest::Client, testing_mode: bool) -> Self {
        Self::with_endpoints(http, gcp::CONTAINER_API, gcp::METADATA_TOKEN_URL, testing_mode)
    }

    pub fn with_endpoints(
        http: reqwest::Client,
        api_base: impl Into<String>,
        token_url: impl Into<String>,
        testing_mode: bool,
    ) -> Self {
        Self {
            http,
            api_base: api_base.into(),
            token_url: token_url.into(),
            testing_mode,
        }
    }

    fn cluster_url(&self, identity: &ClusterIdentity) -> String {
        format!(
            "{}/projects/{}/locations/{}/clusters/{}",
            self.api_base.trim_end_matches('/'),
            identity.project_id,
            identity.zone,
            identity.cluster_name
        )
    }

    /// Get an OAuth access token for the runtime service account from the metadata server
    async fn access_token(&self) -> Result<String> {
        let response = self
            .http
            .get(&self.token_url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| ProtectionError::CloudApiError(format!("Failed to request access token: {}", e)))?;

        if !response.status().is_success() {
            return Err(ProtectionError::CloudApiError(format!(
                "Metadata server returned {} for access token",
                response.status()
            )));
        }

        let token: AccessToken = response
            .json()
            .await
            .map_err(|e| ProtectionError::CloudApiError(format!("Invalid access token response: {}", e)))?;

        Ok(token.access_token)
    }
}

#[async_trait]
impl ClusterProvider for GkeClusterProvider {
    #[instrument(skip(self, identity), fields(cluster = %identity))]
    async fn get_cluster(&self, identity: &ClusterIdentity) -> Result<GkeCluster> {
        let token = self.access_token().await?;
        let url = self.cluster_url(identity);
        debug!("Getting cluster {}", url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ProtectionError::CloudApiError(format!("GET {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProtectionError::CloudApiError(format!(
                "GET {} returned {}: {}",
                url, status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ProtectionError::CloudApiError(format!("Invalid cluster response from {}: {}", url, e)))
    }

    async fn connect(&self, cluster: &GkeCluster) -> Result<Client> {
        if self.testing_mode {
            create_testing_client().await
        } else {
            let token = self.access_token().await?;
            create_cluster_client(cluster, &token).await
        }
    }
}
