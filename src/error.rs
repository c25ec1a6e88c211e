// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtectionError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to build kubeconfig: {0}")]
    KubeconfigError(String),

    #[error("Invalid event payload: {0}")]
    InvalidPayload(String),

    #[error("Cloud API error: {0}")]
    CloudApiError(String),

    #[error("Failed to fetch manifest: {0}")]
    ManifestFetchError(String),

    #[error("Invalid manifest: {0}")]
    ManifestParseError(String),

    #[error("Cluster not ready: {0}")]
    ClusterNotReady(String),

    #[error("Pods not ready: {0}")]
    PodsNotReady(String),

    #[error("YAML serialization failed: {0}")]
    SerializationError(#[from] serde_yaml::Error),

    #[error("JSON conversion failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invocation timed out after {0} seconds")]
    Timeout(u64),
}

impl ProtectionError {
    /// Whether redelivering the same event can never succeed
    pub fn is_permanent(&self) -> bool {
        matches!(self, ProtectionError::InvalidPayload(_))
    }
}

pub type Result<T> = std::result::Result<T, ProtectionError>;
