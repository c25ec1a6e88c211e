// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cluster resource as returned by the GKE `projects.locations.clusters.get` call.
/// Only the fields needed to wait for and reach the cluster are modelled.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct GkeCluster {
    pub name: String,
    #[serde(default)]
    pub status: ClusterStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    /// IP address or hostname of the control plane
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_auth: Option<MasterAuth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autopilot: Option<Autopilot>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct MasterAuth {
    /// Base64 encoded PEM of the cluster root certificate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_ca_certificate: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Autopilot {
    #[serde(default)]
    pub enabled: bool,
}

/// Lifecycle state of a GKE cluster
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClusterStatus {
    #[default]
    StatusUnspecified,
    Provisioning,
    Running,
    Reconciling,
    Stopping,
    Error,
    Degraded,
    /// A state this service does not know about yet
    #[serde(other)]
    Unknown,
}

impl ClusterStatus {
    /// States from which the cluster will never become protectable
    pub fn is_unmanageable(self) -> bool {
        matches!(
            self,
            ClusterStatus::Stopping
                | ClusterStatus::Error
                | ClusterStatus::Degraded
                | ClusterStatus::StatusUnspecified
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ClusterStatus::StatusUnspecified => "STATUS_UNSPECIFIED",
            ClusterStatus::Provisioning => "PROVISIONING",
            ClusterStatus::Running => "RUNNING",
            ClusterStatus::Reconciling => "RECONCILING",
            ClusterStatus::Stopping => "STOPPING",
            ClusterStatus::Error => "ERROR",
            ClusterStatus::Degraded => "DEGRADED",
            ClusterStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ClusterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl GkeCluster {
    pub fn is_running(&self) -> bool {
        self.status == ClusterStatus::Running
    }

    pub fn is_autopilot(&self) -> bool {
        self.autopilot.as_ref().is_some_and(|a| a.enabled)
    }

    /// Get the base64 encoded cluster CA certificate, if present
    pub fn ca_certificate(&self) -> Option<&str> {
        self.master_auth
            .as_ref()
            .and_then(|m| m.cluster_ca_certificate.as_deref())
            .filter(|c| !c.is_empty())
    }
}
