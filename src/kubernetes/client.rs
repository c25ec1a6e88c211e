// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes client creation for GKE clusters

use crate::error::{ProtectionError, Result};
use crate::types::gke::GkeCluster;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config as KConfig};
use tracing::{debug, info, instrument};

/// Create a client for a GKE cluster from its public endpoint, using a bearer token
#[instrument(skip(cluster, access_token), fields(cluster = %cluster.name))]
pub async fn create_cluster_client(cluster: &GkeCluster, access_token: &str) -> Result<Client> {
    let kubeconfig = cluster_kubeconfig(cluster, access_token)?;
    info!("Creating client for cluster '{}'", cluster.name);
    create_client_from_kubeconfig(kubeconfig).await
}

/// Create a client from the local environment (KUBECONFIG or in-cluster config)
pub async fn create_testing_client() -> Result<Client> {
    let c = KConfig::infer()
        .await
        .map_err(|e| ProtectionError::KubeconfigError(format!("Failed to infer config: {}", e)))?;
    debug!("Testing mode: connecting to {}", c.cluster_url);

    Client::try_from(c)
        .map_err(|e| ProtectionError::KubeconfigError(format!("Failed to create client: {}", e)))
}

/// Build a single-context kubeconfig for a GKE cluster
fn cluster_kubeconfig(cluster: &GkeCluster, access_token: &str) -> Result<Kubeconfig> {
    let Some(endpoint) = cluster.endpoint.as_deref().filter(|e| !e.is_empty()) else {
        return Err(ProtectionError::KubeconfigError(format!(
            "Cluster {} has no endpoint",
            cluster.name
        )));
    };

    let Some(ca_data) = cluster.ca_certificate() else {
        return Err(ProtectionError::KubeconfigError(format!(
            "Cluster {} has no CA certificate",
            cluster.name
        )));
    };

    let name = format!("gke-{}", cluster.name);
    let kubeconfig = serde_json::json!({
        "apiVersion": "v1",
        "kind": "Config",
        "clusters": [{
            "name": name,
            "cluster": {
                "server": format!("https://{}", endpoint),
                "certificate-authority-data": ca_data,
            }
        }],
        "users": [{
            "name": name,
            "user": { "token": access_token }
        }],
        "contexts": [{
            "name": name,
            "context": { "cluster": name, "user": name }
        }],
        "current-context": name,
    });

    serde_json::from_value(kubeconfig)
        .map_err(|e| ProtectionError::KubeconfigError(format!("Failed to parse kubeconfig: {}", e)))
}

/// Create a Kubernetes client from a parsed kubeconfig
async fn create_client_from_kubeconfig(kubeconfig: Kubeconfig) -> Result<Client> {
    let client_config = KConfig::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|e| ProtectionError::KubeconfigError(format!("Failed to create config: {}", e)))?;

    Client::try_from(client_config)
        .map_err(|e| ProtectionError::KubeconfigError(format!("Failed to create client: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::gke::{ClusterStatus, MasterAuth};

    fn make_cluster(endpoint: Option<&str>, ca: Option<&str>) -> GkeCluster {
        GkeCluster {
            name: "demo".to_string(),
            status: ClusterStatus::Running,
            endpoint: endpoint.map(str::to_string),
            master_auth: Some(MasterAuth {
                cluster_ca_certificate: ca.map(str::to_string),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_cluster_kubeconfig() {
        let cluster = make_cluster(Some("34.1.2.3"), Some("Q0E="));

        let kubeconfig = cluster_kubeconfig(&cluster, "token").unwrap();

        assert_eq!(kubeconfig.current_context.as_deref(), Some("gke-demo"));
        let named = &kubeconfig.clusters[0];
        assert_eq!(named.name, "gke-demo");
        let server = named.cluster.as_ref().unwrap();
        assert_eq!(server.server.as_deref(), Some("https://34.1.2.3"));
        assert_eq!(server.certificate_authority_data.as_deref(), Some("Q0E="));
        assert_eq!(kubeconfig.auth_infos[0].name, "gke-demo");
    }

    #[test]
    fn test_cluster_kubeconfig_requires_endpoint() {
        let cluster = make_cluster(None, Some("Q0E="));

        assert!(matches!(
            cluster_kubeconfig(&cluster, "token"),
            Err(ProtectionError::KubeconfigError(_))
        ));
    }

    #[test]
    fn test_cluster_kubeconfig_requires_ca() {
        let cluster = make_cluster(Some("34.1.2.3"), None);

        assert!(matches!(
            cluster_kubeconfig(&cluster, "token"),
            Err(ProtectionError::KubeconfigError(_))
        ));
    }
}
