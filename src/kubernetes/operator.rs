// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Falcon operator installation and readiness

use crate::error::{ProtectionError, Result};
use crate::kubernetes::apply_manifest;
use k8s_openapi::api::core::v1::{Namespace, Pod};
use kube::{api::ListParams, Api, Client};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument};

/// Budget for waiting on operator pods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PodPolling {
    /// Total number of pod listings, including the first one
    pub max_checks: u32,
    pub interval: Duration,
}

impl PodPolling {
    /// Longest time spent sleeping between listings
    pub fn budget(&self) -> Duration {
        self.interval * self.max_checks.saturating_sub(1)
    }
}

/// What the operator step did before its pods became ready
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorDeployment {
    /// The namespace already held pods, nothing was applied
    Skipped,
    Applied { objects: usize },
}

/// Check if the namespace exists and holds at least one pod
#[instrument(skip(client))]
pub async fn operator_resources_deployed(client: &Client, namespace: &str) -> Result<bool> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    match namespaces.get(namespace).await {
        Ok(_) => debug!("Namespace {} exists", namespace),
        Err(kube::Error::Api(err)) if err.code == 404 => {
            debug!("Namespace {} does not exist", namespace);
            return Ok(false);
        }
        Err(e) => return Err(e.into()),
    }

    let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);
    let pod_list = pods.list(&ListParams::default()).await?;
    Ok(!pod_list.items.is_empty())
}

/// Check if any pod in the namespace is in the Running phase
pub async fn any_pod_running(client: &Client, namespace: &str) -> Result<bool> {
    let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);
    let pod_list = pods.list(&ListParams::default()).await?;

    Ok(pod_list.items.iter().any(|pod| {
        pod.status
            .as_ref()
            .and_then(|s| s.phase.as_deref())
            .is_some_and(|phase| phase == "Running")
    }))
}

/// Wait until at least one pod in the namespace is running
#[instrument(skip(client))]
pub async fn wait_for_running_pod(client: &Client, namespace: &str, polling: PodPolling) -> Result<()> {
    info!("Checking to see if pods in {} are ready", namespace);

    for check in 1..=polling.max_checks {
        if any_pod_running(client, namespace).await? {
            info!("Pods are in ready state");
            return Ok(());
        }

        if check < polling.max_checks {
            info!(
                "Pods are not yet ready. Sleeping for {} seconds",
                polling.interval.as_secs()
            );
            sleep(polling.interval).await;
        }
    }

    Err(ProtectionError::PodsNotReady(format!(
        "No running pod in namespace {} after {} checks",
        namespace, polling.max_checks
    )))
}

/// Apply the operator manifest unless the operator namespace already holds pods,
/// then wait for the operator to run.
#[instrument(skip(client, manifest))]
pub async fn deploy_operator(
    client: &Client,
    namespace: &str,
    manifest: &str,
    polling: PodPolling,
) -> Result<OperatorDeployment> {
    let deployment = if operator_resources_deployed(client, namespace).await? {
        info!("Pod resources exist in {}, skipping deployment", namespace);
        OperatorDeployment::Skipped
    } else {
        info!("Deploying Falcon operator");
        let objects = apply_manifest(client, manifest).await?;
        OperatorDeployment::Applied { objects }
    };

    wait_for_running_pod(client, namespace, polling).await?;
    Ok(deployment)
}
