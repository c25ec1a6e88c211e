// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! One protection run: from the triggering event to an installed Falcon deployment.

use crate::config::Config;
use crate::constants::{artifacts, OPERATOR_NAMESPACE};
use crate::error::{ProtectionError, Result};
use crate::event::{ClusterIdentity, PushEnvelope};
use crate::gke::{wait_for_cluster, ClusterProvider, ReadyOutcome};
use crate::kubernetes::{deploy_falcon, deploy_operator, FalconDeploymentOutcome, OperatorDeployment};
use crate::manifest::{build_falcon_deployment, render, ArtifactStore, ManifestSource};
use crate::types::gke::ClusterStatus;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// How an invocation ended successfully
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationOutcome {
    Protected {
        cluster: ClusterIdentity,
        operator: OperatorDeployment,
        falcon: FalconDeploymentOutcome,
    },
    /// The cluster is being torn down or broken; nothing was changed
    Unmanageable {
        cluster: ClusterIdentity,
        status: ClusterStatus,
    },
}

/// Sequences cluster readiness, manifest preparation and the two install steps
pub struct ProtectionHandler {
    config: Config,
    clusters: Arc<dyn ClusterProvider>,
    manifests: Arc<dyn ManifestSource>,
    artifacts: Arc<dyn ArtifactStore>,
}

impl ProtectionHandler {
    pub fn new(
        config: Config,
        clusters: Arc<dyn ClusterProvider>,
        manifests: Arc<dyn ManifestSource>,
        artifacts: Arc<dyn ArtifactStore>,
    ) -> Self {
        Self {
            config,
            clusters,
            manifests,
            artifacts,
        }
    }

    /// Handle one delivered event within the configured deadline
    pub async fn handle(&self, envelope: &PushEnvelope) -> Result<InvocationOutcome> {
        let deadline = self.config.invocation_timeout;

        let result = match tokio::time::timeout(deadline, self.run(envelope)).await {
            Ok(result) => result,
            Err(_) => Err(ProtectionError::Timeout(deadline.as_secs())),
        };

        if let Err(e) = &result {
            error!("Unexpected error handling event: {}", e);
        }
        result
    }

    #[instrument(skip(self, envelope), fields(message_id = envelope.message.message_id.as_deref().unwrap_or("")))]
    async fn run(&self, envelope: &PushEnvelope) -> Result<InvocationOutcome> {
        let payload = envelope.decode_payload()?;
        let identity = payload.cluster_identity()?;

        info!("asset name: {}", payload.asset.name);
        info!(
            cluster_name = %identity.cluster_name,
            project_id = %identity.project_id,
            zone = %identity.zone,
            "Cluster identified"
        );

        let polling = self.config.cluster_polling;
        let cluster = match wait_for_cluster(self.clusters.as_ref(), &identity, polling).await? {
            ReadyOutcome::Running(cluster) => cluster,
            ReadyOutcome::Unmanageable(status) => {
                warn!("Cluster {} in unmanageable state: {}... Exiting", identity, status);
                return Ok(InvocationOutcome::Unmanageable {
                    cluster: identity,
                    status,
                });
            }
            ReadyOutcome::TimedOut { checks } => {
                return Err(ProtectionError::ClusterNotReady(format!(
                    "Cluster {} not RUNNING after {} status checks",
                    identity, checks
                )));
            }
        };

        let operator_manifest = self.manifests.fetch_operator_manifest().await?;
        self.artifacts
            .persist(artifacts::OPERATOR_MANIFEST, &operator_manifest)
            .await?;

        // Autopilot settings (bpf backend, fixed resources, amd64 toleration) follow the
        // cluster's own mode; standard clusters get a FalconDeployment without them.
        let deployment = build_falcon_deployment(&self.config.falcon, cluster.is_autopilot());
        let rendered = render(&deployment)?;
        self.artifacts
            .persist(artifacts::FALCON_MANIFEST, &rendered)
            .await?;

        let client = self.clusters.connect(&cluster).await?;

        let operator = deploy_operator(
            &client,
            OPERATOR_NAMESPACE,
            &operator_manifest,
            self.config.pod_polling,
        )
        .await?;
        let falcon = deploy_falcon(&client, OPERATOR_NAMESPACE, &deployment).await?;

        info!("Cluster {} protected", identity.cluster_name);
        Ok(InvocationOutcome::Protected {
            cluster: identity,
            operator,
            falcon,
        })
    }
}
