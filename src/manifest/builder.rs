// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Rendering of the FalconDeployment custom resource from configuration

use crate::config::FalconSettings;
use crate::constants::falcon::{AUTO_UPDATE_OFF, DEPLOYMENT_NAME};
use crate::error::Result;
use crate::types::falcon::{
    FalconApi, FalconDeployment, FalconDeploymentSpec, FalconNodeSensor, FalconSensor,
    GkeSettings, NodeAdvanced, NodeConfig, NodeResources, ResourceRequests, Toleration,
};
use tracing::{debug, info};

/// Build the FalconDeployment for a cluster. Pure apart from logging.
pub fn build_falcon_deployment(settings: &FalconSettings, autopilot: bool) -> FalconDeployment {
    let mut node = NodeConfig {
        advanced: node_advanced(settings),
        version: settings.sensor_version.clone(),
        ..Default::default()
    };

    if let Some(version) = &node.version {
        info!("Pinning sensor version to: {}", version);
    }

    if autopilot {
        apply_autopilot(&mut node);
    }

    // Tags belong to the shared sensor settings, never to the node sensor
    let tags = parse_tags(settings.sensor_tags.as_deref());
    let falcon = if tags.is_empty() {
        None
    } else {
        info!("Adding sensor tags: {}", tags.join(","));
        Some(FalconSensor { tags })
    };

    FalconDeployment::new(
        DEPLOYMENT_NAME,
        FalconDeploymentSpec {
            falcon_api: FalconApi {
                client_id: settings.client_id.clone(),
                client_secret: settings.client_secret.clone(),
                cloud_region: settings.cloud_region.clone(),
            },
            deploy_admission_controller: true,
            deploy_node_sensor: true,
            deploy_image_analyzer: false,
            deploy_container_sensor: false,
            falcon,
            falcon_node_sensor: FalconNodeSensor { node },
        },
    )
}

/// Serialize a FalconDeployment to YAML
pub fn render(deployment: &FalconDeployment) -> Result<String> {
    let yaml = serde_yaml::to_string(deployment)?;
    debug!("Generated manifest with {} bytes", yaml.len());
    Ok(yaml)
}

fn node_advanced(settings: &FalconSettings) -> Option<NodeAdvanced> {
    let auto_update = Some(settings.auto_update.as_str())
        .filter(|mode| *mode != AUTO_UPDATE_OFF)
        .map(str::to_string);
    let update_policy = settings.update_policy.clone();

    if auto_update.is_none() && update_policy.is_none() {
        return None;
    }

    if let Some(mode) = &auto_update {
        info!("Auto-update enabled with mode: {}", mode);
    }
    if let Some(policy) = &update_policy {
        info!("Using update policy: {}", policy);
    }

    Some(NodeAdvanced {
        auto_update,
        update_policy,
    })
}

/// Autopilot nodes only admit eBPF sensors with explicit requests and must tolerate the arch taint
fn apply_autopilot(node: &mut NodeConfig) {
    node.backend = Some("bpf".to_string());
    node.gke = Some(GkeSettings { autopilot: true });
    node.resources = Some(NodeResources {
        requests: ResourceRequests {
            cpu: "750m".to_string(),
            memory: "1.5Gi".to_string(),
        },
    });
    node.tolerations = vec![Toleration {
        effect: "NoSchedule".to_string(),
        operator: "Equal".to_string(),
        key: "kubernetes.io/arch".to_string(),
        value: "amd64".to_string(),
    }];
}

fn parse_tags(raw: Option<&str>) -> Vec<String> {
    raw.map(|tags| {
        tags.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}
