// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// Desired Falcon installation, reconciled by the Falcon operator
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
#[kube(group = "falcon.crowdstrike.com", version = "v1alpha1", kind = "FalconDeployment")]
#[serde(rename_all = "camelCase")]
pub struct FalconDeploymentSpec {
    #[serde(rename = "falcon_api")]
    pub falcon_api: FalconApi,
    pub deploy_admission_controller: bool,
    pub deploy_node_sensor: bool,
    pub deploy_image_analyzer: bool,
    pub deploy_container_sensor: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub falcon: Option<FalconSensor>,
    pub falcon_node_sensor: FalconNodeSensor,
}

/// Falcon API credentials, snake_case on the wire
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
pub struct FalconApi {
    pub client_id: String,
    pub client_secret: String,
    pub cloud_region: String,
}

/// Sensor settings shared by every sensor kind
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct FalconSensor {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct FalconNodeSensor {
    pub node: NodeConfig,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct NodeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advanced: Option<NodeAdvanced>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gke: Option<GkeSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<NodeResources>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tolerations: Vec<Toleration>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NodeAdvanced {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_update: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_policy: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct GkeSettings {
    pub autopilot: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct NodeResources {
    pub requests: ResourceRequests,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct ResourceRequests {
    pub cpu: String,
    pub memory: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct Toleration {
    pub effect: String,
    pub operator: String,
    pub key: String,
    pub value: String,
}
