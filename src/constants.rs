// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// The field manager used for server-side apply
pub const FIELD_MANAGER: &str = "cluster-protection";

/// Namespace for namespaced manifest objects that do not name one
pub const DEFAULT_NAMESPACE: &str = "default";

/// Namespace the Falcon operator installs itself into
pub const OPERATOR_NAMESPACE: &str = "falcon-operator";

/// Remote Falcon descriptors
pub mod urls {
    /// Operator install manifest, applied to every protected cluster
    pub const FALCON_OPERATOR: &str =
        "https://github.com/crowdstrike/falcon-operator/releases/latest/download/falcon-operator.yaml";
    /// Standalone admission controller sample (the FalconDeployment covers it)
    pub const FALCON_ADMISSION_CONTROLLER: &str =
        "https://raw.githubusercontent.com/crowdstrike/falcon-operator/main/docs/deployment/gke/falconadmission.yaml";
    /// Standalone node sensor sample (the FalconDeployment covers it)
    pub const NODE_SENSOR_SAMPLE: &str =
        "https://raw.githubusercontent.com/crowdstrike/falcon-operator/main/config/samples/falcon_v1alpha1_falconnodesensor.yaml";
}

/// FalconDeployment custom resource defaults
pub mod falcon {
    pub const DEPLOYMENT_NAME: &str = "falcon-deployment";
    pub const DEFAULT_CLOUD_REGION: &str = "us-2";
    /// Auto-update mode that leaves the sensor version alone
    pub const AUTO_UPDATE_OFF: &str = "off";
}

/// Google Cloud endpoints
pub mod gcp {
    pub const CONTAINER_API: &str = "https://container.googleapis.com/v1";
    pub const METADATA_TOKEN_URL: &str =
        "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";
}

/// Polling configuration
pub mod polling {
    /// Number of cluster status lookups before giving up
    pub const CLUSTER_MAX_CHECKS: u32 = 20;
    /// Delay between cluster status lookups in seconds
    pub const CLUSTER_INTERVAL_SECS: u64 = 60;
    /// Number of pod listings before giving up on the operator
    pub const POD_MAX_CHECKS: u32 = 60;
    /// Delay between pod listings in seconds
    pub const POD_INTERVAL_SECS: u64 = 10;
    /// Deadline for one whole invocation in seconds, above both default polling budgets combined
    pub const INVOCATION_TIMEOUT_SECS: u64 = 1800;
}

/// File names of the artifacts kept in ephemeral storage
pub mod artifacts {
    pub const OPERATOR_MANIFEST: &str = "falcon_operator.yaml";
    pub const FALCON_MANIFEST: &str = "node_sensor_manifest.yaml";
}
