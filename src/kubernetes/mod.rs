// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for client creation, manifest apply, and the Falcon install steps.

pub mod apply;
pub mod client;
pub mod discovery;
pub mod falcon;
pub mod operator;

pub use apply::apply_manifest;
pub use client::{create_cluster_client, create_testing_client};
pub use discovery::{resolve_kind, ResolvedKind};
pub use falcon::{deploy_falcon, list_falcon_deployments, FalconDeploymentOutcome};
pub use operator::{deploy_operator, wait_for_running_pod, OperatorDeployment, PodPolling};
