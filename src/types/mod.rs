// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Wire types for the GKE API and the Falcon custom resource.

pub mod falcon;
pub mod gke;

pub use falcon::{FalconDeployment, FalconDeploymentSpec};
pub use gke::{ClusterStatus, GkeCluster};
