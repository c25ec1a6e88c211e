// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! GKE cluster access and readiness polling.

pub mod poller;
pub mod provider;

pub use poller::{wait_for_cluster, ClusterPolling, ReadyOutcome};
pub use provider::{ClusterProvider, GkeClusterProvider};
