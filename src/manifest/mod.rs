// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Falcon manifests: rendering the deployment, fetching the operator, keeping artifacts.

pub mod builder;
pub mod fetcher;
pub mod store;

pub use builder::{build_falcon_deployment, render};
pub use fetcher::{HttpManifestSource, ManifestSource};
pub use store::{ArtifactStore, DirectoryStore, DiscardStore};
