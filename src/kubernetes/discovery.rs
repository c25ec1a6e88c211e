// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resolving kinds to the API resources the cluster serves them under

use crate::error::Result;
use kube::{
    api::GroupVersionKind,
    discovery::{pinned_kind, ApiResource, Scope},
    Client,
};
use std::collections::HashMap;
use tracing::debug;

/// A served kind together with its scope
#[derive(Debug, Clone)]
pub struct ResolvedKind {
    pub resource: ApiResource,
    pub namespaced: bool,
}

/// Look a kind up in its group version. Only that group version is queried.
pub async fn resolve_kind(client: &Client, gvk: &GroupVersionKind) -> Result<ResolvedKind> {
    let (resource, caps) = pinned_kind(client, gvk).await?;
    let namespaced = matches!(caps.scope, Scope::Namespaced);
    debug!(
        "{} is served as {} ({})",
        gvk.kind,
        resource.plural,
        if namespaced { "namespaced" } else { "cluster-scoped" }
    );

    Ok(ResolvedKind { resource, namespaced })
}

/// Kinds resolved while applying one manifest
#[derive(Default)]
pub struct KindCache {
    resolved: HashMap<GroupVersionKind, ResolvedKind>,
}

impl KindCache {
    pub async fn resolve(&mut self, client: &Client, gvk: &GroupVersionKind) -> Result<ResolvedKind> {
        if let Some(kind) = self.resolved.get(gvk) {
            return Ok(kind.clone());
        }

        let kind = resolve_kind(client, gvk).await?;
        self.resolved.insert(gvk.clone(), kind.clone());
        Ok(kind)
    }
}
