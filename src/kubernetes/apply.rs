// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Server-side apply of multi-document YAML manifests

use crate::constants::{DEFAULT_NAMESPACE, FIELD_MANAGER};
use crate::error::{ProtectionError, Result};
use crate::kubernetes::discovery::KindCache;
use kube::{
    api::{Api, DynamicObject, GroupVersionKind, Patch, PatchParams},
    Client,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

/// One object of a manifest, with the coordinates needed to address it
#[derive(Debug, PartialEq)]
struct ManifestObject {
    gvk: GroupVersionKind,
    name: String,
    namespace: Option<String>,
    body: Value,
}

/// Apply every object of a (multi-document) YAML manifest, in document order.
/// Scope comes from the cluster's discovery data: namespaced kinds without a
/// namespace land in `default`, a namespace on a cluster-scoped kind is ignored.
/// Returns the number of applied objects.
#[instrument(skip(client, manifest))]
pub async fn apply_manifest(client: &Client, manifest: &str) -> Result<usize> {
    let objects = parse_manifest(manifest)?;
    info!("Applying {} objects", objects.len());

    let params = PatchParams::apply(FIELD_MANAGER).force();
    let mut kinds = KindCache::default();
    for object in &objects {
        let kind = kinds.resolve(client, &object.gvk).await?;
        let namespace = kind
            .namespaced
            .then(|| object.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE));
        let api: Api<DynamicObject> = match namespace {
            Some(ns) => Api::namespaced_with(client.clone(), ns, &kind.resource),
            None => Api::all_with(client.clone(), &kind.resource),
        };

        api.patch(&object.name, &params, &Patch::Apply(&object.body))
            .await?;
        debug!("Applied {}/{} {}", object.gvk.kind, object.name, namespace.unwrap_or(""));
    }

    Ok(objects.len())
}

/// Split a manifest into objects, skipping empty documents
fn parse_manifest(manifest: &str) -> Result<Vec<ManifestObject>> {
    let mut objects = Vec::new();

    for document in serde_yaml::Deserializer::from_str(manifest) {
        let body = Value::deserialize(document)
            .map_err(|e| ProtectionError::ManifestParseError(format!("Invalid YAML document: {}", e)))?;
        if body.is_null() {
            continue;
        }
        objects.push(manifest_object(body)?);
    }

    Ok(objects)
}

fn manifest_object(body: Value) -> Result<ManifestObject> {
    let field = |pointer: &str| body.pointer(pointer).and_then(Value::as_str).map(str::to_string);
    let missing = |what: &str| ProtectionError::ManifestParseError(format!("Object without {}: {}", what, body));

    let api_version = field("/apiVersion").ok_or_else(|| missing("apiVersion"))?;
    let kind = field("/kind").ok_or_else(|| missing("kind"))?;
    let name = field("/metadata/name").ok_or_else(|| missing("metadata.name"))?;
    let namespace = field("/metadata/namespace");

    let (group, version) = match api_version.split_once('/') {
        Some((group, version)) => (group.to_string(), version.to_string()),
        None => (String::new(), api_version),
    };

    Ok(ManifestObject {
        gvk: GroupVersionKind::gvk(&group, &version, &kind),
        name,
        namespace,
        body,
    })
}
