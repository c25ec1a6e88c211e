// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! FalconDeployment idempotency check and creation

use crate::error::Result;
use crate::kubernetes::resolve_kind;
use crate::types::falcon::FalconDeployment;
use kube::{
    api::{DynamicObject, GroupVersionKind, ListParams, PostParams},
    discovery::ApiResource,
    Api, Client, ResourceExt,
};
use tracing::{debug, info, instrument};

/// What the Falcon deployment step did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FalconDeploymentOutcome {
    /// Another FalconDeployment exists; the first one wins
    AlreadyPresent { count: usize },
    Created { name: String },
}

/// List all FalconDeployments in the cluster. A missing resource type counts as none.
#[instrument(skip(client))]
pub async fn list_falcon_deployments(client: &Client) -> Result<Vec<DynamicObject>> {
    info!("Checking to see if there are existing Falcon deployments");

    // Listed untyped so deployments written by other tools never fail to decode
    let resource = ApiResource::erase::<FalconDeployment>(&());
    let deployments: Api<DynamicObject> = Api::all_with(client.clone(), &resource);

    match deployments.list(&ListParams::default()).await {
        Ok(list) => Ok(list.items),
        Err(kube::Error::Api(err)) if err.code == 404 => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

/// Create the FalconDeployment unless one already exists anywhere in the cluster.
/// The kind's scope is looked up first: `namespace` is used only when the
/// installed CRD is namespaced, as released operator CRDs are cluster-scoped.
#[instrument(skip(client, deployment), fields(name = %deployment.name_any()))]
pub async fn deploy_falcon(
    client: &Client,
    namespace: &str,
    deployment: &FalconDeployment,
) -> Result<FalconDeploymentOutcome> {
    let existing = list_falcon_deployments(client).await?;
    if !existing.is_empty() {
        info!(
            "There are {} existing Falcon deployments, not creating another",
            existing.len()
        );
        return Ok(FalconDeploymentOutcome::AlreadyPresent {
            count: existing.len(),
        });
    }

    info!("There are no existing Falcon deployments, deploying Falcon");
    let erased = ApiResource::erase::<FalconDeployment>(&());
    let kind = resolve_kind(
        client,
        &GroupVersionKind::gvk(&erased.group, &erased.version, &erased.kind),
    )
    .await?;

    let api: Api<DynamicObject> = if kind.namespaced {
        Api::namespaced_with(client.clone(), namespace, &kind.resource)
    } else {
        debug!("FalconDeployment is cluster-scoped, ignoring namespace {}", namespace);
        Api::all_with(client.clone(), &kind.resource)
    };
    let object: DynamicObject = serde_json::from_value(serde_json::to_value(deployment)?)?;
    let created = api.create(&PostParams::default(), &object).await?;

    Ok(FalconDeploymentOutcome::Created {
        name: created.name_any(),
    })
}
