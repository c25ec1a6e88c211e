// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking the Kubernetes API, the GKE API and other collaborators.

use crate::config::FalconSettings;
use crate::error::{ProtectionError, Result as ProtectionResult};
use crate::event::ClusterIdentity;
use crate::gke::ClusterProvider;
use crate::manifest::{ArtifactStore, ManifestSource};
use crate::types::gke::{Autopilot, ClusterStatus, GkeCluster};
use async_trait::async_trait;
use http::{Request, Response};
use http_body_util::BodyExt;
use kube::client::Body;
use kube::Client;
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tower::Service;

#[derive(Clone, Debug)]
enum Reply {
    Canned(u16, String),
    /// Respond with the request body, as the API server does for successful writes
    Echo(u16),
}

#[derive(Clone, Debug)]
struct RecordedRequest {
    method: String,
    path: String,
    body: Vec<u8>,
}

/// A mock HTTP service that returns predefined responses based on request method and path.
/// Every request is recorded in arrival order.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), VecDeque<Reply>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn register(self, method: &str, path: &str, replies: Vec<Reply>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), replies.into());
        self
    }

    /// Add a response for GET requests matching the path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.register("GET", path, vec![Reply::Canned(status, body.to_string())])
    }

    /// Add responses served one per GET request; the last one repeats
    pub fn on_get_sequence(self, path: &str, responses: Vec<(u16, String)>) -> Self {
        let replies = responses
            .into_iter()
            .map(|(status, body)| Reply::Canned(status, body))
            .collect();
        self.register("GET", path, replies)
    }

    /// Add a response for POST requests matching the path
    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.register("POST", path, vec![Reply::Canned(status, body.to_string())])
    }

    /// Answer POST requests matching the path with 201 and the request body
    pub fn on_post_echo(self, path: &str) -> Self {
        self.register("POST", path, vec![Reply::Echo(201)])
    }

    /// Add a response for PATCH requests matching the path
    pub fn on_patch(self, path: &str, status: u16, body: &str) -> Self {
        self.register("PATCH", path, vec![Reply::Canned(status, body.to_string())])
    }

    /// Answer PATCH requests matching the path with 200 and the request body
    pub fn on_patch_echo(self, path: &str) -> Self {
        self.register("PATCH", path, vec![Reply::Echo(200)])
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "https://kubernetes.default.svc")
    }

    /// Paths of all recorded requests with the given method, in order
    pub fn request_paths(&self, method: &str) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method)
            .map(|r| r.path.clone())
            .collect()
    }

    /// `METHOD path` of every recorded request, in order
    pub fn request_log(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect()
    }

    /// JSON bodies of all recorded requests with the given method, in order
    pub fn request_bodies(&self, method: &str) -> Vec<serde_json::Value> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method)
            .map(|r| serde_json::from_slice(&r.body).unwrap_or(serde_json::Value::Null))
            .collect()
    }

    fn next_reply(&self, method: &str, path: &str) -> Option<Reply> {
        let mut responses = self.responses.lock().unwrap();

        // Exact match first, then the longest registered prefix
        let key = (method.to_string(), path.to_string());
        let key = if responses.contains_key(&key) {
            Some(key)
        } else {
            responses
                .keys()
                .filter(|(m, p)| m == method && path.starts_with(p.as_str()))
                .max_by_key(|(_, p)| p.len())
                .cloned()
        }?;

        let queue = responses.get_mut(&key)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

fn json_response(status: u16, body: Vec<u8>) -> Response<Body> {
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let this = self.clone();

        Box::pin(async move {
            let method = req.method().to_string();
            let path = req.uri().path().to_string();
            let body = req
                .into_body()
                .collect()
                .await
                .map_err(tower::BoxError::from)?
                .to_bytes()
                .to_vec();

            let reply = this.next_reply(&method, &path);
            this.requests.lock().unwrap().push(RecordedRequest {
                method,
                path,
                body: body.clone(),
            });

            Ok(match reply {
                Some(Reply::Canned(status, body)) => json_response(status, body.into_bytes()),
                Some(Reply::Echo(status)) => json_response(status, body),
                // Default 404 for unmatched requests
                None => json_response(404, not_found_json("resource", "").into_bytes()),
            })
        })
    }
}

/// Create a mock namespace JSON response
pub fn namespace_json(name: &str) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {
            "name": name,
            "uid": "test-uid"
        }
    })
    .to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

/// Create a discovery response for one group version from `(plural, kind, namespaced)` entries
pub fn api_resource_list_json(group_version: &str, resources: &[(&str, &str, bool)]) -> String {
    let resources: Vec<serde_json::Value> = resources
        .iter()
        .map(|(plural, kind, namespaced)| {
            serde_json::json!({
                "name": plural,
                "singularName": kind.to_lowercase(),
                "namespaced": namespaced,
                "kind": kind,
                "verbs": ["create", "get", "list", "patch"]
            })
        })
        .collect();

    serde_json::json!({
        "kind": "APIResourceList",
        "apiVersion": "v1",
        "groupVersion": group_version,
        "resources": resources
    })
    .to_string()
}

/// Create a pod list with one pod per given phase
pub fn pod_list_json(phases: &[&str]) -> String {
    let items: Vec<serde_json::Value> = phases
        .iter()
        .enumerate()
        .map(|(i, phase)| {
            serde_json::json!({
                "metadata": {"name": format!("falcon-operator-{}", i), "namespace": "falcon-operator"},
                "status": {"phase": phase}
            })
        })
        .collect();

    serde_json::json!({
        "apiVersion": "v1",
        "kind": "PodList",
        "metadata": {"resourceVersion": "1"},
        "items": items
    })
    .to_string()
}

/// Create a FalconDeployment list with the given object names
pub fn falcon_deployment_list_json(names: &[&str]) -> String {
    let items: Vec<serde_json::Value> = names
        .iter()
        .map(|name| {
            serde_json::json!({
                "apiVersion": "falcon.crowdstrike.com/v1alpha1",
                "kind": "FalconDeployment",
                "metadata": {"name": name},
                "spec": {"deployNodeSensor": true}
            })
        })
        .collect();

    serde_json::json!({
        "apiVersion": "falcon.crowdstrike.com/v1alpha1",
        "kind": "FalconDeploymentList",
        "metadata": {"resourceVersion": "1"},
        "items": items
    })
    .to_string()
}

pub fn identity() -> ClusterIdentity {
    ClusterIdentity {
        cluster_name: "demo".to_string(),
        project_id: "proj1".to_string(),
        zone: "us-central1-a".to_string(),
    }
}

pub fn falcon_settings() -> FalconSettings {
    FalconSettings {
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        cloud_region: "us-2".to_string(),
        auto_update: "off".to_string(),
        update_policy: None,
        sensor_version: None,
        sensor_tags: None,
    }
}

/// Cluster provider that replays a status script; the last status repeats
pub struct ScriptedClusterProvider {
    statuses: Mutex<VecDeque<ClusterStatus>>,
    failure: Option<String>,
    client: Option<Client>,
    autopilot: bool,
    lookups: AtomicUsize,
}

impl ScriptedClusterProvider {
    pub fn new(statuses: Vec<ClusterStatus>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into()),
            failure: None,
            client: None,
            autopilot: true,
            lookups: AtomicUsize::new(0),
        }
    }

    /// Provider whose lookups all fail
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new(Vec::new())
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn with_autopilot(mut self, autopilot: bool) -> Self {
        self.autopilot = autopilot;
        self
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClusterProvider for ScriptedClusterProvider {
    async fn get_cluster(&self, identity: &ClusterIdentity) -> ProtectionResult<GkeCluster> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.failure {
            return Err(ProtectionError::CloudApiError(message.clone()));
        }

        let status = {
            let mut statuses = self.statuses.lock().unwrap();
            if statuses.len() > 1 {
                statuses.pop_front()
            } else {
                statuses.front().copied()
            }
        }
        .unwrap_or_default();

        Ok(GkeCluster {
            name: identity.cluster_name.clone(),
            status,
            endpoint: Some("34.1.2.3".to_string()),
            autopilot: Some(Autopilot {
                enabled: self.autopilot,
            }),
            ..Default::default()
        })
    }

    async fn connect(&self, cluster: &GkeCluster) -> ProtectionResult<Client> {
        self.client.clone().ok_or_else(|| {
            ProtectionError::KubeconfigError(format!("No client for cluster {}", cluster.name))
        })
    }
}

/// Manifest source serving a fixed document
pub struct StaticManifestSource(pub String);

#[async_trait]
impl ManifestSource for StaticManifestSource {
    async fn fetch_operator_manifest(&self) -> ProtectionResult<String> {
        Ok(self.0.clone())
    }
}

/// Artifact store keeping everything in memory
#[derive(Default)]
pub struct MemoryStore {
    artifacts: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn get(&self, name: &str) -> Option<String> {
        self.artifacts.lock().unwrap().get(name).cloned()
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn persist(&self, name: &str, contents: &str) -> ProtectionResult<()> {
        self.artifacts
            .lock()
            .unwrap()
            .insert(name.to_string(), contents.to_string());
        Ok(())
    }
}

/// Serve the given raw HTTP responses on a local port, one per connection, in order
pub async fn serve_responses(responses: Vec<(&'static str, String)>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        for (status_line, body) in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await.unwrap();
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        }
    });

    addr
}
