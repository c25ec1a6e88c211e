// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{bail, Context, Result};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::constants::{falcon, polling, urls};
use crate::gke::ClusterPolling;
use crate::kubernetes::PodPolling;
use crate::logging::LogTarget;

/// Service configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub falcon: FalconSettings,
    /// Location of the Falcon operator install manifest
    pub operator_manifest_url: Url,
    pub log_target: LogTarget,
    /// Directory for fetched and rendered manifests, `None` keeps them in memory only
    pub artifact_dir: Option<PathBuf>,
    pub cluster_polling: ClusterPolling,
    pub pod_polling: PodPolling,
    pub invocation_timeout: Duration,
    pub port: u16,
    // For testing, uses the KUBECONFIG env var to reach the cluster instead of its GKE endpoint
    pub testing_mode: bool,
}

/// Falcon API credentials and sensor options rendered into the FalconDeployment
#[derive(Clone, PartialEq, Eq)]
pub struct FalconSettings {
    pub client_id: String,
    pub client_secret: String,
    pub cloud_region: String,
    pub auto_update: String,
    pub update_policy: Option<String>,
    pub sensor_version: Option<String>,
    /// Comma-separated sensor tags, split into a list under `spec.falcon.tags`
    pub sensor_tags: Option<String>,
}

impl fmt::Debug for FalconSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FalconSettings")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("cloud_region", &self.cloud_region)
            .field("auto_update", &self.auto_update)
            .field("update_policy", &self.update_policy)
            .field("sensor_version", &self.sensor_version)
            .field("sensor_tags", &self.sensor_tags)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let falcon = FalconSettings {
            client_id: lookup("FALCON_CLIENT_ID")
                .context("FALCON_CLIENT_ID environment variable not set")?,
            client_secret: lookup("FALCON_CLIENT_SECRET")
                .context("FALCON_CLIENT_SECRET environment variable not set")?,
            cloud_region: lookup("FALCON_CLOUD_REGION")
                .and_then(non_empty)
                .unwrap_or_else(|| falcon::DEFAULT_CLOUD_REGION.to_string()),
            auto_update: lookup("FALCON_AUTO_UPDATE")
                .and_then(non_empty)
                .unwrap_or_else(|| falcon::AUTO_UPDATE_OFF.to_string()),
            update_policy: lookup("FALCON_UPDATE_POLICY").and_then(non_empty),
            sensor_version: lookup("FALCON_SENSOR_VERSION").and_then(non_empty),
            sensor_tags: lookup("FALCON_SENSOR_TAGS").and_then(non_empty),
        };

        let operator_manifest_url = lookup("FALCON_OPERATOR_URL")
            .and_then(non_empty)
            .unwrap_or_else(|| urls::FALCON_OPERATOR.to_string());
        let operator_manifest_url = Url::parse(&operator_manifest_url)
            .with_context(|| format!("FALCON_OPERATOR_URL is not a valid URL: {}", operator_manifest_url))?;

        let log_target = match lookup("ENV").as_deref() {
            Some("LOCAL") => LogTarget::Local,
            _ => LogTarget::Managed,
        };

        // Unset means the function's scratch space, an explicit empty value disables persistence
        let artifact_dir = match lookup("ARTIFACT_DIR") {
            Some(dir) if dir.is_empty() => None,
            Some(dir) => Some(PathBuf::from(dir)),
            None => Some(env::temp_dir()),
        };

        let cluster_polling = ClusterPolling {
            max_checks: parse_or(&lookup, "CLUSTER_STATUS_MAX_CHECKS", polling::CLUSTER_MAX_CHECKS)?,
            interval: Duration::from_secs(parse_or(
                &lookup,
                "CLUSTER_STATUS_INTERVAL_SECS",
                polling::CLUSTER_INTERVAL_SECS,
            )?),
        };

        let pod_polling = PodPolling {
            max_checks: parse_or(&lookup, "POD_READY_MAX_CHECKS", polling::POD_MAX_CHECKS)?,
            interval: Duration::from_secs(parse_or(
                &lookup,
                "POD_READY_INTERVAL_SECS",
                polling::POD_INTERVAL_SECS,
            )?),
        };

        let invocation_timeout = Duration::from_secs(parse_or(
            &lookup,
            "INVOCATION_TIMEOUT_SECS",
            polling::INVOCATION_TIMEOUT_SECS,
        )?);

        let wait_budget = cluster_polling.budget() + pod_polling.budget();
        if invocation_timeout < wait_budget {
            bail!(
                "INVOCATION_TIMEOUT_SECS ({}) is shorter than the polling budgets combined ({} seconds)",
                invocation_timeout.as_secs(),
                wait_budget.as_secs()
            );
        }

        let port = parse_or(&lookup, "PORT", 8080u16)?;
        let testing_mode: bool = lookup("TESTING_MODE")
            .unwrap_or("false".to_string())
            .parse()
            .unwrap_or(false);

        Ok(Config {
            falcon,
            operator_manifest_url,
            log_target,
            artifact_dir,
            cluster_polling,
            pod_polling,
            invocation_timeout,
            port,
            testing_mode,
        })
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key).and_then(non_empty) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{} has an invalid value: {}", key, raw)),
        None => Ok(default),
    }
}
