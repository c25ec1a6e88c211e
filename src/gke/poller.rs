// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Waiting for a freshly created cluster to reach the RUNNING state

use crate::error::Result;
use crate::event::ClusterIdentity;
use crate::gke::ClusterProvider;
use crate::types::gke::{ClusterStatus, GkeCluster};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// Budget for cluster status lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterPolling {
    /// Total number of status lookups, including the first one
    pub max_checks: u32,
    /// Delay after each lookup that did not settle the outcome
    pub interval: Duration,
}

impl ClusterPolling {
    /// Longest time spent sleeping between lookups
    pub fn budget(&self) -> Duration {
        self.interval * self.max_checks.saturating_sub(1)
    }
}

/// How waiting for a cluster ended
#[derive(Debug, Clone)]
pub enum ReadyOutcome {
    /// The cluster is running; carries the record from the final lookup
    Running(GkeCluster),
    /// The cluster is in a state it will not leave towards RUNNING
    Unmanageable(ClusterStatus),
    /// The lookup budget ran out while the cluster was still settling
    TimedOut { checks: u32 },
}

/// Poll the cluster status until it is running, unmanageable, or the budget is spent.
/// Lookup errors abort the wait.
#[instrument(skip(provider, identity), fields(cluster = %identity))]
pub async fn wait_for_cluster<P>(
    provider: &P,
    identity: &ClusterIdentity,
    polling: ClusterPolling,
) -> Result<ReadyOutcome>
where
    P: ClusterProvider + ?Sized,
{
    for check in 1..=polling.max_checks {
        let cluster = provider.get_cluster(identity).await?;
        debug!("Cluster status: {} (check {}/{})", cluster.status, check, polling.max_checks);

        match cluster.status {
            ClusterStatus::Running => {
                info!("Cluster is running");
                return Ok(ReadyOutcome::Running(cluster));
            }
            status if status.is_unmanageable() => {
                warn!("Cluster in unmanageable state: {}", status);
                return Ok(ReadyOutcome::Unmanageable(status));
            }
            status => {
                if check < polling.max_checks {
                    info!(
                        "Cluster in {} state, checking again in {} seconds",
                        status,
                        polling.interval.as_secs()
                    );
                    sleep(polling.interval).await;
                }
            }
        }
    }

    warn!(
        "Cluster did not reach RUNNING after {} status checks",
        polling.max_checks
    );
    Ok(ReadyOutcome::TimedOut {
        checks: polling.max_checks,
    })
}
