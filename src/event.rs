// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Decoding of the asset-change event that triggers a protection run.

use crate::error::{ProtectionError, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Asset name segment positions, e.g.
/// `//container.googleapis.com/projects/<project>/locations/<zone>/clusters/<name>`
const PROJECT_SEGMENT: usize = 4;
const ZONE_SEGMENT: usize = 6;
const CLUSTER_SEGMENT: usize = 8;

/// Pub/Sub push request body
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PushEnvelope {
    pub message: PushMessage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    /// Base64 encoded JSON payload
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, String>>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EventPayload {
    pub asset: Asset,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Asset {
    pub name: String,
}

/// The cluster an event refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterIdentity {
    pub cluster_name: String,
    pub project_id: String,
    pub zone: String,
}

impl fmt::Display for ClusterIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.project_id, self.zone, self.cluster_name)
    }
}

impl PushEnvelope {
    /// Wrap an event payload the way the push subscription delivers it
    pub fn from_payload(payload: &EventPayload) -> Result<Self> {
        let json = serde_json::to_vec(payload)
            .map_err(|e| ProtectionError::InvalidPayload(format!("Failed to encode payload: {}", e)))?;

        Ok(PushEnvelope {
            message: PushMessage {
                data: STANDARD.encode(json),
                message_id: None,
                attributes: None,
            },
            subscription: None,
        })
    }

    /// Decode the base64 JSON payload carried by the message
    pub fn decode_payload(&self) -> Result<EventPayload> {
        let raw = STANDARD.decode(self.message.data.trim()).map_err(|e| {
            ProtectionError::InvalidPayload(format!("Message data is not valid base64: {}", e))
        })?;

        serde_json::from_slice(&raw).map_err(|e| {
            ProtectionError::InvalidPayload(format!("Message data is not a valid asset event: {}", e))
        })
    }
}

impl EventPayload {
    pub fn for_asset(name: impl Into<String>) -> Self {
        EventPayload {
            asset: Asset { name: name.into() },
        }
    }

    /// Extract project, zone and cluster name from the fixed asset name segments
    pub fn cluster_identity(&self) -> Result<ClusterIdentity> {
        let segments: Vec<&str> = self.asset.name.split('/').collect();

        let segment = |index: usize| -> Result<String> {
            match segments.get(index) {
                Some(s) if !s.is_empty() => Ok(s.to_string()),
                _ => Err(ProtectionError::InvalidPayload(format!(
                    "Asset name '{}' has no segment {}",
                    self.asset.name, index
                ))),
            }
        };

        Ok(ClusterIdentity {
            cluster_name: segment(CLUSTER_SEGMENT)?,
            project_id: segment(PROJECT_SEGMENT)?,
            zone: segment(ZONE_SEGMENT)?,
        })
    }
}
