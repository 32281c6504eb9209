//! Tenant network and node records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tenant network: an isolated namespace of devices.
///
/// `name` is the primary identity and the only field that changes after
/// creation (rename); `id` is the control plane's stable identifier and the
/// fallback identity when `name` is absent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    /// Stable identifier assigned by the control plane
    #[serde(default)]
    pub id: String,
    /// Primary identity; renameable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Human-facing label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Contact address for the tenant owner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Creation time as reported by the control plane
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Network {
    /// Network with just a name, for construction in tests and callers.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Display label: the name when present, the id otherwise.
    pub fn label(&self) -> &str {
        self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or(&self.id)
    }
}

/// A device registered under a network.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Stable identifier assigned by the control plane
    #[serde(default)]
    pub id: String,
    /// Hostname-derived device name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Owning network
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Network>,
    /// Routes the device advertises
    #[serde(default)]
    pub available_routes: Vec<String>,
    /// Routes an operator has approved
    #[serde(default)]
    pub approved_routes: Vec<String>,
    /// ACL tags pinned by an operator
    #[serde(default)]
    pub forced_tags: Vec<String>,
}

/// Request body for creating a network.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNetworkRequest {
    /// Primary identity of the new network
    pub name: String,
    /// Optional human-facing label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Optional owner contact address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl CreateNetworkRequest {
    /// Request with just a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}
