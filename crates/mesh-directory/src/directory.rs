//! Collaborator traits and policy-store records

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mesh_common::{CreateNetworkRequest, Network, Node};
use serde::{Deserialize, Serialize};

/// Opaque token identifying one revision of the stored policy.
///
/// Used as a compare-and-swap precondition on writes; callers never inspect
/// the contents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyVersion(String);

impl PolicyVersion {
    /// Token for a revision timestamp.
    pub fn from_timestamp(at: DateTime<Utc>) -> Self {
        Self(at.to_rfc3339())
    }
}

/// The policy document as held by the store.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPolicy {
    /// Raw document text; a JSON superset (comments, trailing commas)
    pub document: String,
    /// Last modification time reported by the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl StoredPolicy {
    /// Version token for this revision, absent when the store reported no
    /// modification time.
    pub fn version(&self) -> Option<PolicyVersion> {
        self.updated_at.map(PolicyVersion::from_timestamp)
    }
}

/// Directory of tenant networks and their nodes.
#[async_trait]
pub trait NetworkDirectory: Send + Sync {
    /// All live networks.
    async fn list_networks(&self) -> Result<Vec<Network>, DirectoryError>;

    /// Create a network.
    async fn create_network(&self, req: &CreateNetworkRequest) -> Result<Network, DirectoryError>;

    /// Rename a network by id.
    async fn rename_network(&self, id: &str, new_name: &str) -> Result<Network, DirectoryError>;

    /// Delete a network by id.
    async fn delete_network(&self, id: &str) -> Result<(), DirectoryError>;

    /// All nodes across all networks.
    async fn list_nodes(&self) -> Result<Vec<Node>, DirectoryError>;

    /// Replace a node's approved route set.
    async fn set_approved_routes(&self, node_id: &str, routes: &[String]) -> Result<Node, DirectoryError>;

    /// Replace a node's pinned ACL tags.
    async fn set_node_tags(&self, node_id: &str, tags: &[String]) -> Result<Node, DirectoryError>;
}

/// Store holding the ACL policy document.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// Current stored policy.
    async fn get_policy(&self) -> Result<StoredPolicy, DirectoryError>;

    /// Write the policy document.
    ///
    /// With a `precondition`, the write only lands if the store's current
    /// revision still matches; otherwise [`DirectoryError::Conflict`].
    async fn set_policy(
        &self,
        document: &str,
        precondition: Option<&PolicyVersion>,
    ) -> Result<StoredPolicy, DirectoryError>;
}

/// Errors from the control-plane collaborators.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// Transport-level failure (connect, timeout, decode)
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The control plane rejected the request
    #[error("control plane returned status {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body, best effort
        message: String,
    },

    /// No such network or node
    #[error("not found: {0}")]
    NotFound(String),

    /// Policy revision moved since it was read
    #[error("policy version conflict")]
    Conflict,
}
