//! Caller-facing tenant mutations
//!
//! Each operation performs its primary action against the directory and
//! propagates that failure loudly. The isolation-policy sync that follows
//! is best effort: its failure is logged, attached to the outcome as a
//! warning, and never fails the mutation.

use crate::syncer::Syncer;
use mesh_common::{CreateNetworkRequest, Network, Node, EXIT_ROUTES};
use mesh_directory::DirectoryError;
use tracing::{info, warn};

/// Result of a mutation plus the fate of its policy sync.
#[derive(Debug)]
pub struct MutationOutcome<T> {
    /// What the primary action produced
    pub value: T,
    /// Non-fatal sync failure, for surfacing in the UI
    pub sync_warning: Option<String>,
}

impl<T> MutationOutcome<T> {
    /// Whether the follow-up sync completed.
    pub fn synced(&self) -> bool {
        self.sync_warning.is_none()
    }
}

impl Syncer {
    /// Create a network, then resync the isolation policy.
    pub async fn create_network(
        &self,
        req: &CreateNetworkRequest,
    ) -> Result<MutationOutcome<Network>, DirectoryError> {
        let network = self.directory.create_network(req).await?;
        info!("created network {}", network.label());
        Ok(self.finish_mutation(network).await)
    }

    /// Rename a network, then resync the isolation policy.
    ///
    /// The old name's tag disappears from the regenerated document; rules
    /// and ownership reappear under the new tag.
    pub async fn rename_network(
        &self,
        id: &str,
        new_name: &str,
    ) -> Result<MutationOutcome<Network>, DirectoryError> {
        let network = self.directory.rename_network(id, new_name).await?;
        info!("renamed network {} to {}", id, new_name);
        Ok(self.finish_mutation(network).await)
    }

    /// Delete a network, then resync the isolation policy.
    pub async fn delete_network(&self, id: &str) -> Result<MutationOutcome<()>, DirectoryError> {
        self.directory.delete_network(id).await?;
        info!("deleted network {}", id);
        Ok(self.finish_mutation(()).await)
    }

    /// Approve a node as an exit node, then resync so its network gains the
    /// internet-egress rule.
    ///
    /// The exit route pair is added to whatever routes are already
    /// approved.
    pub async fn approve_exit_node(&self, node: &Node) -> Result<MutationOutcome<Node>, DirectoryError> {
        let mut routes = node.approved_routes.clone();
        for route in EXIT_ROUTES {
            if !routes.iter().any(|r| r == route) {
                routes.push(route.to_string());
            }
        }
        let updated = self.directory.set_approved_routes(&node.id, &routes).await?;
        info!("approved exit node {}", node.id);
        Ok(self.finish_mutation(updated).await)
    }

    /// Revoke a node's exit approval, then resync so the internet-egress
    /// rule is dropped once no approved exit node remains in the network.
    pub async fn revoke_exit_node(&self, node: &Node) -> Result<MutationOutcome<Node>, DirectoryError> {
        let routes: Vec<String> = node
            .approved_routes
            .iter()
            .filter(|r| !EXIT_ROUTES.contains(&r.as_str()))
            .cloned()
            .collect();
        let updated = self.directory.set_approved_routes(&node.id, &routes).await?;
        info!("revoked exit node {}", node.id);
        Ok(self.finish_mutation(updated).await)
    }

    async fn finish_mutation<T>(&self, value: T) -> MutationOutcome<T> {
        match self.sync().await {
            Ok(_) => MutationOutcome {
                value,
                sync_warning: None,
            },
            Err(err) => {
                warn!("isolation policy sync failed after mutation: {}", err);
                MutationOutcome {
                    value,
                    sync_warning: Some(err.to_string()),
                }
            }
        }
    }
}
