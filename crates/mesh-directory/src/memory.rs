//! In-memory directory and policy store
//!
//! Backs tests and embedded deployments. Behaves like the REST API,
//! including conflict detection on conditional policy writes, which here is
//! atomic under the lock.

use crate::directory::{DirectoryError, NetworkDirectory, PolicyStore, PolicyVersion, StoredPolicy};
use async_trait::async_trait;
use chrono::Utc;
use mesh_common::{CreateNetworkRequest, Network, Node};
use parking_lot::RwLock;

/// In-memory implementation of both collaborator traits.
#[derive(Default)]
pub struct MemoryDirectory {
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    networks: Vec<Network>,
    nodes: Vec<Node>,
    policy: StoredPolicy,
    next_id: u64,
}

impl MemoryDirectory {
    /// Empty directory with an empty policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a network as-is, bypassing id assignment.
    pub fn seed_network(&self, network: Network) {
        self.state.write().networks.push(network);
    }

    /// Insert a node as-is.
    pub fn seed_node(&self, node: Node) {
        self.state.write().nodes.push(node);
    }

    /// Replace the stored policy document without bumping the revision.
    pub fn seed_policy(&self, document: impl Into<String>) {
        self.state.write().policy.document = document.into();
    }

    /// Current stored document, for assertions.
    pub fn document(&self) -> String {
        self.state.read().policy.document.clone()
    }
}

#[async_trait]
impl NetworkDirectory for MemoryDirectory {
    async fn list_networks(&self) -> Result<Vec<Network>, DirectoryError> {
        Ok(self.state.read().networks.clone())
    }

    async fn create_network(&self, req: &CreateNetworkRequest) -> Result<Network, DirectoryError> {
        let mut state = self.state.write();
        state.next_id += 1;
        let network = Network {
            id: state.next_id.to_string(),
            name: Some(req.name.clone()),
            display_name: req.display_name.clone(),
            email: req.email.clone(),
            created_at: Some(Utc::now()),
        };
        state.networks.push(network.clone());
        Ok(network)
    }

    async fn rename_network(&self, id: &str, new_name: &str) -> Result<Network, DirectoryError> {
        let mut state = self.state.write();
        let network = state
            .networks
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| DirectoryError::NotFound(id.to_string()))?;
        network.name = Some(new_name.to_string());
        let renamed = network.clone();

        // Nodes embed a copy of their owning network
        for node in state.nodes.iter_mut() {
            if let Some(owner) = node.user.as_mut() {
                if owner.id == id {
                    owner.name = Some(new_name.to_string());
                }
            }
        }
        Ok(renamed)
    }

    async fn delete_network(&self, id: &str) -> Result<(), DirectoryError> {
        let mut state = self.state.write();
        let before = state.networks.len();
        state.networks.retain(|n| n.id != id);
        if state.networks.len() == before {
            return Err(DirectoryError::NotFound(id.to_string()));
        }
        state
            .nodes
            .retain(|node| node.user.as_ref().map(|u| u.id != id).unwrap_or(true));
        Ok(())
    }

    async fn list_nodes(&self) -> Result<Vec<Node>, DirectoryError> {
        Ok(self.state.read().nodes.clone())
    }

    async fn set_approved_routes(&self, node_id: &str, routes: &[String]) -> Result<Node, DirectoryError> {
        let mut state = self.state.write();
        let node = state
            .nodes
            .iter_mut()
            .find(|n| n.id == node_id)
            .ok_or_else(|| DirectoryError::NotFound(node_id.to_string()))?;
        node.approved_routes = routes.to_vec();
        Ok(node.clone())
    }

    async fn set_node_tags(&self, node_id: &str, tags: &[String]) -> Result<Node, DirectoryError> {
        let mut state = self.state.write();
        let node = state
            .nodes
            .iter_mut()
            .find(|n| n.id == node_id)
            .ok_or_else(|| DirectoryError::NotFound(node_id.to_string()))?;
        node.forced_tags = tags.to_vec();
        Ok(node.clone())
    }
}

#[async_trait]
impl PolicyStore for MemoryDirectory {
    async fn get_policy(&self) -> Result<StoredPolicy, DirectoryError> {
        Ok(self.state.read().policy.clone())
    }

    async fn set_policy(
        &self,
        document: &str,
        precondition: Option<&PolicyVersion>,
    ) -> Result<StoredPolicy, DirectoryError> {
        let mut state = self.state.write();
        if let Some(expected) = precondition {
            if state.policy.version().as_ref() != Some(expected) {
                return Err(DirectoryError::Conflict);
            }
        }
        // Revisions must be distinct even when the clock is coarser than
        // two consecutive writes.
        let mut now = Utc::now();
        if let Some(previous) = state.policy.updated_at {
            if now <= previous {
                now = previous + chrono::Duration::microseconds(1);
            }
        }
        state.policy = StoredPolicy {
            document: document.to_string(),
            updated_at: Some(now),
        };
        Ok(state.policy.clone())
    }
}
