//! REST client for the control-plane API

use crate::config::{DirectoryConfig, Session};
use crate::directory::{DirectoryError, NetworkDirectory, PolicyStore, PolicyVersion, StoredPolicy};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mesh_common::{CreateNetworkRequest, Network, Node};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Control-plane client speaking the REST API.
///
/// Thin request/response mapping; retries and backoff are the caller's
/// concern.
pub struct HttpDirectory {
    http: reqwest::Client,
    base_url: String,
    session: Session,
}

impl HttpDirectory {
    /// Build a client for `config` authenticated as `session`.
    pub fn new(config: &DirectoryConfig, session: Session) -> Result<Self, DirectoryError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, DirectoryError> {
        let response = request.bearer_auth(self.session.api_key()).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(DirectoryError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl NetworkDirectory for HttpDirectory {
    async fn list_networks(&self) -> Result<Vec<Network>, DirectoryError> {
        let response = self.send(self.http.get(self.url("/user"))).await?;
        let body: ListUsersResponse = response.json().await?;
        Ok(body.users)
    }

    async fn create_network(&self, req: &CreateNetworkRequest) -> Result<Network, DirectoryError> {
        let response = self.send(self.http.post(self.url("/user")).json(req)).await?;
        let body: UserResponse = response.json().await?;
        Ok(body.user)
    }

    async fn rename_network(&self, id: &str, new_name: &str) -> Result<Network, DirectoryError> {
        let path = format!("/user/{}/rename/{}", id, new_name);
        let response = self.send(self.http.post(self.url(&path))).await?;
        let body: UserResponse = response.json().await?;
        Ok(body.user)
    }

    async fn delete_network(&self, id: &str) -> Result<(), DirectoryError> {
        let path = format!("/user/{}", id);
        self.send(self.http.delete(self.url(&path))).await?;
        Ok(())
    }

    async fn list_nodes(&self) -> Result<Vec<Node>, DirectoryError> {
        let response = self.send(self.http.get(self.url("/node"))).await?;
        let body: ListNodesResponse = response.json().await?;
        Ok(body.nodes)
    }

    async fn set_approved_routes(&self, node_id: &str, routes: &[String]) -> Result<Node, DirectoryError> {
        let path = format!("/node/{}/approve_routes", node_id);
        let request = self.http.post(self.url(&path)).json(&SetRoutesRequest { routes });
        let response = self.send(request).await?;
        let body: NodeResponse = response.json().await?;
        Ok(body.node)
    }

    async fn set_node_tags(&self, node_id: &str, tags: &[String]) -> Result<Node, DirectoryError> {
        let path = format!("/node/{}/tags", node_id);
        let request = self.http.post(self.url(&path)).json(&SetTagsRequest { tags });
        let response = self.send(request).await?;
        let body: NodeResponse = response.json().await?;
        Ok(body.node)
    }
}

#[async_trait]
impl PolicyStore for HttpDirectory {
    async fn get_policy(&self) -> Result<StoredPolicy, DirectoryError> {
        let response = self.send(self.http.get(self.url("/policy"))).await?;
        let body: PolicyResponse = response.json().await?;
        Ok(StoredPolicy {
            document: body.policy,
            updated_at: body.updated_at,
        })
    }

    async fn set_policy(
        &self,
        document: &str,
        precondition: Option<&PolicyVersion>,
    ) -> Result<StoredPolicy, DirectoryError> {
        // The API has no conditional write, so the precondition is checked
        // against a fresh read. This narrows the lost-update window; it
        // cannot close it.
        if let Some(expected) = precondition {
            let current = self.get_policy().await?;
            if current.version().as_ref() != Some(expected) {
                debug!("policy revision moved since read, refusing write");
                return Err(DirectoryError::Conflict);
            }
        }

        let request = self
            .http
            .put(self.url("/policy"))
            .json(&SetPolicyRequest { policy: document });
        let response = self.send(request).await?;
        let body: PolicyResponse = response.json().await?;
        Ok(StoredPolicy {
            document: body.policy,
            updated_at: body.updated_at,
        })
    }
}

#[derive(Deserialize)]
struct ListUsersResponse {
    #[serde(default)]
    users: Vec<Network>,
}

#[derive(Deserialize)]
struct UserResponse {
    user: Network,
}

#[derive(Deserialize)]
struct ListNodesResponse {
    #[serde(default)]
    nodes: Vec<Node>,
}

#[derive(Deserialize)]
struct NodeResponse {
    node: Node,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PolicyResponse {
    #[serde(default)]
    policy: String,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct SetPolicyRequest<'a> {
    policy: &'a str,
}

#[derive(Serialize)]
struct SetRoutesRequest<'a> {
    routes: &'a [String],
}

#[derive(Serialize)]
struct SetTagsRequest<'a> {
    tags: &'a [String],
}
