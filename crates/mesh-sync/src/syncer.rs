//! The regenerate-merge-write cycle

use mesh_acl::{generate, merge, parse_hujson, tag_for, to_hujson, validate, MergeStrategy, PolicyError};
use mesh_common::exit_enabled_networks;
use mesh_directory::{DirectoryError, NetworkDirectory, PolicyStore};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Isolation policy synchronizer.
///
/// Stateless between invocations: every sync re-reads the tenant list, the
/// node list, and the stored policy. There is no in-process cache.
pub struct Syncer {
    pub(crate) directory: Arc<dyn NetworkDirectory>,
    store: Arc<dyn PolicyStore>,
    options: SyncOptions,
}

/// Sync behavior knobs.
#[derive(Clone, Copy, Debug, Default)]
pub struct SyncOptions {
    /// How stored rules are treated during the merge
    pub strategy: MergeStrategy,
    /// Make the write-back conditional on the policy revision read at the
    /// start of the sync; a concurrent change fails the sync with
    /// [`SyncError::Conflict`] instead of clobbering it
    pub compare_and_swap: bool,
}

/// Outcome of a successful sync.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SyncReport {
    /// Live networks seen
    pub networks: usize,
    /// Networks without a derivable tag, excluded from the policy
    pub skipped: usize,
    /// Networks holding an approved exit node
    pub exit_enabled: usize,
    /// Rules in the written document
    pub rules_written: usize,
    /// Advisory findings from validation
    pub issues: Vec<String>,
}

/// Sync failures.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// A collaborator call failed
    #[error("directory unavailable: {0}")]
    Directory(DirectoryError),

    /// The merged document could not be serialized
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// The stored policy changed between read and write
    #[error("policy write conflicted with a concurrent change")]
    Conflict,
}

impl From<DirectoryError> for SyncError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Conflict => SyncError::Conflict,
            other => SyncError::Directory(other),
        }
    }
}

impl Syncer {
    /// Syncer with default options.
    pub fn new(directory: Arc<dyn NetworkDirectory>, store: Arc<dyn PolicyStore>) -> Self {
        Self::with_options(directory, store, SyncOptions::default())
    }

    /// Syncer with explicit options.
    pub fn with_options(
        directory: Arc<dyn NetworkDirectory>,
        store: Arc<dyn PolicyStore>,
        options: SyncOptions,
    ) -> Self {
        Self {
            directory,
            store,
            options,
        }
    }

    /// Recompute the isolation policy and write it back.
    ///
    /// Strictly sequential: fetch networks, fetch the stored policy, fetch
    /// nodes to derive the exit-enabled set, generate, merge, write. No
    /// retries; the caller owns retry policy.
    pub async fn sync(&self) -> Result<SyncReport, SyncError> {
        let networks = self.directory.list_networks().await?;
        let stored = self.store.get_policy().await?;
        let nodes = self.directory.list_nodes().await?;
        let exit_enabled = exit_enabled_networks(&nodes);

        let skipped = networks.iter().filter(|n| tag_for(n).is_none()).count();
        if skipped > 0 {
            debug!("{} network(s) have no derivable tag and are excluded", skipped);
        }

        let generated = generate(&networks, &exit_enabled);
        let current = parse_hujson(&stored.document);
        let merged = merge(&current, &generated, self.options.strategy);

        let validation = validate(&merged, &networks);
        for issue in &validation.issues {
            warn!("policy validation: {}", issue);
        }

        let document = to_hujson(&merged)?;
        let precondition = if self.options.compare_and_swap {
            stored.version()
        } else {
            None
        };
        self.store.set_policy(&document, precondition.as_ref()).await?;

        let report = SyncReport {
            networks: networks.len(),
            skipped,
            exit_enabled: exit_enabled.len(),
            rules_written: merged.rules().len(),
            issues: validation.issues,
        };
        info!(
            "isolation policy synced: {} network(s), {} rule(s)",
            report.networks, report.rules_written
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mesh_common::{Network, Node};
    use mesh_directory::{MemoryDirectory, PolicyVersion, StoredPolicy};

    fn exit_node(id: &str, network: &Network) -> Node {
        Node {
            id: id.into(),
            user: Some(network.clone()),
            approved_routes: vec!["0.0.0.0/0".into(), "::/0".into()],
            ..Node::default()
        }
    }

    #[tokio::test]
    async fn test_sync_writes_isolation_rules() {
        let backend = Arc::new(MemoryDirectory::new());
        backend.seed_network(Network::named("alpha"));
        backend.seed_network(Network::named("beta"));

        let syncer = Syncer::new(backend.clone(), backend.clone());
        let report = syncer.sync().await.unwrap();
        assert_eq!(report.networks, 2);
        assert_eq!(report.rules_written, 2);
        assert!(report.issues.is_empty());

        let written = parse_hujson(&backend.document());
        assert_eq!(written.rules().len(), 2);
        assert_eq!(written.rules()[0].src, vec!["tag:net-alpha"]);
        assert_eq!(
            written.tag_owners.as_ref().unwrap()["tag:net-beta"],
            vec!["beta@"]
        );
    }

    #[tokio::test]
    async fn test_sync_preserves_operator_keys() {
        let backend = Arc::new(MemoryDirectory::new());
        backend.seed_network(Network::named("alpha"));
        backend.seed_policy(
            r#"{
                // operator notes live here
                "groups": {"group:ops": ["alice@"]},
                "acls": [{"action": "accept", "src": ["group:ops"], "dst": ["tag:net-alpha:22"]}],
            }"#,
        );

        let syncer = Syncer::new(backend.clone(), backend.clone());
        syncer.sync().await.unwrap();

        let written = parse_hujson(&backend.document());
        assert_eq!(written.groups.as_ref().unwrap()["group:ops"], vec!["alice@"]);
        // default strategy regenerates acls wholesale
        assert_eq!(written.rules().len(), 1);
        assert_eq!(written.rules()[0].src, vec!["tag:net-alpha"]);
    }

    #[tokio::test]
    async fn test_sync_preserve_foreign_strategy() {
        let backend = Arc::new(MemoryDirectory::new());
        backend.seed_network(Network::named("alpha"));
        backend.seed_policy(
            r#"{"acls": [{"action": "accept", "src": ["group:ops"], "dst": ["tag:net-alpha:22"]}]}"#,
        );

        let syncer = Syncer::with_options(
            backend.clone(),
            backend.clone(),
            SyncOptions {
                strategy: MergeStrategy::PreserveForeign,
                ..SyncOptions::default()
            },
        );
        let report = syncer.sync().await.unwrap();
        assert_eq!(report.rules_written, 2);

        let written = parse_hujson(&backend.document());
        assert_eq!(written.rules()[0].src, vec!["group:ops"]);
        assert_eq!(written.rules()[1].src, vec!["tag:net-alpha"]);
    }

    #[tokio::test]
    async fn test_sync_emits_exit_rule_for_approved_node() {
        let backend = Arc::new(MemoryDirectory::new());
        let alpha = Network::named("alpha");
        backend.seed_network(alpha.clone());
        backend.seed_node(exit_node("n1", &alpha));

        let syncer = Syncer::new(backend.clone(), backend.clone());
        let report = syncer.sync().await.unwrap();
        assert_eq!(report.exit_enabled, 1);

        let written = parse_hujson(&backend.document());
        assert!(written
            .rules()
            .iter()
            .any(|r| r.dst == vec!["autogroup:internet:*"]));
    }

    #[tokio::test]
    async fn test_sync_recovers_from_malformed_stored_policy() {
        let backend = Arc::new(MemoryDirectory::new());
        backend.seed_network(Network::named("alpha"));
        backend.seed_policy("{definitely not json");

        let syncer = Syncer::new(backend.clone(), backend.clone());
        let report = syncer.sync().await.unwrap();
        assert_eq!(report.rules_written, 1);
    }

    /// Store whose every read is immediately followed by a concurrent
    /// writer landing a new revision.
    struct RacingStore {
        inner: Arc<MemoryDirectory>,
    }

    #[async_trait]
    impl PolicyStore for RacingStore {
        async fn get_policy(&self) -> Result<StoredPolicy, DirectoryError> {
            let stored = self.inner.get_policy().await?;
            self.inner.set_policy(r#"{"hosts":{"raced":"10.0.0.9"}}"#, None).await?;
            Ok(stored)
        }

        async fn set_policy(
            &self,
            document: &str,
            precondition: Option<&PolicyVersion>,
        ) -> Result<StoredPolicy, DirectoryError> {
            self.inner.set_policy(document, precondition).await
        }
    }

    #[tokio::test]
    async fn test_cas_detects_concurrent_write() {
        let backend = Arc::new(MemoryDirectory::new());
        backend.seed_network(Network::named("alpha"));
        // establish a first revision so the read carries a version
        backend.set_policy("{}", None).await.unwrap();

        let racing = Arc::new(RacingStore {
            inner: backend.clone(),
        });
        let syncer = Syncer::with_options(
            backend.clone(),
            racing,
            SyncOptions {
                compare_and_swap: true,
                ..SyncOptions::default()
            },
        );

        let result = syncer.sync().await;
        assert!(matches!(result, Err(SyncError::Conflict)));
        // the concurrent write survives
        assert!(backend.document().contains("raced"));
    }

    #[tokio::test]
    async fn test_without_cas_last_write_wins() {
        let backend = Arc::new(MemoryDirectory::new());
        backend.seed_network(Network::named("alpha"));
        backend.set_policy("{}", None).await.unwrap();

        let racing = Arc::new(RacingStore {
            inner: backend.clone(),
        });
        let syncer = Syncer::new(backend.clone(), racing);
        syncer.sync().await.unwrap();
        assert!(!backend.document().contains("raced"));
    }
}
