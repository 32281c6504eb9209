//! Policy generation
//!
//! Folds the rule constructors over the live network set into a generated
//! policy fragment. Output is deterministic: the same networks in the same
//! order always produce a byte-identical fragment.

use crate::policy::AclPolicy;
use crate::rule::{exit_rule, is_exit_rule, is_isolation_rule, isolation_rule};
use crate::tag::tag_for;
use mesh_common::Network;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Generate the isolation policy fragment for `networks`.
///
/// Per resolvable network: one isolation rule, an exit rule when the
/// network's name is in `exit_enabled`, and a `tag_owners` entry keyed by
/// the tag. Networks whose tag cannot be derived are skipped without error.
/// `tag_owners` is omitted entirely when no network contributed an entry.
pub fn generate(networks: &[Network], exit_enabled: &HashSet<String>) -> AclPolicy {
    let mut acls = Vec::with_capacity(networks.len());
    let mut tag_owners = BTreeMap::new();

    for network in networks {
        let tag = match tag_for(network) {
            Some(tag) => tag,
            None => {
                debug!("skipping network without derivable tag: {:?}", network.id);
                continue;
            }
        };

        acls.push(isolation_rule(&tag));
        if let Some(name) = network.name.as_deref() {
            if exit_enabled.contains(name) {
                acls.push(exit_rule(&tag));
            }
        }
        tag_owners.insert(tag, vec![owner_ref(network)]);
    }

    AclPolicy {
        acls: Some(acls),
        tag_owners: if tag_owners.is_empty() { None } else { Some(tag_owners) },
        ..AclPolicy::default()
    }
}

/// Idempotently add one network's isolation rule and owner entry.
///
/// Incremental counterpart of [`generate`] for callers that patch a policy
/// in place instead of regenerating. The full sync path does not use it.
pub fn add_network(policy: &AclPolicy, network: &Network) -> AclPolicy {
    let tag = match tag_for(network) {
        Some(tag) => tag,
        None => return policy.clone(),
    };

    let mut updated = policy.clone();
    let rules = updated.acls.get_or_insert_with(Vec::new);
    if !rules.iter().any(|rule| is_isolation_rule(rule, &tag)) {
        rules.push(isolation_rule(&tag));
    }
    updated
        .tag_owners
        .get_or_insert_with(BTreeMap::new)
        .entry(tag)
        .or_insert_with(|| vec![owner_ref(network)]);
    updated
}

/// Remove one network's generated rules and owner entry.
///
/// Drops the isolation and exit rules for the network's tag and its
/// `tag_owners` key; every other rule and owner is untouched.
pub fn remove_network(policy: &AclPolicy, network: &Network) -> AclPolicy {
    let tag = match tag_for(network) {
        Some(tag) => tag,
        None => return policy.clone(),
    };

    let mut updated = policy.clone();
    if let Some(rules) = updated.acls.as_mut() {
        rules.retain(|rule| !is_isolation_rule(rule, &tag) && !is_exit_rule(rule, &tag));
    }
    if let Some(owners) = updated.tag_owners.as_mut() {
        owners.remove(&tag);
    }
    if updated.tag_owners.as_ref().map_or(false, BTreeMap::is_empty) {
        updated.tag_owners = None;
    }
    updated
}

/// Owner reference recorded in `tag_owners`: `<name>@`, falling back to the
/// id for nameless networks.
fn owner_ref(network: &Network) -> String {
    format!("{}@", network.label())
}
