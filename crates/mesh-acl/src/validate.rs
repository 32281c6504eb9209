//! Isolation diagnostics
//!
//! Read-only consistency checks over a merged policy. Issues are advisory
//! strings surfaced to the operator; validation never mutates the policy
//! and never blocks a write.

use crate::policy::AclPolicy;
use crate::rule::is_isolation_rule;
use crate::tag::{tag_for, TAG_PREFIX};
use mesh_common::Network;

/// Validation outcome.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Validation {
    /// True when no issue was found
    pub valid: bool,
    /// Advisory findings, human-readable
    pub issues: Vec<String>,
}

/// Check that `policy` isolates every live network.
///
/// Two passes: every network with a derivable tag must have its isolation
/// rule, and any rule routing one `tag:net-` tag to a *different* one is
/// flagged as a potential cross-tenant leak. Networks without a derivable
/// tag are skipped.
pub fn validate(policy: &AclPolicy, networks: &[Network]) -> Validation {
    let mut issues = Vec::new();
    let rules = policy.rules();

    for network in networks {
        let tag = match tag_for(network) {
            Some(tag) => tag,
            None => continue,
        };
        if !rules.iter().any(|rule| is_isolation_rule(rule, &tag)) {
            issues.push(format!(
                "network \"{}\" is missing isolation rule",
                network.label()
            ));
        }
    }

    for rule in rules {
        for src in rule.src.iter().filter(|s| s.starts_with(TAG_PREFIX)) {
            for dst in &rule.dst {
                let dst_base = dst.strip_suffix(":*").unwrap_or(dst);
                if dst_base.starts_with(TAG_PREFIX) && dst_base != src {
                    issues.push(format!("cross-network rule detected: {} -> {}", src, dst));
                }
            }
        }
    }

    Validation {
        valid: issues.is_empty(),
        issues,
    }
}
