//! Isolation and exit-node rule constructors

use crate::policy::{AclRule, RuleAction};

/// Destination granting general internet egress through an exit node.
pub const INTERNET_DST: &str = "autogroup:internet:*";

/// Rule confining a tag to itself: `src=[tag]`, `dst=[tag:*]`.
pub fn isolation_rule(tag: &str) -> AclRule {
    AclRule {
        action: RuleAction::Accept,
        src: vec![tag.to_string()],
        dst: vec![format!("{}:*", tag)],
        proto: None,
    }
}

/// Rule granting a tag internet egress via an approved exit node.
pub fn exit_rule(tag: &str) -> AclRule {
    AclRule {
        action: RuleAction::Accept,
        src: vec![tag.to_string()],
        dst: vec![INTERNET_DST.to_string()],
        proto: None,
    }
}

/// Whether `rule` is the isolation rule for `tag`.
pub fn is_isolation_rule(rule: &AclRule, tag: &str) -> bool {
    let self_dst = format!("{}:*", tag);
    rule.src.iter().any(|s| s == tag) && rule.dst.iter().any(|d| *d == self_dst)
}

/// Whether `rule` is the exit rule for `tag`.
pub fn is_exit_rule(rule: &AclRule, tag: &str) -> bool {
    rule.src.iter().any(|s| s == tag) && rule.dst.iter().any(|d| d == INTERNET_DST)
}
