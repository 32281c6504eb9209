//! ACL policy document model
//!
//! Typed schema for the policy document stored by the control plane. Only
//! `acls` and `tag_owners` are produced by this engine; `groups`, `hosts`,
//! and `tests` are operator-owned and pass through untouched, as does any
//! top-level key the schema does not know about.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The ACL policy document.
///
/// Absent optional fields serialize as absent keys. Unknown top-level keys
/// land in `extra` and survive a parse/serialize round trip verbatim.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AclPolicy {
    /// Operator-defined groups, pass-through
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<BTreeMap<String, Vec<String>>>,
    /// Tag ownership: tag -> owner references ("<name>@")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_owners: Option<BTreeMap<String, Vec<String>>>,
    /// Operator-defined host aliases, pass-through
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosts: Option<BTreeMap<String, String>>,
    /// Access rules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acls: Option<Vec<AclRule>>,
    /// Operator-defined policy assertions, pass-through
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<Vec<AclTest>>,
    /// Top-level keys this schema does not model
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AclPolicy {
    /// Access rules, empty when the field is absent.
    pub fn rules(&self) -> &[AclRule] {
        self.acls.as_deref().unwrap_or_default()
    }
}

/// A single access rule.
///
/// Order within `src`/`dst` and within the rule list is insertion order; it
/// does not affect matching but is kept stable for round trips.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclRule {
    /// Rule action; the engine only emits `accept`
    pub action: RuleAction,
    /// Traffic sources (tags, owner refs, groups)
    pub src: Vec<String>,
    /// Traffic destinations, usually `<target>:<port-or-*>`
    pub dst: Vec<String>,
    /// Protocol restriction, absent means any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proto: Option<Proto>,
}

/// Rule action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    /// Permit matching traffic
    Accept,
}

/// Protocol restriction on a rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Proto {
    /// TCP only
    Tcp,
    /// UDP only
    Udp,
    /// ICMP only
    Icmp,
}

/// Operator-authored policy assertion, pass-through only.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AclTest {
    /// Source the assertion runs as
    pub src: String,
    /// Destinations that must be reachable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept: Option<Vec<String>>,
    /// Destinations that must be unreachable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deny: Option<Vec<String>>,
}

/// Policy document errors.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// The document could not be serialized
    #[error("failed to serialize policy: {0}")]
    Serialize(#[from] serde_json::Error),
}
