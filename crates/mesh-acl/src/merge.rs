//! Merging generated fragments into the stored document
//!
//! The merge is not a diff: isolation rules are regenerated from scratch on
//! every sync so the isolation invariant holds after any tenant mutation.
//! Everything the engine does not own (`groups`, `hosts`, `tests`, unknown
//! top-level keys, and `tag_owners` entries outside the `tag:net-`
//! namespace) passes through verbatim.

use crate::policy::AclPolicy;
use crate::tag::TAG_PREFIX;
use std::collections::BTreeMap;

/// How stored `acls` are treated when the generated fragment lands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Generated rules wholly replace stored rules.
    ///
    /// Guarantees the isolation invariant unconditionally, at the cost of
    /// discarding any rule an operator added by hand. This matches the
    /// behavior the control-plane UI shipped with.
    #[default]
    ReplaceAll,
    /// Stored rules with no `tag:net-` source are kept, ahead of the
    /// regenerated namespace rules.
    ///
    /// Operator rules survive, but a hand-written rule whose source is an
    /// engine-owned tag is still discarded and regenerated.
    PreserveForeign,
}

/// Merge the generated fragment into the stored policy.
pub fn merge(stored: &AclPolicy, generated: &AclPolicy, strategy: MergeStrategy) -> AclPolicy {
    let mut merged = stored.clone();

    let generated_rules = generated.acls.clone().unwrap_or_default();
    merged.acls = Some(match strategy {
        MergeStrategy::ReplaceAll => generated_rules,
        MergeStrategy::PreserveForeign => {
            let mut rules: Vec<_> = stored
                .rules()
                .iter()
                .filter(|rule| rule.src.iter().all(|s| !s.starts_with(TAG_PREFIX)))
                .cloned()
                .collect();
            rules.extend(generated_rules);
            rules
        }
    });

    // The tag:net- namespace is engine-owned: stale keys (renamed or deleted
    // tenants) are pruned, foreign keys are operator-owned and kept.
    let mut owners: BTreeMap<String, Vec<String>> = stored
        .tag_owners
        .clone()
        .unwrap_or_default()
        .into_iter()
        .filter(|(tag, _)| !tag.starts_with(TAG_PREFIX))
        .collect();
    if let Some(generated_owners) = generated.tag_owners.as_ref() {
        owners.extend(generated_owners.clone());
    }
    merged.tag_owners = if owners.is_empty() { None } else { Some(owners) };

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::generate;
    use crate::rule::isolation_rule;
    use crate::policy::{AclRule, RuleAction};
    use mesh_common::Network;
    use std::collections::HashSet;

    fn custom_rule(src: &str, dst: &str) -> AclRule {
        AclRule {
            action: RuleAction::Accept,
            src: vec![src.to_string()],
            dst: vec![dst.to_string()],
            proto: None,
        }
    }

    fn stored_with_extras() -> AclPolicy {
        let mut stored = AclPolicy {
            groups: Some([("group:ops".to_string(), vec!["alice@".to_string()])].into()),
            hosts: Some([("db".to_string(), "10.0.0.5".to_string())].into()),
            acls: Some(vec![custom_rule("group:ops", "db:5432")]),
            ..AclPolicy::default()
        };
        stored
            .extra
            .insert("ssh".to_string(), serde_json::json!([{"action": "check"}]));
        stored
    }

    #[test]
    fn test_replace_all_discards_stored_rules() {
        let stored = AclPolicy {
            groups: Some([("g1".to_string(), vec!["a".to_string()])].into()),
            acls: Some(vec![custom_rule("group:old", "anything:*")]),
            ..AclPolicy::default()
        };
        let generated = generate(&[Network::named("alpha")], &HashSet::new());

        let merged = merge(&stored, &generated, MergeStrategy::ReplaceAll);
        assert_eq!(merged.groups.as_ref().unwrap()["g1"], vec!["a"]);
        let acls = merged.acls.as_ref().unwrap();
        assert_eq!(acls.len(), 1);
        assert_eq!(acls[0].src, vec!["tag:net-alpha"]);
        assert_eq!(
            merged.tag_owners.as_ref().unwrap()["tag:net-alpha"],
            vec!["alpha@"]
        );
    }

    #[test]
    fn test_preserve_foreign_keeps_operator_rules() {
        let mut stored = stored_with_extras();
        // A stale engine-owned rule that must still be regenerated away
        stored
            .acls
            .as_mut()
            .unwrap()
            .push(isolation_rule("tag:net-ghost"));

        let generated = generate(&[Network::named("alpha")], &HashSet::new());
        let merged = merge(&stored, &generated, MergeStrategy::PreserveForeign);

        let acls = merged.acls.as_ref().unwrap();
        assert_eq!(acls.len(), 2);
        assert_eq!(acls[0].src, vec!["group:ops"]);
        assert_eq!(acls[1].src, vec!["tag:net-alpha"]);
        assert!(acls.iter().all(|r| !r.src.contains(&"tag:net-ghost".to_string())));
    }

    #[test]
    fn test_untouched_keys_pass_through() {
        let stored = stored_with_extras();
        let generated = generate(&[Network::named("alpha")], &HashSet::new());
        let merged = merge(&stored, &generated, MergeStrategy::ReplaceAll);

        assert_eq!(merged.groups, stored.groups);
        assert_eq!(merged.hosts, stored.hosts);
        assert_eq!(merged.extra, stored.extra);
    }

    #[test]
    fn test_stale_namespace_owners_pruned() {
        let stored = AclPolicy {
            tag_owners: Some(
                [
                    ("tag:net-old".to_string(), vec!["old@".to_string()]),
                    ("tag:server".to_string(), vec!["ops@".to_string()]),
                ]
                .into(),
            ),
            ..AclPolicy::default()
        };
        let generated = generate(&[Network::named("alpha")], &HashSet::new());
        let merged = merge(&stored, &generated, MergeStrategy::ReplaceAll);

        let owners = merged.tag_owners.as_ref().unwrap();
        assert!(!owners.contains_key("tag:net-old"));
        assert_eq!(owners["tag:server"], vec!["ops@"]);
        assert_eq!(owners["tag:net-alpha"], vec!["alpha@"]);
    }

    #[test]
    fn test_empty_owner_map_omitted() {
        let stored = AclPolicy {
            tag_owners: Some([("tag:net-old".to_string(), vec!["old@".to_string()])].into()),
            ..AclPolicy::default()
        };
        let generated = generate(&[], &HashSet::new());
        let merged = merge(&stored, &generated, MergeStrategy::ReplaceAll);
        assert!(merged.tag_owners.is_none());
    }
}
