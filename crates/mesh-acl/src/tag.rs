//! Tenant tag derivation
//!
//! Every live network maps to one canonical ACL tag in the `tag:net-`
//! namespace. Derivation is deterministic so regeneration always lands on
//! the same tag for the same network.

use mesh_common::Network;

/// Namespace prefix for engine-owned tags.
pub const TAG_PREFIX: &str = "tag:net-";

/// Slugify arbitrary input for use inside a tag.
///
/// Lowercases, replaces every character outside `[a-z0-9-]` with `-`,
/// collapses runs of `-`, and trims `-` from both ends. Total; the result
/// may be empty. Idempotent.
pub fn sanitize(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    for ch in input.chars() {
        let ch = ch.to_ascii_lowercase();
        let mapped = if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            ch
        } else {
            '-'
        };
        if mapped == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(mapped);
    }
    slug.trim_matches('-').to_string()
}

/// Canonical tag for a network, `None` when neither name nor id survives
/// sanitization.
///
/// `None` is not an error: the network cannot be represented in the policy
/// and every downstream component skips it.
pub fn tag_for(network: &Network) -> Option<String> {
    let from_name = network.name.as_deref().map(sanitize).unwrap_or_default();
    if !from_name.is_empty() {
        return Some(format!("{}{}", TAG_PREFIX, from_name));
    }
    let from_id = sanitize(&network.id);
    if from_id.is_empty() {
        None
    } else {
        Some(format!("{}{}", TAG_PREFIX, from_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sanitize_examples() {
        assert_eq!(sanitize("Network 1!"), "network-1");
        assert_eq!(sanitize("alpha"), "alpha");
        assert_eq!(sanitize("--Alpha--Beta--"), "alpha-beta");
        assert_eq!(sanitize("ünïcödé"), "n-c-d");
        assert_eq!(sanitize("!!!"), "");
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn test_tag_for_prefers_name() {
        let network = Network {
            id: "x1".into(),
            name: Some("alpha".into()),
            ..Network::default()
        };
        assert_eq!(tag_for(&network).as_deref(), Some("tag:net-alpha"));
    }

    #[test]
    fn test_tag_for_falls_back_to_id() {
        let network = Network {
            id: "x1".into(),
            name: Some("".into()),
            ..Network::default()
        };
        assert_eq!(tag_for(&network).as_deref(), Some("tag:net-x1"));
    }

    #[test]
    fn test_tag_for_unrepresentable() {
        let network = Network {
            id: "".into(),
            name: Some("".into()),
            ..Network::default()
        };
        assert_eq!(tag_for(&network), None);

        let punctuation_only = Network {
            id: "!!".into(),
            name: Some("??".into()),
            ..Network::default()
        };
        assert_eq!(tag_for(&punctuation_only), None);
    }

    proptest! {
        #[test]
        fn test_sanitize_idempotent(input in "\\PC*") {
            let once = sanitize(&input);
            prop_assert_eq!(sanitize(&once), once);
        }

        #[test]
        fn test_sanitize_output_alphabet(input in "\\PC*") {
            let slug = sanitize(&input);
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert!(!slug.starts_with('-'));
            prop_assert!(!slug.ends_with('-'));
            prop_assert!(!slug.contains("--"));
        }
    }
}
