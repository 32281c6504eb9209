//! Exit-node route predicates
//!
//! A node is an exit node when it routes the full IPv4 and IPv6 default
//! ranges for its network. Advertising the pair is a client-side claim;
//! only an operator-approved pair grants internet egress.

use crate::model::Node;
use std::collections::HashSet;

/// The route pair a node must carry to act as an exit node.
pub const EXIT_ROUTES: [&str; 2] = ["0.0.0.0/0", "::/0"];

/// Node is advertising exit-node capability (client-side claim).
pub fn is_advertising_exit_node(node: &Node) -> bool {
    EXIT_ROUTES
        .iter()
        .all(|route| node.available_routes.iter().any(|r| r == route))
}

/// An operator has approved this node as an exit node.
pub fn is_approved_exit_node(node: &Node) -> bool {
    EXIT_ROUTES
        .iter()
        .all(|route| node.approved_routes.iter().any(|r| r == route))
}

/// Names of the networks that currently hold an approved exit node.
///
/// Nodes without an owning network, or whose network has no name, cannot
/// contribute an entry.
pub fn exit_enabled_networks(nodes: &[Node]) -> HashSet<String> {
    nodes
        .iter()
        .filter(|node| is_approved_exit_node(node))
        .filter_map(|node| node.user.as_ref())
        .filter_map(|network| network.name.clone())
        .filter(|name| !name.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Network;

    fn node(network: &str, approved: &[&str]) -> Node {
        Node {
            id: "1".into(),
            user: Some(Network::named(network)),
            approved_routes: approved.iter().map(|r| r.to_string()).collect(),
            ..Node::default()
        }
    }

    #[test]
    fn test_approval_requires_both_routes() {
        assert!(is_approved_exit_node(&node("alpha", &["0.0.0.0/0", "::/0"])));
        assert!(!is_approved_exit_node(&node("alpha", &["0.0.0.0/0"])));
        assert!(!is_approved_exit_node(&node("alpha", &["::/0"])));
        assert!(!is_approved_exit_node(&node("alpha", &[])));
    }

    #[test]
    fn test_advertising_is_independent_of_approval() {
        let mut n = node("alpha", &[]);
        n.available_routes = vec!["0.0.0.0/0".into(), "::/0".into()];
        assert!(is_advertising_exit_node(&n));
        assert!(!is_approved_exit_node(&n));
    }

    #[test]
    fn test_exit_enabled_networks_dedupes_by_name() {
        let nodes = vec![
            node("alpha", &["0.0.0.0/0", "::/0"]),
            node("alpha", &["0.0.0.0/0", "::/0"]),
            node("beta", &["0.0.0.0/0"]),
        ];
        let enabled = exit_enabled_networks(&nodes);
        assert_eq!(enabled.len(), 1);
        assert!(enabled.contains("alpha"));
    }

    #[test]
    fn test_orphan_nodes_contribute_nothing() {
        let orphan = Node {
            id: "9".into(),
            approved_routes: EXIT_ROUTES.iter().map(|r| r.to_string()).collect(),
            ..Node::default()
        };
        assert!(exit_enabled_networks(&[orphan]).is_empty());
    }
}
