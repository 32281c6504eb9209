//! OpenMesh Common - Shared types for the mesh control plane
//!
//! This crate provides the domain model shared by every member of the
//! workspace:
//! - Tenant networks and their nodes, as served by the control-plane API
//! - Exit-node route constants and predicates
//!
//! A "network" is a tenant namespace: every node registered under it may
//! reach only nodes in the same network unless the ACL policy grants more.

#![warn(missing_docs)]

pub mod exit;
pub mod model;

pub use exit::{exit_enabled_networks, is_advertising_exit_node, is_approved_exit_node, EXIT_ROUTES};
pub use model::{CreateNetworkRequest, Network, Node};
