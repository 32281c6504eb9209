//! OpenMesh ACL - Network-Isolation Policy Engine
//!
//! Derives, merges, and validates the ACL policy document that confines each
//! tenant network to itself.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Policy Regeneration Cycle                   │
//! │                                                             │
//! │  networks ──► tag ──► rule ──► generate ─┐                  │
//! │                                          ▼                  │
//! │  stored document ──► hujson ──────────► merge ──► document  │
//! │                                          │                  │
//! │                                          ▼                  │
//! │                                       validate (advisory)   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The document is regenerated wholesale from the live network set on every
//! sync; there is no durable ledger of generated rules apart from the policy
//! itself.

#![warn(missing_docs)]

pub mod generate;
pub mod hujson;
pub mod merge;
pub mod policy;
pub mod rule;
pub mod tag;
pub mod validate;

pub use generate::{add_network, generate, remove_network};
pub use hujson::{parse_hujson, to_hujson};
pub use merge::{merge, MergeStrategy};
pub use policy::{AclPolicy, AclRule, AclTest, PolicyError, Proto, RuleAction};
pub use rule::{exit_rule, is_exit_rule, is_isolation_rule, isolation_rule, INTERNET_DST};
pub use tag::{sanitize, tag_for, TAG_PREFIX};
pub use validate::{validate, Validation};
