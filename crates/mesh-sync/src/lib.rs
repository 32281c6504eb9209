//! OpenMesh Sync - Isolation Policy Orchestration
//!
//! Re-derives the ACL policy from the live tenant set after every
//! tenant-affecting mutation and writes it back to the policy store.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Syncer                              │
//! │                                                              │
//! │  create / rename / delete network      approve / revoke exit │
//! │        │ (primary action, loud)              │               │
//! │        └──────────────┬──────────────────────┘               │
//! │                       ▼ (best effort)                        │
//! │   list networks ► list nodes ► generate ► merge ► write back │
//! │                                              │               │
//! │                                              ▼               │
//! │                                     validate (advisory)      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The sync itself never fails the mutation that triggered it: failures are
//! logged and surfaced as a warning on the mutation outcome.

#![warn(missing_docs)]

pub mod mutations;
pub mod syncer;

pub use mutations::MutationOutcome;
pub use syncer::{SyncError, SyncOptions, SyncReport, Syncer};
