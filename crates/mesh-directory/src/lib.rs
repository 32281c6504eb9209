//! OpenMesh Directory - Control-Plane API Client
//!
//! Async access to the two external collaborators of the policy engine:
//! the network directory (tenants and their nodes) and the policy store
//! (the ACL document). Both are traits so the sync layer can run against
//! the real REST API ([`HttpDirectory`]) or an in-memory double
//! ([`MemoryDirectory`]).
//!
//! Credentials are an explicit [`Session`] value passed at construction and
//! threaded through every call; nothing is read from ambient global state.

#![warn(missing_docs)]

pub mod config;
pub mod directory;
pub mod http;
pub mod memory;

pub use config::{DirectoryConfig, Session};
pub use directory::{DirectoryError, NetworkDirectory, PolicyStore, PolicyVersion, StoredPolicy};
pub use http::HttpDirectory;
pub use memory::MemoryDirectory;
