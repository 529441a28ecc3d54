//! Remote tree data model
//!
//! This module defines the types the traversal engine reads and mutates:
//!
//! - **[`Node`]**: one file or folder in the remote store
//! - **[`AccessEntry`]**: one principal's grant of a [`Role`] on a node
//! - **[`RemoteTree`]**: the capability used to fetch, list and re-permission nodes
//!
//! Nodes are created and destroyed entirely by the remote store. Nothing in
//! this crate persists them; the only writes go through [`RemoteTree`]'s
//! permission calls.

mod access;
mod node;
mod remote;

pub use access::{AccessEntry, NewAccessEntry, Principal, Role};
pub use node::{Depth, Node, NodeKind};
pub use remote::{Page, RemoteTree, TreeError};
