/**
 * Data model for a remote hierarchical store.
 *  - Nodes (files and folders) and their access entries
 *  - The `RemoteTree` capability the traversal calls through
 */
pub mod tree;
/**
 * In-memory `RemoteTree` used by tests across the workspace.
 *  Supports paging, call recording and fault injection.
 */
pub mod testkit;
/**
 * Concrete visitor generators.
 *  - Lister: indented listing up to a maximum depth
 *  - Normalizer: rewrites access entries on every node visited
 */
pub mod visitors;
/**
 * Depth-aware pre-order traversal engine
 *  and the report it accumulates.
 */
pub mod walk;

pub mod prelude {
    pub use crate::tree::{
        AccessEntry, Depth, NewAccessEntry, Node, NodeKind, Page, Principal, RemoteTree, Role,
        TreeError,
    };
    pub use crate::visitors::{DomainMigration, Lister, NormalizeMode, Normalizer, NormalizerConfig};
    pub use crate::walk::{
        walk, walk_children, Event, NodeVisitor, PermissionChange, PermissionEvent, Step,
        VisitorGenerator, WalkError, WalkReport,
    };
}
