/// In-memory remote tree for tests
///
/// [`MemoryTree`] implements [`RemoteTree`](crate::tree::RemoteTree) over a
/// map of nodes, serves listings in fixed-size pages, records every call it
/// receives and fails the calls you tell it to.
///
/// # Example
///
/// ```rust
/// use common::prelude::*;
/// use common::testkit::{Fault, MemoryTree};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let tree = MemoryTree::new().with_page_size(1);
/// tree.insert_root(Node::folder("R", "Drive"));
/// tree.insert("R", Node::file("F", "Readme"));
/// tree.inject(Fault::Fetch("missing".to_string()));
///
/// let report = walk(&tree, "R", &Lister::new(1)).await.unwrap();
/// assert_eq!(report.nodes_visited, 2);
/// # }
/// ```
mod memory_tree;

pub use memory_tree::{Call, Fault, MemoryTree};
