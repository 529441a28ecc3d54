//! Depth-aware traversal of a remote tree
//!
//! A walk is parameterized by a [`VisitorGenerator`]: a strategy value that,
//! asked once per depth level, either hands back the [`NodeVisitor`] to run on
//! every node at that depth or says [`Step::Stop`]. Stopping at depth `D`
//! prunes everything at depth `D` and below it.
//!
//! ```text
//! depth 0    R            generate(0) -> Visit(v0)   v0(R)
//!           / \
//! depth 1  D   F          generate(1) -> Visit(v1)   v1(D) ... v1(F)
//!          |
//! depth 2  x              generate(2) -> Stop        (nothing listed)
//! ```
//!
//! Traversal is pre-order and depth-first: a child is visited, then its whole
//! subtree, then the next sibling. Siblings come in the order the store lists
//! them. Listings are paged and pages are requested lazily, one at a time.
//!
//! The walk keeps its own stack of open listings instead of recursing, so
//! deep trees do not grow the call stack.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;

use crate::tree::{Depth, Node, Page, RemoteTree, TreeError};

mod report;

pub use report::{
    Event, ListedNode, NodeRef, PermissionChange, PermissionEvent, WalkReport, NODE_SEPARATOR,
};

/// Decision a generator makes for one depth level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<V> {
    /// Apply this visitor to every node at the depth and keep descending
    Visit(V),
    /// Visit nothing at this depth or below
    Stop,
}

/// Per-depth factory of node visitors.
pub trait VisitorGenerator: Send + Sync {
    type Visitor: NodeVisitor;

    fn generate(&self, depth: Depth) -> Step<Self::Visitor>;
}

/// Side effect applied to a single node.
///
/// Visitors never fail the walk. Whatever goes wrong is written to the report.
#[async_trait]
pub trait NodeVisitor: Send + Sync {
    async fn visit(&self, tree: &dyn RemoteTree, node: &Node, report: &mut WalkReport);
}

#[derive(Debug, thiserror::Error)]
pub enum WalkError {
    /// The root could not be fetched. Nothing was visited.
    #[error("unable to fetch node {id}: {source}")]
    Fetch {
        id: String,
        #[source]
        source: TreeError,
    },
    /// A page of some folder's children could not be listed and the walk was abandoned.
    #[error("unable to list children of {parent_id} at depth {depth}: {source}")]
    Listing {
        parent_id: String,
        depth: Depth,
        #[source]
        source: TreeError,
        /// Everything visited before the failure
        partial: Box<WalkReport>,
    },
}

impl WalkError {
    /// The report accumulated before the walk was abandoned, if any
    pub fn partial(&self) -> Option<&WalkReport> {
        match self {
            WalkError::Fetch { .. } => None,
            WalkError::Listing { partial, .. } => Some(partial),
        }
    }
}

/// Walk the tree rooted at `root_id`, visiting the root at depth 0.
pub async fn walk<G: VisitorGenerator>(
    tree: &dyn RemoteTree,
    root_id: &str,
    generator: &G,
) -> Result<WalkReport, WalkError> {
    let mut walker = Walker::new(tree, generator);
    if walker.levels.visitor(0).is_none() {
        return Ok(walker.report);
    }

    let root = match tree.fetch_node(root_id).await {
        Ok(root) => root,
        Err(source) => {
            tracing::error!("unable to fetch {}: {}", root_id, source);
            return Err(WalkError::Fetch {
                id: root_id.to_string(),
                source,
            });
        }
    };
    walker.visit(&root, 0).await;
    walker.descend(root_id, 1).await?;

    Ok(walker.report)
}

/// Walk only the children of `parent_id`, treating them as being at `depth`.
pub async fn walk_children<G: VisitorGenerator>(
    tree: &dyn RemoteTree,
    parent_id: &str,
    generator: &G,
    depth: Depth,
) -> Result<WalkReport, WalkError> {
    let mut walker = Walker::new(tree, generator);
    walker.descend(parent_id, depth).await?;
    Ok(walker.report)
}

/// Generator answers, asked for at most once per depth.
struct Levels<'g, G: VisitorGenerator> {
    generator: &'g G,
    decided: HashMap<Depth, Option<G::Visitor>>,
}

impl<'g, G: VisitorGenerator> Levels<'g, G> {
    fn visitor(&mut self, depth: Depth) -> Option<&G::Visitor> {
        let generator = self.generator;
        self.decided
            .entry(depth)
            .or_insert_with(|| match generator.generate(depth) {
                Step::Visit(visitor) => Some(visitor),
                Step::Stop => {
                    tracing::debug!(depth, "descent stopped");
                    None
                }
            })
            .as_ref()
    }
}

/// An open listing of one folder's children.
struct Frame {
    parent_id: String,
    depth: Depth,
    pending: VecDeque<Node>,
    next_page: Option<String>,
    listed: bool,
}

impl Frame {
    fn new(parent_id: String, depth: Depth) -> Self {
        Self {
            parent_id,
            depth,
            pending: VecDeque::new(),
            next_page: None,
            listed: false,
        }
    }

    fn is_exhausted(&self) -> bool {
        self.listed && self.next_page.is_none()
    }

    fn load(&mut self, page: Page) {
        self.next_page = page.next_token().map(str::to_string);
        self.pending = page.nodes.into();
        self.listed = true;
    }
}

struct Walker<'a, G: VisitorGenerator> {
    tree: &'a dyn RemoteTree,
    levels: Levels<'a, G>,
    report: WalkReport,
}

impl<'a, G: VisitorGenerator> Walker<'a, G> {
    fn new(tree: &'a dyn RemoteTree, generator: &'a G) -> Self {
        Self {
            tree,
            levels: Levels {
                generator,
                decided: HashMap::new(),
            },
            report: WalkReport::new(),
        }
    }

    async fn visit(&mut self, node: &Node, depth: Depth) {
        if let Some(visitor) = self.levels.visitor(depth) {
            visitor.visit(self.tree, node, &mut self.report).await;
            self.report.nodes_visited += 1;
        }
    }

    async fn descend(&mut self, parent_id: &str, depth: Depth) -> Result<(), WalkError> {
        if self.levels.visitor(depth).is_none() {
            return Ok(());
        }

        let mut stack = vec![Frame::new(parent_id.to_string(), depth)];
        while let Some(frame) = stack.last_mut() {
            let Some(node) = frame.pending.pop_front() else {
                if frame.is_exhausted() {
                    stack.pop();
                    continue;
                }

                tracing::debug!(
                    parent_id = %frame.parent_id,
                    depth = frame.depth,
                    page_token = ?frame.next_page,
                    "listing children"
                );
                match self
                    .tree
                    .list_children(&frame.parent_id, frame.next_page.as_deref())
                    .await
                {
                    Ok(page) => frame.load(page),
                    Err(source) => {
                        tracing::error!(
                            "unable to list children of {}: {}",
                            frame.parent_id,
                            source
                        );
                        return Err(WalkError::Listing {
                            parent_id: frame.parent_id.clone(),
                            depth: frame.depth,
                            source,
                            partial: Box::new(std::mem::take(&mut self.report)),
                        });
                    }
                }
                continue;
            };

            let depth = frame.depth;
            self.visit(&node, depth).await;
            if node.is_folder() && self.levels.visitor(depth + 1).is_some() {
                stack.push(Frame::new(node.id, depth + 1));
            }
        }

        Ok(())
    }
}
