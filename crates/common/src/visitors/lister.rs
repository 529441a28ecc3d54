use async_trait::async_trait;

use crate::tree::{Depth, Node, RemoteTree};
use crate::walk::{Event, ListedNode, NodeRef, NodeVisitor, Step, VisitorGenerator, WalkReport};

const DEFAULT_MARKER: char = '-';

/// Lists every node down to `max_depth`, one indented line per node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lister {
    max_depth: Depth,
    marker: char,
}

impl Lister {
    pub fn new(max_depth: Depth) -> Self {
        Self {
            max_depth,
            marker: DEFAULT_MARKER,
        }
    }

    /// Character repeated once per level of depth
    pub fn with_marker(mut self, marker: char) -> Self {
        self.marker = marker;
        self
    }
}

impl VisitorGenerator for Lister {
    type Visitor = ListVisitor;

    fn generate(&self, depth: Depth) -> Step<ListVisitor> {
        if depth > self.max_depth {
            return Step::Stop;
        }
        Step::Visit(ListVisitor {
            depth,
            indent: self.marker.to_string().repeat(depth),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListVisitor {
    depth: Depth,
    indent: String,
}

#[async_trait]
impl NodeVisitor for ListVisitor {
    async fn visit(&self, _tree: &dyn RemoteTree, node: &Node, report: &mut WalkReport) {
        report.record(Event::Listed(ListedNode {
            node: NodeRef::from(node),
            depth: self.depth,
            indent: self.indent.clone(),
        }));
    }
}
