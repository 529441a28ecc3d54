//! Shared fixtures for traversal integration tests
#![allow(dead_code)]

use common::prelude::*;
use common::testkit::MemoryTree;

/// Build a complete tree of folders `depth` levels deep below the root,
/// each folder holding `branching` children. Ids encode the path, e.g. `r.0.1`.
pub fn uniform_tree(depth: Depth, branching: usize, page_size: usize) -> MemoryTree {
    let tree = MemoryTree::new().with_page_size(page_size);
    tree.insert_root(Node::folder("r", "r"));
    let mut level = vec!["r".to_string()];
    for _ in 0..depth {
        let mut next = Vec::new();
        for parent in &level {
            for i in 0..branching {
                let id = format!("{}.{}", parent, i);
                tree.insert(parent, Node::folder(id.clone(), id.clone()));
                next.push(id);
            }
        }
        level = next;
    }
    tree
}

/// Depth of a node id produced by [`uniform_tree`]
pub fn depth_of(id: &str) -> Depth {
    id.matches('.').count()
}

/// Ids of listed nodes, in report order
pub fn listed_ids(report: &WalkReport) -> Vec<String> {
    report
        .events()
        .iter()
        .filter_map(|event| match event {
            Event::Listed(listed) => Some(listed.node.id.clone()),
            _ => None,
        })
        .collect()
}

pub fn user(id: &str, email: &str, role: Role) -> AccessEntry {
    AccessEntry::new(id, Principal::user(email), role)
}

pub fn onlab_migration() -> NormalizerConfig {
    NormalizerConfig {
        migration: Some(DomainMigration::new("onlab.us", "opennetworking.org")),
        ..Default::default()
    }
}
