use serde::{Deserialize, Serialize};

use super::access::AccessEntry;

/// Distance in edges from the traversal root. The root is at depth 0.
pub type Depth = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// May have children
    Folder,
    /// Never has children
    File,
}

/// A single file or folder in the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub permissions: Vec<AccessEntry>,
    #[serde(default)]
    pub parents: Vec<String>,
}

impl Node {
    pub fn folder(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, NodeKind::Folder)
    }

    pub fn file(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, NodeKind::File)
    }

    fn new(id: impl Into<String>, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            permissions: Vec::new(),
            parents: Vec::new(),
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    /// The entry that currently holds [`Role::Owner`], if the store reported one
    pub fn owner(&self) -> Option<&AccessEntry> {
        self.permissions.iter().find(|entry| entry.role.is_owner())
    }
}
