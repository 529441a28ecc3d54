use async_trait::async_trait;

use super::access::{NewAccessEntry, Role};
use super::node::Node;

/// One page of a folder listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub nodes: Vec<Node>,
    /// Token for the next page. `None` (or an empty string) means this was the last page.
    pub next_page_token: Option<String>,
}

impl Page {
    pub fn last(nodes: Vec<Node>) -> Self {
        Self {
            nodes,
            next_page_token: None,
        }
    }

    /// The token to request next, treating an empty token as the end of the listing
    pub fn next_token(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|token| !token.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("node not found: {0}")]
    NotFound(String),
    #[error("remote rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(String),
}

/// Capability over a remote hierarchical store.
///
/// The traversal engine and the visitors only ever talk to the store
/// through this trait. Calls are issued one at a time and never retried.
#[async_trait]
pub trait RemoteTree: Send + Sync {
    async fn fetch_node(&self, id: &str) -> Result<Node, TreeError>;

    /// List one page of the children of `parent_id`.
    ///
    /// Pass `None` for the first page and the previous page's token afterwards.
    async fn list_children(
        &self,
        parent_id: &str,
        page_token: Option<&str>,
    ) -> Result<Page, TreeError>;

    async fn delete_permission(&self, node_id: &str, entry_id: &str) -> Result<(), TreeError>;

    async fn create_permission(
        &self,
        node_id: &str,
        entry: &NewAccessEntry,
    ) -> Result<(), TreeError>;

    async fn update_permission_role(
        &self,
        node_id: &str,
        entry_id: &str,
        role: Role,
    ) -> Result<(), TreeError>;

    /// Make the user with `email` the owner of the node.
    ///
    /// The previous owner keeps an elevated, non-owner grant.
    async fn transfer_ownership(&self, node_id: &str, email: &str) -> Result<(), TreeError>;
}
