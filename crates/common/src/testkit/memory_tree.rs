use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::tree::{
    AccessEntry, NewAccessEntry, Node, Page, Principal, RemoteTree, Role, TreeError,
};

const DEFAULT_PAGE_SIZE: usize = 100;

/// A call received by a [`MemoryTree`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Fetch {
        id: String,
    },
    List {
        parent_id: String,
        page_token: Option<String>,
    },
    Delete {
        node_id: String,
        entry_id: String,
    },
    Create {
        node_id: String,
        entry: NewAccessEntry,
    },
    Update {
        node_id: String,
        entry_id: String,
        role: Role,
    },
    Transfer {
        node_id: String,
        email: String,
    },
}

impl Call {
    /// Whether the call changes access control
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Call::Fetch { .. } | Call::List { .. })
    }
}

/// A call that should fail every time it is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Fetching this node id
    Fetch(String),
    /// Listing the given zero-based page of a parent's children
    List { parent_id: String, page: usize },
    Delete { node_id: String, entry_id: String },
    /// Creating any grant on the node
    Create { node_id: String },
    Update { node_id: String, entry_id: String },
    Transfer { node_id: String },
}

#[derive(Debug, Default)]
struct State {
    nodes: HashMap<String, Node>,
    children: HashMap<String, Vec<String>>,
    calls: Vec<Call>,
    faults: Vec<Fault>,
    next_entry: usize,
}

impl State {
    fn node_mut(&mut self, id: &str) -> Result<&mut Node, TreeError> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| TreeError::NotFound(id.to_string()))
    }

    fn fail_if(&self, fault: &Fault) -> Result<(), TreeError> {
        if self.faults.contains(fault) {
            return Err(TreeError::Rejected {
                status: 500,
                message: format!("injected fault: {:?}", fault),
            });
        }
        Ok(())
    }

    fn new_entry_id(&mut self) -> String {
        self.next_entry += 1;
        format!("perm-{}", self.next_entry)
    }
}

fn forbidden(message: &str) -> TreeError {
    TreeError::Rejected {
        status: 403,
        message: message.to_string(),
    }
}

/// In-memory [`RemoteTree`].
///
/// Children are listed in insertion order. Page tokens are the decimal offset
/// of the next child. Like real stores, the owner grant cannot be deleted or
/// demoted directly unless owner protection is switched off.
#[derive(Debug)]
pub struct MemoryTree {
    page_size: usize,
    protect_owner: bool,
    state: Mutex<State>,
}

impl Default for MemoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTree {
    pub fn new() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            protect_owner: true,
            state: Mutex::new(State::default()),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Allow the owner grant to be deleted and demoted like any other
    pub fn without_owner_protection(mut self) -> Self {
        self.protect_owner = false;
        self
    }

    /// Add a node with no parent
    pub fn insert_root(&self, node: Node) {
        let mut state = self.state.lock();
        state.nodes.insert(node.id.clone(), node);
    }

    /// Add a node as the last child of `parent_id`
    pub fn insert(&self, parent_id: &str, mut node: Node) {
        let mut state = self.state.lock();
        if !node.parents.iter().any(|p| p == parent_id) {
            node.parents.push(parent_id.to_string());
        }
        state
            .children
            .entry(parent_id.to_string())
            .or_default()
            .push(node.id.clone());
        state.nodes.insert(node.id.clone(), node);
    }

    /// Attach an existing grant to a node. Unknown nodes are ignored.
    pub fn grant(&self, node_id: &str, entry: AccessEntry) {
        let mut state = self.state.lock();
        if let Some(node) = state.nodes.get_mut(node_id) {
            node.permissions.push(entry);
        }
    }

    pub fn inject(&self, fault: Fault) {
        self.state.lock().faults.push(fault);
    }

    pub fn node(&self, id: &str) -> Option<Node> {
        self.state.lock().nodes.get(id).cloned()
    }

    pub fn permissions(&self, id: &str) -> Vec<AccessEntry> {
        self.node(id).map(|node| node.permissions).unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    /// Calls that change access control
    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }
}

#[async_trait]
impl RemoteTree for MemoryTree {
    async fn fetch_node(&self, id: &str) -> Result<Node, TreeError> {
        let mut state = self.state.lock();
        state.calls.push(Call::Fetch { id: id.to_string() });
        state.fail_if(&Fault::Fetch(id.to_string()))?;
        state
            .nodes
            .get(id)
            .cloned()
            .ok_or_else(|| TreeError::NotFound(id.to_string()))
    }

    async fn list_children(
        &self,
        parent_id: &str,
        page_token: Option<&str>,
    ) -> Result<Page, TreeError> {
        let mut state = self.state.lock();
        state.calls.push(Call::List {
            parent_id: parent_id.to_string(),
            page_token: page_token.map(str::to_string),
        });

        let offset = match page_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| TreeError::Rejected {
                    status: 400,
                    message: format!("invalid page token: {}", token),
                })?,
            None => 0,
        };
        state.fail_if(&Fault::List {
            parent_id: parent_id.to_string(),
            page: offset / self.page_size,
        })?;

        let ids = state.children.get(parent_id).cloned().unwrap_or_default();
        let end = (offset + self.page_size).min(ids.len());
        let nodes = ids
            .get(offset..end)
            .unwrap_or_default()
            .iter()
            .filter_map(|id| state.nodes.get(id).cloned())
            .collect();
        let next_page_token = (end < ids.len()).then(|| end.to_string());

        Ok(Page {
            nodes,
            next_page_token,
        })
    }

    async fn delete_permission(&self, node_id: &str, entry_id: &str) -> Result<(), TreeError> {
        let mut state = self.state.lock();
        state.calls.push(Call::Delete {
            node_id: node_id.to_string(),
            entry_id: entry_id.to_string(),
        });
        state.fail_if(&Fault::Delete {
            node_id: node_id.to_string(),
            entry_id: entry_id.to_string(),
        })?;

        let protect_owner = self.protect_owner;
        let node = state.node_mut(node_id)?;
        let index = node
            .permissions
            .iter()
            .position(|entry| entry.id == entry_id)
            .ok_or_else(|| TreeError::NotFound(entry_id.to_string()))?;
        if protect_owner && node.permissions[index].role.is_owner() {
            return Err(forbidden("the owner of a node cannot be removed"));
        }
        node.permissions.remove(index);
        Ok(())
    }

    async fn create_permission(
        &self,
        node_id: &str,
        entry: &NewAccessEntry,
    ) -> Result<(), TreeError> {
        let mut state = self.state.lock();
        state.calls.push(Call::Create {
            node_id: node_id.to_string(),
            entry: entry.clone(),
        });
        state.fail_if(&Fault::Create {
            node_id: node_id.to_string(),
        })?;
        if entry.role.is_owner() {
            return Err(forbidden("ownership can only be granted by transfer"));
        }

        let id = state.new_entry_id();
        let node = state.node_mut(node_id)?;
        match node
            .permissions
            .iter_mut()
            .find(|existing| existing.principal == entry.principal)
        {
            Some(existing) => existing.role = entry.role,
            None => node
                .permissions
                .push(AccessEntry::new(id, entry.principal.clone(), entry.role)),
        }
        Ok(())
    }

    async fn update_permission_role(
        &self,
        node_id: &str,
        entry_id: &str,
        role: Role,
    ) -> Result<(), TreeError> {
        let mut state = self.state.lock();
        state.calls.push(Call::Update {
            node_id: node_id.to_string(),
            entry_id: entry_id.to_string(),
            role,
        });
        state.fail_if(&Fault::Update {
            node_id: node_id.to_string(),
            entry_id: entry_id.to_string(),
        })?;

        let protect_owner = self.protect_owner;
        let node = state.node_mut(node_id)?;
        let entry = node
            .permissions
            .iter_mut()
            .find(|entry| entry.id == entry_id)
            .ok_or_else(|| TreeError::NotFound(entry_id.to_string()))?;
        if protect_owner && (entry.role.is_owner() || role.is_owner()) {
            return Err(forbidden("ownership can only be changed by transfer"));
        }
        entry.role = role;
        Ok(())
    }

    async fn transfer_ownership(&self, node_id: &str, email: &str) -> Result<(), TreeError> {
        let mut state = self.state.lock();
        state.calls.push(Call::Transfer {
            node_id: node_id.to_string(),
            email: email.to_string(),
        });
        state.fail_if(&Fault::Transfer {
            node_id: node_id.to_string(),
        })?;

        let id = state.new_entry_id();
        let node = state.node_mut(node_id)?;
        for entry in node.permissions.iter_mut() {
            if entry.role.is_owner() {
                entry.role = Role::Writer;
            }
        }
        match node
            .permissions
            .iter_mut()
            .find(|entry| entry.principal.is_user(email))
        {
            Some(entry) => entry.role = Role::Owner,
            None => node.permissions.push(AccessEntry::new(
                id,
                Principal::user(email),
                Role::Owner,
            )),
        }
        Ok(())
    }
}
