use std::fmt;

use crate::tree::{Depth, Node, Principal, Role, TreeError};

/// Enough of a node to locate it again by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRef {
    pub id: String,
    pub name: String,
}

impl From<&Node> for NodeRef {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            name: node.name.clone(),
        }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// One line of a depth-indented listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedNode {
    pub node: NodeRef,
    pub depth: Depth,
    pub indent: String,
}

impl fmt::Display for ListedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.indent, self.node)
    }
}

/// What happened to a single access entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionChange {
    /// Grant deleted and recreated as a reader grant for `to`
    Migrated { to: String },
    /// Role lowered to reader in place
    Demoted { from: Role },
    /// Already a reader outside the migrated domain
    Ignored,
    /// Held by the ownership transfer target and left alone
    Kept,
    OwnershipTransferred,
    /// Delete failed; the grant is untouched and no create was attempted
    RemoveFailed(TreeError),
    /// Delete succeeded but the replacement grant for `to` could not be created.
    /// The principal is left with no grant on the node.
    CreateFailed { to: String, error: TreeError },
    UpdateFailed(TreeError),
    TransferFailed(TreeError),
}

impl PermissionChange {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            PermissionChange::RemoveFailed(_)
                | PermissionChange::CreateFailed { .. }
                | PermissionChange::UpdateFailed(_)
                | PermissionChange::TransferFailed(_)
        )
    }

    /// A mutation the store accepted
    pub fn is_applied(&self) -> bool {
        matches!(
            self,
            PermissionChange::Migrated { .. }
                | PermissionChange::Demoted { .. }
                | PermissionChange::OwnershipTransferred
        )
    }
}

/// Outcome of processing one access entry on one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionEvent {
    pub node: NodeRef,
    /// Display name of the principal, or the principal itself when the store has none
    pub holder: String,
    pub principal: Principal,
    pub change: PermissionChange,
}

impl fmt::Display for PermissionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let holder = &self.holder;
        let principal = &self.principal;
        let kind = principal.kind();
        let node = &self.node;
        match &self.change {
            PermissionChange::Migrated { to } => {
                write!(f, "Added {holder} ({to}) as reader on {node}")
            }
            PermissionChange::Demoted { from } => {
                write!(f, "Set {holder} ({principal}) from {from} to reader on {node}")
            }
            PermissionChange::Ignored => write!(f, "Ignoring {holder} ({principal}) on {node}"),
            PermissionChange::Kept => write!(f, "Keeping {holder} ({principal}) as owner of {node}"),
            PermissionChange::OwnershipTransferred => {
                write!(f, "Transferred ownership of {node} to {holder} ({principal})")
            }
            PermissionChange::RemoveFailed(error) => write!(
                f,
                "Error removing permission for {kind} {holder} ({principal}) on {node}: {error}"
            ),
            PermissionChange::CreateFailed { to, error } => write!(
                f,
                "Error creating permission for {kind} {holder} ({to}) on {node}: {error}"
            ),
            PermissionChange::UpdateFailed(error) => write!(
                f,
                "Error updating permission for {kind} {holder} ({principal}) on {node}: {error}"
            ),
            PermissionChange::TransferFailed(error) => write!(
                f,
                "Error transferring ownership of {node} to {holder} ({principal}): {error}"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Listed(ListedNode),
    /// The normalizer started on a node
    Inspected(NodeRef),
    Permission(PermissionEvent),
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Listed(listed) => fmt::Display::fmt(listed, f),
            Event::Inspected(node) => write!(f, "{node}"),
            Event::Permission(event) => fmt::Display::fmt(event, f),
        }
    }
}

/// Rendered after the permission lines of each normalized node
pub const NODE_SEPARATOR: &str = "------------------------";

/// Everything a walk did, in visitation order.
///
/// Per-entry failures end up here rather than aborting the walk, so a
/// finished report is the full record needed to remediate by hand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkReport {
    pub nodes_visited: usize,
    events: Vec<Event>,
}

impl WalkReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn permission_events(&self) -> impl Iterator<Item = &PermissionEvent> {
        self.events.iter().filter_map(|event| match event {
            Event::Permission(permission) => Some(permission),
            _ => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = &PermissionEvent> {
        self.permission_events()
            .filter(|event| event.change.is_failure())
    }

    pub fn applied(&self) -> impl Iterator<Item = &PermissionEvent> {
        self.permission_events()
            .filter(|event| event.change.is_applied())
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// One rendered line per event, with a [`NODE_SEPARATOR`] closing the
    /// entries of each normalized node
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.events.len());
        let mut open_node = false;
        for event in &self.events {
            if let Event::Inspected(_) = event {
                if open_node {
                    lines.push(NODE_SEPARATOR.to_string());
                }
                open_node = true;
            }
            lines.push(event.to_string());
        }
        if open_node {
            lines.push(NODE_SEPARATOR.to_string());
        }
        lines
    }
}

impl fmt::Display for WalkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn node() -> NodeRef {
        NodeRef {
            id: "N".to_string(),
            name: "Plan".to_string(),
        }
    }

    #[test]
    fn test_listed_line() {
        let listed = ListedNode {
            node: node(),
            depth: 2,
            indent: "--".to_string(),
        };
        assert_eq!(listed.to_string(), "-- Plan (N)");
    }

    #[test]
    fn test_failure_line_names_node_and_principal() {
        let event = PermissionEvent {
            node: node(),
            holder: "Alice".to_string(),
            principal: Principal::user("alice@onlab.us"),
            change: PermissionChange::RemoveFailed(TreeError::Rejected {
                status: 403,
                message: "owner cannot be removed".to_string(),
            }),
        };
        let line = event.to_string();
        assert!(line.contains("alice@onlab.us"));
        assert!(line.contains("Plan (N)"));
        assert!(event.change.is_failure());
        assert!(!event.change.is_applied());
    }

    #[test]
    fn test_report_filters() {
        let mut report = WalkReport::new();
        report.record(Event::Inspected(node()));
        report.record(Event::Permission(PermissionEvent {
            node: node(),
            holder: "bob@example.com".to_string(),
            principal: Principal::user("bob@example.com"),
            change: PermissionChange::Demoted { from: Role::Writer },
        }));
        report.record(Event::Permission(PermissionEvent {
            node: node(),
            holder: "carol@example.com".to_string(),
            principal: Principal::user("carol@example.com"),
            change: PermissionChange::UpdateFailed(TreeError::Transport("reset".to_string())),
        }));

        assert_eq!(report.permission_events().count(), 2);
        assert_eq!(report.applied().count(), 1);
        assert_eq!(report.failures().count(), 1);
        assert_eq!(report.lines().len(), 4);
        assert_eq!(report.lines()[0], "Plan (N)");
    }

    #[test]
    fn test_separator_after_each_normalized_node() {
        let other = NodeRef {
            id: "M".to_string(),
            name: "Budget".to_string(),
        };
        let mut report = WalkReport::new();
        report.record(Event::Inspected(node()));
        report.record(Event::Permission(PermissionEvent {
            node: node(),
            holder: "bob@example.com".to_string(),
            principal: Principal::user("bob@example.com"),
            change: PermissionChange::Ignored,
        }));
        report.record(Event::Inspected(other));

        assert_eq!(
            report.lines(),
            vec![
                "Plan (N)".to_string(),
                "Ignoring bob@example.com (bob@example.com) on Plan (N)".to_string(),
                NODE_SEPARATOR.to_string(),
                "Budget (M)".to_string(),
                NODE_SEPARATOR.to_string(),
            ]
        );
    }

    #[test]
    fn test_listing_has_no_separators() {
        let mut report = WalkReport::new();
        report.record(Event::Listed(ListedNode {
            node: node(),
            depth: 0,
            indent: String::new(),
        }));
        assert_eq!(report.lines(), vec![" Plan (N)".to_string()]);
    }
}
