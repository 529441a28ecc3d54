//! # Permission normalization
//!
//! Brings the access entries of every visited node in line with a read-only
//! policy:
//!
//! - A user grant whose email is in the migrated source domain, or one of its
//!   subdomains, is deleted and recreated as a reader grant with the source
//!   domain suffix swapped for the target domain.
//! - Any other grant above reader is lowered to reader in place.
//! - Reader grants are left alone.
//!
//! In [`NormalizeMode::TransferOwnership`] the node is first handed to a new
//! owner, whose grant is then kept as is. If the transfer fails their grant is
//! normalized like any other.
//!
//! Entries are processed one call at a time and nothing is rolled back. If a
//! delete succeeds and the following create fails, the principal is left with
//! no grant on the node; the report says so and the walk moves on. Stores
//! generally refuse to delete or demote the owner's grant, so expect one
//! failure per node for the owner in [`NormalizeMode::ReadOnly`].

use std::sync::Arc;

use async_trait::async_trait;

use crate::tree::{AccessEntry, Depth, NewAccessEntry, Node, Principal, RemoteTree, Role};
use crate::walk::{
    Event, NodeRef, NodeVisitor, PermissionChange, PermissionEvent, Step, VisitorGenerator,
    WalkReport,
};

/// Moves user grants from one email domain to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainMigration {
    source: String,
    target: String,
}

impl DomainMigration {
    /// Domains may be given with or without a leading `@`
    pub fn new(source: impl AsRef<str>, target: impl AsRef<str>) -> Self {
        Self {
            source: bare_domain(source.as_ref()),
            target: bare_domain(target.as_ref()),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// The same address with the source domain suffix replaced by the target.
    ///
    /// Subdomains of the source match (`eng.onlab.us` becomes
    /// `eng.opennetworking.org`); a domain that merely ends in the same
    /// characters (`evil-onlab.us`) does not.
    pub fn rewrite(&self, email: &str) -> Option<String> {
        let (local, domain) = email.rsplit_once('@')?;
        if local.is_empty() || self.source.is_empty() {
            return None;
        }
        let split = domain.len().checked_sub(self.source.len())?;
        let suffix = domain.get(split..)?;
        let prefix = &domain[..split];
        let on_boundary = prefix.is_empty() || prefix.ends_with('.');
        if !on_boundary || !suffix.eq_ignore_ascii_case(&self.source) {
            return None;
        }
        Some(format!("{}@{}{}", local, prefix, self.target))
    }
}

fn bare_domain(domain: &str) -> String {
    domain.trim().trim_start_matches('@').to_string()
}

/// What happens to a node's ownership.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NormalizeMode {
    /// Demote every grant to reader, owners included
    #[default]
    ReadOnly,
    /// Make `new_owner` the owner first, then demote everyone else
    TransferOwnership { new_owner: String },
}

impl NormalizeMode {
    fn new_owner(&self) -> Option<&str> {
        match self {
            NormalizeMode::ReadOnly => None,
            NormalizeMode::TransferOwnership { new_owner } => Some(new_owner),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizerConfig {
    pub migration: Option<DomainMigration>,
    /// Deepest level to normalize. `None` walks the whole tree.
    pub depth_cap: Option<Depth>,
    pub mode: NormalizeMode,
}

/// Generator that applies [`NormalizeVisitor`] at every depth up to the cap.
#[derive(Debug, Clone)]
pub struct Normalizer {
    config: Arc<NormalizerConfig>,
}

impl Normalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }
}

impl VisitorGenerator for Normalizer {
    type Visitor = NormalizeVisitor;

    fn generate(&self, depth: Depth) -> Step<NormalizeVisitor> {
        match self.config.depth_cap {
            Some(cap) if depth > cap => Step::Stop,
            _ => Step::Visit(NormalizeVisitor {
                config: Arc::clone(&self.config),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NormalizeVisitor {
    config: Arc<NormalizerConfig>,
}

#[async_trait]
impl NodeVisitor for NormalizeVisitor {
    async fn visit(&self, tree: &dyn RemoteTree, node: &Node, report: &mut WalkReport) {
        let node_ref = NodeRef::from(node);
        tracing::info!("normalizing {}", node_ref);
        report.record(Event::Inspected(node_ref.clone()));

        // The new owner's grant is only kept once they actually own the node
        let mut kept_owner = None;
        if let Some(new_owner) = self.config.mode.new_owner() {
            let already_owner = node
                .owner()
                .is_some_and(|owner| owner.principal.is_user(new_owner));
            if already_owner {
                kept_owner = Some(new_owner);
            } else {
                let principal = Principal::user(new_owner);
                let change = match tree.transfer_ownership(&node.id, new_owner).await {
                    Ok(()) => {
                        kept_owner = Some(new_owner);
                        PermissionChange::OwnershipTransferred
                    }
                    Err(error) => PermissionChange::TransferFailed(error),
                };
                emit(
                    report,
                    PermissionEvent {
                        node: node_ref.clone(),
                        holder: principal.to_string(),
                        principal,
                        change,
                    },
                );
            }
        }

        for entry in &node.permissions {
            let change = match kept_owner {
                Some(owner) if entry.principal.is_user(owner) => PermissionChange::Kept,
                _ => self.normalize_entry(tree, node, entry).await,
            };
            emit(
                report,
                PermissionEvent {
                    node: node_ref.clone(),
                    holder: entry.holder(),
                    principal: entry.principal.clone(),
                    change,
                },
            );
        }
    }
}

impl NormalizeVisitor {
    async fn normalize_entry(
        &self,
        tree: &dyn RemoteTree,
        node: &Node,
        entry: &AccessEntry,
    ) -> PermissionChange {
        if let (Principal::User(email), Some(migration)) =
            (&entry.principal, &self.config.migration)
        {
            if let Some(to) = migration.rewrite(email) {
                return migrate(tree, node, entry, to).await;
            }
        }

        if !entry.role.is_elevated() {
            return PermissionChange::Ignored;
        }
        match tree
            .update_permission_role(&node.id, &entry.id, Role::Reader)
            .await
        {
            Ok(()) => PermissionChange::Demoted { from: entry.role },
            Err(error) => PermissionChange::UpdateFailed(error),
        }
    }
}

/// Delete then recreate as reader. The create is only attempted once the delete succeeded.
async fn migrate(
    tree: &dyn RemoteTree,
    node: &Node,
    entry: &AccessEntry,
    to: String,
) -> PermissionChange {
    if let Err(error) = tree.delete_permission(&node.id, &entry.id).await {
        return PermissionChange::RemoveFailed(error);
    }
    let replacement = NewAccessEntry::reader(Principal::User(to.clone()));
    match tree.create_permission(&node.id, &replacement).await {
        Ok(()) => PermissionChange::Migrated { to },
        Err(error) => PermissionChange::CreateFailed { to, error },
    }
}

fn emit(report: &mut WalkReport, event: PermissionEvent) {
    if event.change.is_failure() {
        tracing::warn!("{}", event);
    } else {
        tracing::info!("{}", event);
    }
    report.record(Event::Permission(event));
}
