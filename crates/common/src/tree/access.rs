//! # Access entries
//!
//! An [`AccessEntry`] is one principal's grant of a [`Role`] on a node.
//!
//! Each entry has:
//! - A stable **id**, used to address the grant for update and delete
//! - A **principal** ([`Principal`]) the grant is held by
//! - A **role** ([`Role`]) defining the level of access
//!
//! ## Renaming a principal
//!
//! Stores do not support changing the principal of an existing grant.
//! Moving a grant to a different email is a delete followed by a create,
//! and the two calls are not atomic.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The level of access a grant carries.
///
/// Variants are declared in ascending order of privilege, so the derived
/// ordering compares roles by privilege:
/// `Owner > Organizer > FileOrganizer > Writer > Commenter > Reader`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Reader,
    Commenter,
    Writer,
    /// Shared-drive content manager
    FileOrganizer,
    /// Shared-drive manager
    Organizer,
    Owner,
}

impl Role {
    pub fn is_owner(&self) -> bool {
        matches!(self, Role::Owner)
    }

    /// Anything above [`Role::Reader`]
    pub fn is_elevated(&self) -> bool {
        *self > Role::Reader
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Reader => "reader",
            Role::Commenter => "commenter",
            Role::Writer => "writer",
            Role::FileOrganizer => "fileOrganizer",
            Role::Organizer => "organizer",
            Role::Owner => "owner",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who a grant is held by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "address", rename_all = "snake_case")]
pub enum Principal {
    /// A single account, by email
    User(String),
    /// A mailing list or group, by email
    Group(String),
    /// Everyone in a domain
    Domain(String),
    /// Anyone with the link
    Anyone,
}

impl Principal {
    pub fn user(email: impl Into<String>) -> Self {
        Principal::User(email.into())
    }

    /// The email address for user and group principals
    pub fn email(&self) -> Option<&str> {
        match self {
            Principal::User(email) | Principal::Group(email) => Some(email),
            Principal::Domain(_) | Principal::Anyone => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Principal::User(_) => "user",
            Principal::Group(_) => "group",
            Principal::Domain(_) => "domain",
            Principal::Anyone => "anyone",
        }
    }

    /// Whether this is the user with the given email, ignoring ASCII case
    pub fn is_user(&self, email: &str) -> bool {
        matches!(self, Principal::User(own) if own.eq_ignore_ascii_case(email))
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Principal::User(address) | Principal::Group(address) | Principal::Domain(address) => {
                f.write_str(address)
            }
            Principal::Anyone => f.write_str("anyone"),
        }
    }
}

/// An existing grant on a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessEntry {
    /// Stable for the life of the grant
    pub id: String,
    pub principal: Principal,
    pub role: Role,
    /// Human readable name the store reports for the principal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl AccessEntry {
    pub fn new(id: impl Into<String>, principal: Principal, role: Role) -> Self {
        Self {
            id: id.into(),
            principal,
            role,
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Display name when known, otherwise the principal itself
    pub fn holder(&self) -> String {
        match &self.display_name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => self.principal.to_string(),
        }
    }
}

/// A grant to be created. It has no id until the store assigns one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccessEntry {
    pub principal: Principal,
    pub role: Role,
}

impl NewAccessEntry {
    pub fn reader(principal: Principal) -> Self {
        Self {
            principal,
            role: Role::Reader,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_role_privilege_order() {
        assert!(Role::Owner > Role::Writer);
        assert!(Role::Writer > Role::Commenter);
        assert!(Role::Commenter > Role::Reader);
        assert!(Role::Organizer > Role::Writer);
        assert!(!Role::Reader.is_elevated());
        assert!(Role::Commenter.is_elevated());
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(
            serde_json::to_string(&Role::FileOrganizer).unwrap(),
            "\"fileOrganizer\""
        );
        let role: Role = serde_json::from_str("\"commenter\"").unwrap();
        assert_eq!(role, Role::Commenter);
        assert_eq!(Role::Owner.to_string(), "owner");
    }

    #[test]
    fn test_principal_email() {
        assert_eq!(
            Principal::user("alice@example.com").email(),
            Some("alice@example.com")
        );
        assert_eq!(
            Principal::Group("team@example.com".to_string()).email(),
            Some("team@example.com")
        );
        assert_eq!(Principal::Domain("example.com".to_string()).email(), None);
        assert_eq!(Principal::Anyone.email(), None);
    }

    #[test]
    fn test_is_user_ignores_case() {
        let principal = Principal::user("Alice@Example.com");
        assert!(principal.is_user("alice@example.com"));
        assert!(!Principal::Group("alice@example.com".to_string()).is_user("alice@example.com"));
    }

    #[test]
    fn test_holder_prefers_display_name() {
        let entry = AccessEntry::new("p", Principal::user("alice@example.com"), Role::Reader);
        assert_eq!(entry.holder(), "alice@example.com");
        assert_eq!(entry.with_display_name("Alice").holder(), "Alice");
    }
}
