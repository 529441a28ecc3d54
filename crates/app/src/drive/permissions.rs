use common::tree::{AccessEntry, NewAccessEntry, Principal, Role};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{endpoint, ApiRequest, DriveError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionType {
    User,
    Group,
    Domain,
    Anyone,
}

/// Drive `Permission` resource, restricted to the fields we read or write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionResource {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: PermissionType,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl PermissionResource {
    /// `None` when the resource lacks the address its type requires
    pub fn into_entry(self) -> Option<AccessEntry> {
        let principal = match (self.kind, self.email_address, self.domain) {
            (PermissionType::User, Some(email), _) => Principal::User(email),
            (PermissionType::Group, Some(email), _) => Principal::Group(email),
            (PermissionType::Domain, _, Some(domain)) => Principal::Domain(domain),
            (PermissionType::Anyone, _, _) => Principal::Anyone,
            (kind, _, _) => {
                tracing::warn!(
                    permission_id = %self.id,
                    "skipping {:?} permission without an address",
                    kind
                );
                return None;
            }
        };
        Some(AccessEntry {
            id: self.id,
            principal,
            role: self.role,
            display_name: self.display_name,
        })
    }
}

impl From<&NewAccessEntry> for PermissionResource {
    fn from(entry: &NewAccessEntry) -> Self {
        let (kind, email_address, domain) = match &entry.principal {
            Principal::User(email) => (PermissionType::User, Some(email.clone()), None),
            Principal::Group(email) => (PermissionType::Group, Some(email.clone()), None),
            Principal::Domain(domain) => (PermissionType::Domain, None, Some(domain.clone())),
            Principal::Anyone => (PermissionType::Anyone, None, None),
        };
        Self {
            id: String::new(),
            kind,
            role: entry.role,
            email_address,
            domain,
            display_name: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeletePermissionRequest {
    pub file_id: String,
    pub permission_id: String,
}

impl ApiRequest for DeletePermissionRequest {
    type Response = ();

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, DriveError> {
        let url = endpoint(
            base_url,
            &["files", &self.file_id, "permissions", &self.permission_id],
        )?;
        Ok(client
            .delete(url)
            .query(&[("supportsAllDrives", "true")]))
    }
}

#[derive(Debug, Clone)]
pub struct CreatePermissionRequest {
    pub file_id: String,
    pub permission: PermissionResource,
    /// Required by Drive when the new role is owner
    pub transfer_ownership: bool,
}

impl ApiRequest for CreatePermissionRequest {
    type Response = PermissionResource;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, DriveError> {
        let url = endpoint(base_url, &["files", &self.file_id, "permissions"])?;
        let mut query = vec![("supportsAllDrives", "true")];
        if self.transfer_ownership {
            query.push(("transferOwnership", "true"));
        }
        Ok(client.post(url).query(&query).json(&self.permission))
    }
}

#[derive(Debug, Clone, Serialize)]
struct RoleUpdate {
    role: Role,
}

#[derive(Debug, Clone)]
pub struct UpdatePermissionRequest {
    pub file_id: String,
    pub permission_id: String,
    pub role: Role,
}

impl ApiRequest for UpdatePermissionRequest {
    type Response = PermissionResource;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, DriveError> {
        let url = endpoint(
            base_url,
            &["files", &self.file_id, "permissions", &self.permission_id],
        )?;
        Ok(client
            .patch(url)
            .query(&[("supportsAllDrives", "true")])
            .json(&RoleUpdate { role: self.role }))
    }
}
