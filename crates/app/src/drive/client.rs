use async_trait::async_trait;
use common::tree::{NewAccessEntry, Node, Page, Principal, RemoteTree, Role, TreeError};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use url::Url;

use super::error::DriveError;
use super::files::{GetFileRequest, ListFilesRequest};
use super::permissions::{
    CreatePermissionRequest, DeletePermissionRequest, PermissionResource,
    UpdatePermissionRequest,
};
use super::ApiRequest;

#[derive(Debug, Clone)]
pub struct DriveClient {
    pub remote: Url,
    client: Client,
    page_size: u32,
}

impl DriveClient {
    pub fn new(remote: &Url, access_token: &str, page_size: u32) -> Result<Self, DriveError> {
        let access_token = access_token.trim();
        if access_token.is_empty() {
            return Err(DriveError::MissingToken);
        }

        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", access_token))
            .map_err(|_| DriveError::InvalidToken)?;
        authorization.set_sensitive(true);

        let mut default_headers = HeaderMap::new();
        default_headers.insert(AUTHORIZATION, authorization);
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder().default_headers(default_headers).build()?;

        Ok(Self {
            remote: remote.clone(),
            client,
            page_size: page_size.max(1),
        })
    }

    pub async fn call<T: ApiRequest>(&self, request: T) -> Result<T::Response, DriveError> {
        let request_builder = request.build_request(&self.remote, &self.client)?;
        let response = request_builder.send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(DriveError::HttpStatus(status, body));
        }

        // Deletes answer 204 with no body
        let body = if body.trim().is_empty() { "null" } else { body.as_str() };
        Ok(serde_json::from_str(body)?)
    }

    /// Get the base URL for API requests
    pub fn base_url(&self) -> &Url {
        &self.remote
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }
}

#[async_trait]
impl RemoteTree for DriveClient {
    async fn fetch_node(&self, id: &str) -> Result<Node, TreeError> {
        let file = self
            .call(GetFileRequest {
                file_id: id.to_string(),
            })
            .await?;
        Ok(Node::from(file))
    }

    async fn list_children(
        &self,
        parent_id: &str,
        page_token: Option<&str>,
    ) -> Result<Page, TreeError> {
        let list = self
            .call(ListFilesRequest {
                parent_id: parent_id.to_string(),
                page_token: page_token.map(str::to_string),
                page_size: self.page_size,
            })
            .await?;
        Ok(Page::from(list))
    }

    async fn delete_permission(&self, node_id: &str, entry_id: &str) -> Result<(), TreeError> {
        self.call(DeletePermissionRequest {
            file_id: node_id.to_string(),
            permission_id: entry_id.to_string(),
        })
        .await?;
        Ok(())
    }

    async fn create_permission(
        &self,
        node_id: &str,
        entry: &NewAccessEntry,
    ) -> Result<(), TreeError> {
        self.call(CreatePermissionRequest {
            file_id: node_id.to_string(),
            permission: PermissionResource::from(entry),
            transfer_ownership: false,
        })
        .await?;
        Ok(())
    }

    async fn update_permission_role(
        &self,
        node_id: &str,
        entry_id: &str,
        role: Role,
    ) -> Result<(), TreeError> {
        self.call(UpdatePermissionRequest {
            file_id: node_id.to_string(),
            permission_id: entry_id.to_string(),
            role,
        })
        .await?;
        Ok(())
    }

    async fn transfer_ownership(&self, node_id: &str, email: &str) -> Result<(), TreeError> {
        let owner = NewAccessEntry {
            principal: Principal::user(email),
            role: Role::Owner,
        };
        self.call(CreatePermissionRequest {
            file_id: node_id.to_string(),
            permission: PermissionResource::from(&owner),
            transfer_ownership: true,
        })
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote() -> Url {
        Url::parse("https://www.googleapis.com/drive/v3/").unwrap()
    }

    #[test]
    fn test_new_requires_token() {
        assert!(matches!(
            DriveClient::new(&remote(), "  ", 100),
            Err(DriveError::MissingToken)
        ));
        assert!(matches!(
            DriveClient::new(&remote(), "bad\ntoken", 100),
            Err(DriveError::InvalidToken)
        ));
    }

    #[test]
    fn test_page_size_at_least_one() {
        let client = DriveClient::new(&remote(), "token", 0).unwrap();
        assert_eq!(client.page_size(), 1);
        assert_eq!(client.base_url(), &remote());
    }
}
