use common::tree::{Node, NodeKind, Page};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use super::permissions::PermissionResource;
use super::{endpoint, ApiRequest, DriveError};

/// Mime type Drive reports for folders
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

const FILE_FIELDS: &str = "id, name, mimeType, permissions, parents";
const LIST_FIELDS: &str = "nextPageToken, files(id, name, mimeType, permissions, parents)";

/// Drive `File` resource, restricted to the fields we request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResource {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub permissions: Vec<PermissionResource>,
    #[serde(default)]
    pub parents: Vec<String>,
}

impl From<FileResource> for Node {
    fn from(file: FileResource) -> Self {
        let kind = if file.mime_type == FOLDER_MIME_TYPE {
            NodeKind::Folder
        } else {
            NodeKind::File
        };
        Node {
            id: file.id,
            name: file.name,
            kind,
            permissions: file
                .permissions
                .into_iter()
                .filter_map(PermissionResource::into_entry)
                .collect(),
            parents: file.parents,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<FileResource>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl From<FileList> for Page {
    fn from(list: FileList) -> Self {
        Page {
            nodes: list.files.into_iter().map(Node::from).collect(),
            next_page_token: list.next_page_token.filter(|token| !token.is_empty()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GetFileRequest {
    pub file_id: String,
}

impl ApiRequest for GetFileRequest {
    type Response = FileResource;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, DriveError> {
        let url = endpoint(base_url, &["files", &self.file_id])?;
        Ok(client
            .get(url)
            .query(&[("fields", FILE_FIELDS), ("supportsAllDrives", "true")]))
    }
}

#[derive(Debug, Clone)]
pub struct ListFilesRequest {
    pub parent_id: String,
    pub page_token: Option<String>,
    pub page_size: u32,
}

impl ListFilesRequest {
    /// Drive query selecting the direct children of the parent
    fn query(&self) -> String {
        let escaped = self.parent_id.replace('\\', "\\\\").replace('\'', "\\'");
        format!("'{}' in parents", escaped)
    }
}

impl ApiRequest for ListFilesRequest {
    type Response = FileList;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, DriveError> {
        let url = endpoint(base_url, &["files"])?;
        let mut request = client.get(url).query(&[
            ("q", self.query().as_str()),
            ("fields", LIST_FIELDS),
            ("pageSize", self.page_size.to_string().as_str()),
            ("supportsAllDrives", "true"),
            ("includeItemsFromAllDrives", "true"),
        ]);
        if let Some(token) = &self.page_token {
            request = request.query(&[("pageToken", token.as_str())]);
        }
        Ok(request)
    }
}
