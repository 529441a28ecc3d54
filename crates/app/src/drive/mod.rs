//! Google Drive v3 REST client
//!
//! Each endpoint is a request type implementing [`ApiRequest`]; the
//! [`DriveClient`] sends them and implements
//! [`RemoteTree`](common::tree::RemoteTree) on top.

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

mod client;
mod error;
pub mod files;
pub mod permissions;

pub use client::DriveClient;
pub use error::DriveError;

pub trait ApiRequest {
    type Response: DeserializeOwned;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, DriveError>;
}

/// Append percent-encoded path segments to the API base URL
pub(crate) fn endpoint(base_url: &Url, segments: &[&str]) -> Result<Url, DriveError> {
    let mut url = base_url.clone();
    url.path_segments_mut()
        .map_err(|_| DriveError::InvalidBaseUrl(base_url.clone()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
