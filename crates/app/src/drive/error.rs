use common::tree::TreeError;
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum DriveError {
    #[error("HTTP request failed: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("invalid response body: {0}")]
    Json(#[from] serde_json::Error),
    #[error("API base URL cannot take path segments: {0}")]
    InvalidBaseUrl(Url),
    #[error("no access token configured")]
    MissingToken,
    #[error("access token is not a valid header value")]
    InvalidToken,
    #[error("HTTP status {0}: {1}")]
    HttpStatus(StatusCode, String),
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// The `error.message` of a Drive error body, or the body itself
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

impl From<DriveError> for TreeError {
    fn from(error: DriveError) -> Self {
        match error {
            DriveError::HttpStatus(status, body) if status == StatusCode::NOT_FOUND => {
                TreeError::NotFound(error_message(&body))
            }
            DriveError::HttpStatus(status, body) => TreeError::Rejected {
                status: status.as_u16(),
                message: error_message(&body),
            },
            other => TreeError::Transport(other.to_string()),
        }
    }
}
