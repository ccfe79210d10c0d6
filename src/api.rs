//! HTTP client for the organizer backend.
//!
//! The backend exposes two calls:
//! `GET /get_files?root_path=..&recursive=..&required_exts=..` returning the
//! proposed layout, and `POST /update_files` taking that same layout back to
//! apply it.

use crate::error::ApiError;
use reqwest::Url;
use reqwest::blocking::{Client, Request};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_SERVER: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

const GET_FILES: &str = "get_files";
const UPDATE_FILES: &str = "update_files";

/// One file of the layout: where it is and where the backend wants it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileItem {
    pub src_path: String,
    pub dst_path: String,
}

/// Response body of `get_files`, and request body of `update_files`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedFiles {
    pub root_path: String,
    #[serde(default)]
    pub items: Vec<FileItem>,
}

impl FormattedFiles {
    pub fn from_json(body: &str) -> Result<Self, ApiError> {
        serde_json::from_str(body).map_err(ApiError::from)
    }
}

/// Query parameters of `get_files`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchRequest {
    pub root_path: String,
    pub recursive: bool,
    pub required_exts: String,
}

/// The two backend operations. The TUI and headless workflow only see this
/// trait, which keeps session logic testable without a server.
pub trait OrganizerApi: Send + Sync {
    fn get_formatted_files(&self, request: &FetchRequest) -> Result<FormattedFiles, ApiError>;
    fn update_structure(&self, files: &FormattedFiles) -> Result<(), ApiError>;
}

pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(server: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = parse_base_url(server)?;
        let http = Client::builder().timeout(timeout).build()?;
        Ok(ApiClient { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, name: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(name)
            .map_err(|e| ApiError::InvalidServerUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    pub fn fetch_request(&self, request: &FetchRequest) -> Result<Request, ApiError> {
        let url = self.endpoint(GET_FILES)?;
        Ok(self.http.get(url).query(request).build()?)
    }

    pub fn commit_request(&self, files: &FormattedFiles) -> Result<Request, ApiError> {
        let url = self.endpoint(UPDATE_FILES)?;
        Ok(self.http.post(url).json(files).build()?)
    }

    fn execute(&self, request: Request) -> Result<String, ApiError> {
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending backend request");
        let response = self.http.execute(request)?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(ApiError::Status { status, body });
        }
        debug!(%status, bytes = body.len(), "backend responded");
        Ok(body)
    }
}

impl OrganizerApi for ApiClient {
    fn get_formatted_files(&self, request: &FetchRequest) -> Result<FormattedFiles, ApiError> {
        info!(
            root_path = %request.root_path,
            recursive = request.recursive,
            required_exts = %request.required_exts,
            "requesting optimized layout"
        );
        let body = self.execute(self.fetch_request(request)?)?;
        FormattedFiles::from_json(&body)
    }

    fn update_structure(&self, files: &FormattedFiles) -> Result<(), ApiError> {
        info!(
            root_path = %files.root_path,
            items = files.items.len(),
            "submitting layout"
        );
        self.execute(self.commit_request(files)?)?;
        Ok(())
    }
}

/// Parse the server URL, making sure it ends in `/` so endpoint names are
/// appended rather than replacing the last path segment.
fn parse_base_url(server: &str) -> Result<Url, ApiError> {
    let trimmed = server.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };
    let url = Url::parse(&with_slash).map_err(|e| ApiError::InvalidServerUrl {
        url: server.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::InvalidServerUrl {
            url: server.to_string(),
            reason: "expected an http(s) URL".to_string(),
        });
    }
    Ok(url)
}
