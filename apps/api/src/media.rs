//! Media upload client.
//!
//! The media host is an opaque "store bytes, return URL" service. It sits
//! behind a trait so handlers take a passed-in dependency and tests can
//! substitute it. Upload failure is fatal to the create-with-picture
//! operation: there is no fallback and no retry.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// Media host failures.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// The upload request itself failed (network, non-2xx status).
    #[error("media upload failed: {0}")]
    Upload(String),

    /// The host answered, but not with a usable URL.
    #[error("media host returned an unusable response: {0}")]
    BadResponse(String),
}

/// An external service that stores raw image bytes and returns a stable
/// retrieval URL.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Uploads image bytes, returning the retrieval URL.
    async fn upload(&self, bytes: Vec<u8>, filename: &str) -> Result<String, MediaError>;
}

/// Expected media host response body.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
}

/// HTTP-backed media store client.
pub struct HttpMediaStore {
    client: reqwest::Client,
    upload_url: String,
    api_key: Option<String>,
}

impl HttpMediaStore {
    /// Creates a client for the given upload endpoint.
    pub fn new(upload_url: String, api_key: Option<String>) -> Self {
        HttpMediaStore {
            client: reqwest::Client::new(),
            upload_url,
            api_key,
        }
    }
}

#[async_trait]
impl MediaStore for HttpMediaStore {
    async fn upload(&self, bytes: Vec<u8>, filename: &str) -> Result<String, MediaError> {
        debug!(filename = %filename, size = bytes.len(), "Uploading picture to media host");

        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let mut request = self.client.post(&self.upload_url).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| MediaError::Upload(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MediaError::Upload(format!(
                "media host answered with status {status}"
            )));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| MediaError::BadResponse(e.to_string()))?;

        debug!(url = %body.url, "Picture stored");
        Ok(body.url)
    }
}
