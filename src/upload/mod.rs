//! Cloud uploader
//!
//! Pushes a locally saved image to the configured object-storage bucket
//! under `images/<basename>` and marks the object publicly readable.
//! There is no retry, no backoff, and no offline queue; a failed upload
//! is reported and the local file is kept.
//!
//! Bucket identity and the bearer token come from a JSON credential file
//! resolved at startup; that file is fixed configuration, never shown in
//! the UI.
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::AppError;

/// Credential file name, looked up in the working directory first,
/// then in the user config directory under `picam-studio/`
const CREDENTIALS_FILE: &str = "service_account.json";

/// Prefix under which every captured image is stored in the bucket
const KEY_PREFIX: &str = "images";

fn default_endpoint() -> String {
    // Google Cloud Storage JSON API; overridable for other S3-style stores
    "https://storage.googleapis.com".to_string()
}

/// Bucket identity and credentials, deserialized from the JSON file.
///
/// Note: `token` is a ready-to-use bearer token, not a Google service
/// account key; the app performs no OAuth exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct BucketConfig {
    pub bucket: String,
    pub token: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl BucketConfig {
    /// Load the credential file. A missing or malformed file is an
    /// `Initialization` error; the caller degrades the upload feature
    /// instead of exiting.
    pub fn load() -> Result<Self, AppError> {
        let path = Self::resolve_path()
            .ok_or_else(|| AppError::Initialization(format!("{} not found", CREDENTIALS_FILE)))?;

        let data = std::fs::read_to_string(&path)
            .map_err(|e| AppError::Initialization(format!("{}: {}", path.display(), e)))?;

        Self::parse(&data)
    }

    fn parse(data: &str) -> Result<Self, AppError> {
        serde_json::from_str(data)
            .map_err(|e| AppError::Initialization(format!("bad credential file: {}", e)))
    }

    fn resolve_path() -> Option<PathBuf> {
        let local = PathBuf::from(CREDENTIALS_FILE);
        if local.exists() {
            return Some(local);
        }
        let fallback = dirs::config_dir()?.join("picam-studio").join(CREDENTIALS_FILE);
        fallback.exists().then_some(fallback)
    }
}

/// Object key for a local file: `images/<basename>`
pub fn object_key(path: &Path) -> String {
    let basename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}/{}", KEY_PREFIX, basename)
}

/// Percent-encode the key for use inside a URL path segment.
/// Keys are always `images/<basename>`, so the separator is the only
/// character that needs escaping.
fn encode_key(key: &str) -> String {
    key.replace('/', "%2F")
}

/// Upload client. Cheap to clone (reqwest clients share their pool), so
/// each background task can carry its own copy.
#[derive(Debug, Clone)]
pub struct Uploader {
    client: reqwest::Client,
    config: BucketConfig,
}

impl Uploader {
    pub fn new(config: BucketConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Push one file to the bucket and mark it publicly readable.
    /// Returns the object key on success. Runs on the background
    /// executor; the UI thread only sees the completion message.
    pub async fn upload(&self, path: PathBuf) -> Result<String, AppError> {
        let key = object_key(&path);

        let data = tokio::fs::read(&path)
            .await
            .map_err(|e| AppError::Upload(format!("could not read {}: {}", path.display(), e)))?;

        let upload_url = format!(
            "{}/upload/storage/v1/b/{}/o",
            self.config.endpoint, self.config.bucket
        );
        self.client
            .post(&upload_url)
            .query(&[("uploadType", "media"), ("name", key.as_str())])
            .bearer_auth(&self.config.token)
            .header(reqwest::header::CONTENT_TYPE, "image/jpeg")
            .body(data)
            .send()
            .await?
            .error_for_status()?;

        // Objects are public-read once uploaded
        let acl_url = format!(
            "{}/storage/v1/b/{}/o/{}/acl",
            self.config.endpoint,
            self.config.bucket,
            encode_key(&key)
        );
        self.client
            .post(&acl_url)
            .bearer_auth(&self.config.token)
            .json(&serde_json::json!({ "entity": "allUsers", "role": "READER" }))
            .send()
            .await?
            .error_for_status()?;

        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_key_uses_basename_under_prefix() {
        assert_eq!(
            object_key(Path::new("/home/pi/photos/out.jpg")),
            "images/out.jpg"
        );
        assert_eq!(object_key(Path::new("out.jpg")), "images/out.jpg");
    }

    #[test]
    fn key_separator_is_encoded() {
        assert_eq!(encode_key("images/out.jpg"), "images%2Fout.jpg");
    }

    #[test]
    fn config_parses_with_default_endpoint() {
        let config =
            BucketConfig::parse(r#"{"bucket": "camera-shots", "token": "abc123"}"#).unwrap();
        assert_eq!(config.bucket, "camera-shots");
        assert_eq!(config.endpoint, "https://storage.googleapis.com");
    }

    #[test]
    fn config_endpoint_is_overridable() {
        let config = BucketConfig::parse(
            r#"{"bucket": "b", "token": "t", "endpoint": "http://localhost:9000"}"#,
        )
        .unwrap();
        assert_eq!(config.endpoint, "http://localhost:9000");
    }

    #[test]
    fn malformed_credentials_are_an_initialization_error() {
        let err = BucketConfig::parse("{not json").unwrap_err();
        assert!(matches!(err, AppError::Initialization(_)));
    }
}
