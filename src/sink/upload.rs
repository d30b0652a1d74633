// src/sink/upload.rs
// =============================================================================
// Remote copies of saved pages.
//
// After a page is written locally, the sink hands the file to an Uploader.
// Uploading is best-effort: the local file is the copy of record, so an
// upload failure is logged by the sink and otherwise ignored.
//
// Implementations:
// - NoopUploader: no remote storage configured
// - HttpPutUploader: PUTs the file to <endpoint>/<bucket>/<key>, which works
//   with S3-compatible gateways that accept unauthenticated or pre-signed PUTs
// =============================================================================

use async_trait::async_trait;
use reqwest::Client;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("upload request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("storage rejected upload of {key}: HTTP {status}")]
    Rejected { key: String, status: u16 },
}

/// Ships a local artifact file to durable remote storage
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, local_path: &Path, key: &str) -> Result<(), UploadError>;
}

/// Used when no remote storage is configured
#[derive(Debug, Default, Clone)]
pub struct NoopUploader;

#[async_trait]
impl Uploader for NoopUploader {
    async fn upload(&self, local_path: &Path, key: &str) -> Result<(), UploadError> {
        debug!(path = %local_path.display(), key, "no remote storage configured, skipping upload");
        Ok(())
    }
}

/// PUTs artifacts into a bucket behind an HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpPutUploader {
    client: Client,
    endpoint: String,
    bucket: String,
}

impl HttpPutUploader {
    pub fn new(client: Client, endpoint: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            bucket: bucket.into(),
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, key)
    }
}

#[async_trait]
impl Uploader for HttpPutUploader {
    async fn upload(&self, local_path: &Path, key: &str) -> Result<(), UploadError> {
        let body = tokio::fs::read(local_path)
            .await
            .map_err(|source| UploadError::Read {
                path: local_path.display().to_string(),
                source,
            })?;

        let response = self
            .client
            .put(self.object_url(key))
            .header(reqwest::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(UploadError::Rejected {
                key: key.to_string(),
                status: response.status().as_u16(),
            });
        }

        debug!(key, bucket = %self.bucket, "uploaded artifact");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_uploads_file_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/pages/x.test/abc.txt")
            .match_body("saved text")
            .with_status(200)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let file = dir.path().join("abc.txt");
        std::fs::write(&file, "saved text").unwrap();

        let uploader = HttpPutUploader::new(Client::new(), format!("{}/", server.url()), "pages");
        uploader.upload(&file, "x.test/abc.txt").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_put_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PUT", "/pages/k.txt")
            .with_status(403)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let file = dir.path().join("k.txt");
        std::fs::write(&file, "body").unwrap();

        let uploader = HttpPutUploader::new(Client::new(), server.url(), "pages");
        let err = uploader.upload(&file, "k.txt").await.unwrap_err();
        assert!(matches!(err, UploadError::Rejected { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let uploader = HttpPutUploader::new(Client::new(), "http://127.0.0.1:1", "pages");
        let err = uploader
            .upload(Path::new("/no/such/file.txt"), "file.txt")
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Read { .. }));
    }
}
