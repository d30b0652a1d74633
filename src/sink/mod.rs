// src/sink/mod.rs
// =============================================================================
// Saves extracted page text to disk.
//
// Layout under the output root, one directory per domain:
//
//   <output_root>/<domain>/<artifact-id>.txt   one file per saved page
//   <output_root>/<domain>/index.txt           "<url> -> <artifact-id>.txt"
//
// Each artifact file looks like:
//
//   URL: https://example.com/about
//   Crawled at: 2024-05-01T12:00:00.000000+00:00
//   --------------------------------------------------------------------------------
//
//   <page text>
//
// Local writes must succeed: any IO error is returned to the caller.
// The remote upload that follows is best-effort (see upload.rs).
// =============================================================================

mod upload;

pub use upload::{HttpPutUploader, NoopUploader, UploadError, Uploader};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::crawl::normalize::host_of;

pub const MANIFEST_FILE: &str = "index.txt";
const SEPARATOR_WIDTH: usize = 80;

#[derive(Debug, Error)]
pub enum SinkError {
    /// Local persistence failed; the page is NOT saved
    #[error("failed to persist {url} to {path}: {source}")]
    Persistence {
        url: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The URL has no host to name a directory after
    #[error("cannot derive a storage directory from {0}")]
    NoHost(String),
}

/// One saved page
#[derive(Debug, Clone, Serialize)]
pub struct Artifact {
    pub url: String,
    #[serde(skip)]
    pub text: String,
    pub captured_at: DateTime<Utc>,
    /// "<uuid>.txt", the name recorded in the manifest
    pub file_name: String,
    pub path: PathBuf,
}

/// Writes artifacts under one output root
pub struct ContentSink {
    output_root: PathBuf,
    uploader: Arc<dyn Uploader>,
    // Serializes manifest appends from concurrent workers
    manifest_lock: Mutex<()>,
}

impl ContentSink {
    pub fn new(output_root: impl Into<PathBuf>, uploader: Arc<dyn Uploader>) -> Self {
        Self {
            output_root: output_root.into(),
            uploader,
            manifest_lock: Mutex::new(()),
        }
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    // Writes the artifact file, appends the manifest line, then uploads.
    pub async fn save(&self, url: &str, text: &str) -> Result<Artifact, SinkError> {
        let domain = host_of(url).ok_or_else(|| SinkError::NoHost(url.to_string()))?;
        let domain_dir = self.output_root.join(&domain);
        fs::create_dir_all(&domain_dir)
            .await
            .map_err(|source| persistence(url, &domain_dir, source))?;

        let file_name = format!("{}.txt", Uuid::new_v4().simple());
        let path = domain_dir.join(&file_name);
        let captured_at = Utc::now();

        let contents = format!(
            "URL: {}\nCrawled at: {}\n{}\n\n{}",
            url,
            captured_at.to_rfc3339(),
            "-".repeat(SEPARATOR_WIDTH),
            text
        );
        fs::write(&path, contents)
            .await
            .map_err(|source| persistence(url, &path, source))?;

        info!(url, path = %path.display(), "saved page");

        self.append_manifest(url, &domain_dir, &file_name).await?;

        let key = format!("{}/{}", domain, file_name);
        if let Err(e) = self.uploader.upload(&path, &key).await {
            warn!(url, key = %key, error = %e, "upload failed, keeping local copy only");
        }

        Ok(Artifact {
            url: url.to_string(),
            text: text.to_string(),
            captured_at,
            file_name,
            path,
        })
    }

    async fn append_manifest(
        &self,
        url: &str,
        domain_dir: &Path,
        file_name: &str,
    ) -> Result<(), SinkError> {
        let manifest_path = domain_dir.join(MANIFEST_FILE);
        let line = format!("{} -> {}\n", url, file_name);

        let _guard = self.manifest_lock.lock().await;
        let mut manifest = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&manifest_path)
            .await
            .map_err(|source| persistence(url, &manifest_path, source))?;
        manifest
            .write_all(line.as_bytes())
            .await
            .map_err(|source| persistence(url, &manifest_path, source))?;
        manifest
            .flush()
            .await
            .map_err(|source| persistence(url, &manifest_path, source))?;
        Ok(())
    }
}

fn persistence(url: &str, path: &Path, source: std::io::Error) -> SinkError {
    SinkError::Persistence {
        url: url.to_string(),
        path: path.to_path_buf(),
        source,
    }
}
