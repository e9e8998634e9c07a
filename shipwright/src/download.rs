use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use std::io::Write;
use std::path::Path;

use crate::error::{Result, ShipError};

/// Fetches a release artifact to a local file
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download(&self, url: &str, dest: &Path) -> Result<()>;
}

pub struct HttpDownloader {
    http_client: Client,
}

impl HttpDownloader {
    pub fn new() -> Result<Self> {
        // No timeout: a release waits for the VCS host as long as it takes
        let http_client = Client::builder().user_agent("shipwright").build()?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        tracing::info!("Downloading {} to {}", url, dest.display());

        let response = self.http_client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(ShipError::Download {
                url: url.to_string(),
                message: format!("HTTP {status} - {error_text}"),
            });
        }

        // Stream into a sibling temp file so a broken transfer never leaves a
        // truncated tarball at `dest`
        let dir = dest.parent().unwrap_or_else(|| Path::new("."));
        let mut temp_file = tempfile::NamedTempFile::new_in(dir)?;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ShipError::Download {
                url: url.to_string(),
                message: format!("Failed to read chunk: {e}"),
            })?;
            temp_file.write_all(&chunk)?;
        }

        temp_file.persist(dest).map_err(|e| ShipError::Io(e.error))?;
        Ok(())
    }
}
