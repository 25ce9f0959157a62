// Mirror-fallback downloader — streams one remote kernel into its cache slot.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{DownloadAttempt, Error, Result};

pub struct Downloader {
    client: Client,
    timeout: Duration,
    shutdown: CancellationToken,
}

impl Downloader {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
            shutdown: CancellationToken::new(),
        }
    }

    /// Cancel in-flight fetches and refuse new ones.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Fetch the file at `dest` from the first candidate URL that succeeds.
    ///
    /// Candidates are tried strictly in order, each attempt bounded by the
    /// configured timeout. An attempt streams to a `.part` sibling and only
    /// a completed, non-empty body is renamed into place, so no partial
    /// file ever appears at `dest`. There is no same-URL retry here;
    /// transient-retry policy belongs to the caller.
    pub async fn fetch(&self, candidates: &[String], dest: &Path) -> Result<()> {
        let filename = dest
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let mut attempts: Vec<DownloadAttempt> = Vec::new();

        for url in candidates {
            if self.shutdown.is_cancelled() {
                attempts.push(DownloadAttempt {
                    url: url.clone(),
                    reason: "cancelled".to_string(),
                });
                break;
            }

            let outcome = tokio::select! {
                r = tokio::time::timeout(self.timeout, self.attempt(url, dest)) => match r {
                    Ok(inner) => inner,
                    Err(_) => Err(format!("timed out after {}s", self.timeout.as_secs())),
                },
                _ = self.shutdown.cancelled() => Err("cancelled".to_string()),
            };

            match outcome {
                Ok(bytes) => {
                    info!("downloaded kernel {} ({} bytes) from {}", filename, bytes, url);
                    return Ok(());
                }
                Err(reason) => {
                    warn!("kernel fetch failed for {}: {} ({})", filename, reason, url);
                    let _ = tokio::fs::remove_file(part_path(dest)).await;
                    attempts.push(DownloadAttempt {
                        url: url.clone(),
                        reason,
                    });
                }
            }
        }

        Err(Error::KernelUnavailable { filename, attempts })
    }

    /// One attempt against one URL. Returns the byte count written.
    async fn attempt(&self, url: &str, dest: &Path) -> std::result::Result<u64, String> {
        debug!("fetching {}", url);
        let mut resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = resp.status();
        if !status.is_success() {
            return Err(format!("HTTP {}", status.as_u16()));
        }

        let part = part_path(dest);
        let mut file = tokio::fs::File::create(&part)
            .await
            .map_err(|e| e.to_string())?;

        let mut written: u64 = 0;
        while let Some(chunk) = resp.chunk().await.map_err(|e| e.to_string())? {
            file.write_all(&chunk).await.map_err(|e| e.to_string())?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(|e| e.to_string())?;
        drop(file);

        if written == 0 {
            let _ = tokio::fs::remove_file(&part).await;
            return Err("empty response body".to_string());
        }

        tokio::fs::rename(&part, dest)
            .await
            .map_err(|e| e.to_string())?;
        Ok(written)
    }
}

fn part_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("download");
    dest.with_file_name(format!("{name}.part"))
}
