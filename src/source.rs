//! Where transcripts come from.
//!
//! The [`Fetcher`] trait hides whether the manifest and the transcript files
//! sit behind a static HTTP server ([`HttpFetcher`]) or in a local directory
//! ([`DirFetcher`]). Locations handed to a fetcher are always produced by
//! its own [`resolve`](Fetcher::resolve), relative to the configured root.
//!
//! ```toml
//! [source]
//! root = "https://example.org/chats/"   # or "/srv/chats"
//! manifest = "manifest.json"
//! base_dir = "txt/"
//! ```

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::header::CACHE_CONTROL;
use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::SourceConfig;

/// Read access to a static file tree.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Turn a root-relative path into a fetchable location.
    fn resolve(&self, relative: &str) -> Result<String>;

    /// Fetch the full text at `location`.
    ///
    /// Fails on transport errors and on any non-success status.
    async fn fetch_text(&self, location: &str) -> Result<String>;

    /// Lightweight existence check (`HEAD` for HTTP).
    async fn head_ok(&self, location: &str) -> Result<bool>;

    /// Existence check by a plain read, for servers that mishandle `HEAD`.
    async fn get_ok(&self, location: &str) -> Result<bool>;
}

/// Join a transcript name under `base_dir` (which may omit its trailing `/`).
pub fn join_base(base_dir: &str, name: &str) -> String {
    if base_dir.is_empty() {
        name.to_string()
    } else if base_dir.ends_with('/') {
        format!("{}{}", base_dir, name)
    } else {
        format!("{}/{}", base_dir, name)
    }
}

/// Pick the fetcher for `source.root`: HTTP for `http(s)://`, a directory otherwise.
pub fn from_config(source: &SourceConfig) -> Result<Box<dyn Fetcher>> {
    let root = source.root.trim();
    if root.starts_with("http://") || root.starts_with("https://") {
        let timeout = source.timeout_secs.map(Duration::from_secs);
        Ok(Box::new(HttpFetcher::new(root, timeout)?))
    } else {
        let dir = PathBuf::from(root.strip_prefix("file://").unwrap_or(root));
        if !dir.is_dir() {
            bail!("source root is not a directory: {}", dir.display());
        }
        Ok(Box::new(DirFetcher::new(dir)))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// HTTP
// ═══════════════════════════════════════════════════════════════════════

/// Fetches from a static file server. Every request bypasses caches.
pub struct HttpFetcher {
    root: Url,
    client: reqwest::Client,
}

impl HttpFetcher {
    /// `timeout` of `None` leaves requests unbounded.
    pub fn new(root: &str, timeout: Option<Duration>) -> Result<Self> {
        let normalized = if root.ends_with('/') {
            root.to_string()
        } else {
            format!("{}/", root)
        };
        let root = Url::parse(&normalized)
            .with_context(|| format!("Invalid source root URL: {}", normalized))?;

        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self { root, client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    fn resolve(&self, relative: &str) -> Result<String> {
        let url = self
            .root
            .join(relative)
            .with_context(|| format!("Cannot resolve '{}' against {}", relative, self.root))?;
        Ok(url.to_string())
    }

    async fn fetch_text(&self, location: &str) -> Result<String> {
        let resp = self
            .client
            .get(location)
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await
            .with_context(|| format!("GET {} failed", location))?;

        let status = resp.status();
        if !status.is_success() {
            bail!("GET {} returned {}", location, status);
        }

        resp.text()
            .await
            .with_context(|| format!("Failed to read body of {}", location))
    }

    async fn head_ok(&self, location: &str) -> Result<bool> {
        let resp = self
            .client
            .head(location)
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    async fn get_ok(&self, location: &str) -> Result<bool> {
        let resp = self
            .client
            .get(location)
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await?;
        Ok(resp.status().is_success())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Local directory
// ═══════════════════════════════════════════════════════════════════════

/// Reads the same layout from a local directory.
pub struct DirFetcher {
    root: PathBuf,
}

impl DirFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl Fetcher for DirFetcher {
    fn resolve(&self, relative: &str) -> Result<String> {
        Ok(self.root.join(relative).to_string_lossy().to_string())
    }

    async fn fetch_text(&self, location: &str) -> Result<String> {
        let bytes = tokio::fs::read(location)
            .await
            .with_context(|| format!("Failed to read {}", location))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn head_ok(&self, location: &str) -> Result<bool> {
        Ok(tokio::fs::metadata(location)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false))
    }

    async fn get_ok(&self, location: &str) -> Result<bool> {
        self.head_ok(location).await
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_base_handles_slashes() {
        assert_eq!(join_base("txt/", "_chat 1.txt"), "txt/_chat 1.txt");
        assert_eq!(join_base("txt", "_chat 1.txt"), "txt/_chat 1.txt");
        assert_eq!(join_base("", "a.txt"), "a.txt");
    }

    #[test]
    fn http_resolve_encodes_spaces() {
        let fetcher = HttpFetcher::new("http://localhost:8000/app", None).unwrap();
        assert_eq!(
            fetcher.resolve("txt/_chat 1.txt").unwrap(),
            "http://localhost:8000/app/txt/_chat%201.txt"
        );
        assert_eq!(
            fetcher.resolve("manifest.json").unwrap(),
            "http://localhost:8000/app/manifest.json"
        );
    }

    #[tokio::test]
    async fn dir_fetcher_reads_and_probes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "olá").unwrap();
        let fetcher = DirFetcher::new(dir.path());

        let a = fetcher.resolve("a.txt").unwrap();
        assert_eq!(fetcher.fetch_text(&a).await.unwrap(), "olá");
        assert!(fetcher.head_ok(&a).await.unwrap());

        let missing = fetcher.resolve("b.txt").unwrap();
        assert!(fetcher.fetch_text(&missing).await.is_err());
        assert!(!fetcher.head_ok(&missing).await.unwrap());
        assert!(!fetcher.get_ok(&missing).await.unwrap());
    }

    #[test]
    fn from_config_rejects_missing_dir() {
        let source = SourceConfig {
            root: "/definitely/not/here".to_string(),
            ..SourceConfig::default()
        };
        assert!(from_config(&source).is_err());
    }
}
