//! Error types for loading transcripts and generating manifests.
//!
//! Probe failures during manifest generation are deliberately absent: a
//! probe that cannot reach the server counts as "file not there".

use thiserror::Error;

/// Why a load produced no corpus. No partial corpus is ever kept.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The manifest could not be fetched or answered with a non-success status.
    #[error("manifest not found at {url}: {reason}")]
    ManifestUnavailable { url: String, reason: String },

    /// The manifest was fetched but is not a JSON array of strings.
    #[error("manifest at {url} is not a JSON array of file names: {source}")]
    ManifestInvalid {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// One listed file failed; the whole batch is discarded.
    #[error("file not accessible: {url}: {reason}")]
    DocumentFetch { url: String, reason: String },
}

#[derive(Error, Debug)]
pub enum GenerateError {
    /// The whole scan range was probed without a single hit.
    #[error("no files matching '{pattern}' found up to index {max_index}")]
    NoCandidatesFound { pattern: String, max_index: u32 },

    #[error("failed to write manifest: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("failed to serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),
}
