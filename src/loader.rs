//! Manifest-driven loading of the transcript corpus.
//!
//! # Workflow
//!
//! 1. Fetch the manifest (a JSON array of file names).
//! 2. Fetch every listed file concurrently.
//! 3. Tag each text with a language and categories.
//! 4. Append the documents in manifest order and seal the store.
//!
//! A single failing file fails the whole load: the first error wins, any
//! fetches still in flight are dropped, and no partial store is returned.

use futures::future::try_join_all;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::classify::KeywordTables;
use crate::config::{Config, SourceConfig};
use crate::error::LoadError;
use crate::models::{Document, Manifest};
use crate::progress::{ProgressEvent, ProgressReporter};
use crate::source::{self, join_base, Fetcher};
use crate::store::DocumentStore;

/// Load every file listed in the manifest into a sealed [`DocumentStore`].
pub async fn load_all(
    fetcher: &dyn Fetcher,
    source: &SourceConfig,
    tables: &KeywordTables,
    progress: &dyn ProgressReporter,
) -> Result<DocumentStore, LoadError> {
    let manifest = fetch_manifest(fetcher, &source.manifest).await?;
    let names = dedup_names(manifest);

    let total = names.len() as u64;
    let done = AtomicU64::new(0);

    let loaders = names.iter().map(|name| {
        let done = &done;
        async move {
            let relative = join_base(&source.base_dir, name);
            let url = fetcher
                .resolve(&relative)
                .map_err(|e| LoadError::DocumentFetch {
                    url: relative.clone(),
                    reason: format!("{:#}", e),
                })?;

            let text = fetcher
                .fetch_text(&url)
                .await
                .map_err(|e| LoadError::DocumentFetch {
                    url: url.clone(),
                    reason: format!("{:#}", e),
                })?;

            let lang = tables.guess_language(&text);
            let cats = tables.classify(&text);

            let n = done.fetch_add(1, Ordering::SeqCst) + 1;
            progress.report(ProgressEvent::Loading { n, total });

            Ok::<_, LoadError>(Document {
                file: name.clone(),
                url,
                text,
                lang,
                cats,
            })
        }
    });

    let docs = match try_join_all(loaders).await {
        Ok(docs) => docs,
        Err(e) => {
            tracing::warn!(error = %e, "load aborted");
            return Err(e);
        }
    };

    let mut store = DocumentStore::new();
    for doc in docs {
        store.push(doc);
    }
    store.mark_loaded();

    tracing::info!(documents = store.len(), "corpus loaded");
    Ok(store)
}

/// Status shown when there is no usable manifest.
pub const NO_MANIFEST_MESSAGE: &str = "No manifest found (run `tsearch generate` to create one).";

/// Load the corpus described by `config`, with CLI-facing error messages.
pub async fn load_configured(
    config: &Config,
    progress: &dyn ProgressReporter,
) -> anyhow::Result<DocumentStore> {
    let fetcher = source::from_config(&config.source)?;
    let tables = config.keyword_tables()?;

    match load_all(fetcher.as_ref(), &config.source, &tables, progress).await {
        Ok(store) => {
            eprintln!("Loaded {} files.", store.len());
            Ok(store)
        }
        Err(e @ (LoadError::ManifestUnavailable { .. } | LoadError::ManifestInvalid { .. })) => {
            Err(anyhow::Error::new(e).context(NO_MANIFEST_MESSAGE))
        }
        Err(e @ LoadError::DocumentFetch { .. }) => {
            Err(anyhow::Error::new(e).context("Failed to load transcripts"))
        }
    }
}

async fn fetch_manifest(fetcher: &dyn Fetcher, relative: &str) -> Result<Manifest, LoadError> {
    let url = fetcher
        .resolve(relative)
        .map_err(|e| LoadError::ManifestUnavailable {
            url: relative.to_string(),
            reason: format!("{:#}", e),
        })?;

    let body = fetcher
        .fetch_text(&url)
        .await
        .map_err(|e| LoadError::ManifestUnavailable {
            url: url.clone(),
            reason: format!("{:#}", e),
        })?;

    serde_json::from_str(&body).map_err(|source| LoadError::ManifestInvalid { url, source })
}

/// Drop repeated names, keeping the first occurrence.
fn dedup_names(manifest: Manifest) -> Vec<String> {
    let mut seen = HashSet::new();
    manifest
        .into_iter()
        .filter(|name| {
            let fresh = seen.insert(name.clone());
            if !fresh {
                tracing::warn!(file = %name, "duplicate manifest entry skipped");
            }
            fresh
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Language;
    use crate::progress::NoProgress;
    use crate::source::testing::MapFetcher;

    async fn load(fetcher: &MapFetcher) -> Result<DocumentStore, LoadError> {
        load_all(
            fetcher,
            &SourceConfig::default(),
            &KeywordTables::default(),
            &NoProgress,
        )
        .await
    }

    #[tokio::test]
    async fn loads_in_manifest_order() {
        let fetcher = MapFetcher::new(&[
            ("manifest.json", r#"["b.txt", "a.txt"]"#),
            ("txt/a.txt", "Necesito ayuda con mi registro"),
            ("txt/b.txt", "Seu boleto vence no prazo"),
        ]);
        let store = load(&fetcher).await.unwrap();
        assert!(store.is_loaded());
        let files: Vec<_> = store.iter().map(|d| d.file.as_str()).collect();
        assert_eq!(files, vec!["b.txt", "a.txt"]);
        assert_eq!(store.get("a.txt").unwrap().lang, Language::Es);
        assert_eq!(store.get("b.txt").unwrap().url, "txt/b.txt");
    }

    #[tokio::test]
    async fn missing_manifest_is_reported() {
        let fetcher = MapFetcher::new(&[]);
        let err = load(&fetcher).await.unwrap_err();
        assert!(matches!(err, LoadError::ManifestUnavailable { .. }));
    }

    #[tokio::test]
    async fn malformed_manifest_is_reported() {
        let fetcher = MapFetcher::new(&[("manifest.json", r#"{"files": []}"#)]);
        let err = load(&fetcher).await.unwrap_err();
        assert!(matches!(err, LoadError::ManifestInvalid { .. }));
    }

    #[tokio::test]
    async fn one_missing_file_fails_the_batch() {
        let fetcher = MapFetcher::new(&[
            ("manifest.json", r#"["a.txt", "gone.txt"]"#),
            ("txt/a.txt", "hello"),
        ]);
        match load(&fetcher).await {
            Err(LoadError::DocumentFetch { url, .. }) => assert_eq!(url, "txt/gone.txt"),
            other => panic!("expected DocumentFetch, got {:?}", other.map(|s| s.len())),
        }
    }

    #[tokio::test]
    async fn duplicates_load_once() {
        let fetcher = MapFetcher::new(&[
            ("manifest.json", r#"["a.txt", "a.txt"]"#),
            ("txt/a.txt", "hello"),
        ]);
        let store = load(&fetcher).await.unwrap();
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn empty_manifest_loads_empty_store() {
        let fetcher = MapFetcher::new(&[("manifest.json", "[]")]);
        let store = load(&fetcher).await.unwrap();
        assert!(store.is_loaded());
        assert!(store.is_empty());
    }
}
