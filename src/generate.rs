//! Manifest generation by probing numbered transcript names.
//!
//! Candidates follow `{prefix}{n}{suffix}` (`_chat 1.txt`, `_chat 2.txt`, …)
//! under the source's `base_dir`. They are probed one at a time, in
//! batches of `batch_size`, never concurrently, to keep the request rate
//! against a static file server low.
//!
//! # Stopping rule
//!
//! - A batch with at least one hit: continue.
//! - A batch without hits while nothing has been found yet: continue
//!   (numbering may start after a gap).
//! - A batch without hits after something was found: stop.
//! - Never probe past `max_index`; the last batch is cut short there.
//!
//! A probe that fails at the transport level counts as "absent". This
//! cannot tell a flaky network from a missing file.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use crate::config::{Config, GenerateConfig, SourceConfig};
use crate::error::GenerateError;
use crate::models::Manifest;
use crate::progress::{ProgressEvent, ProgressReporter};
use crate::source::{self, join_base, Fetcher};

/// Default output file name for a generated manifest.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

pub fn candidate_name(gen: &GenerateConfig, n: u32) -> String {
    format!("{}{}{}", gen.prefix, n, gen.suffix)
}

/// `HEAD`, then a plain `GET` if `HEAD` did not say yes.
///
/// A transport error on `HEAD` is final: the candidate is absent.
pub async fn url_exists(fetcher: &dyn Fetcher, location: &str) -> bool {
    match fetcher.head_ok(location).await {
        Ok(true) => true,
        Ok(false) => match fetcher.get_ok(location).await {
            Ok(found) => found,
            Err(e) => {
                tracing::debug!(%location, error = %e, "GET probe failed");
                false
            }
        },
        Err(e) => {
            tracing::debug!(%location, error = %e, "HEAD probe failed");
            false
        }
    }
}

/// Probe candidates and return the names found, sorted numerically.
pub async fn scan(
    fetcher: &dyn Fetcher,
    source: &SourceConfig,
    gen: &GenerateConfig,
    progress: &dyn ProgressReporter,
) -> Result<Manifest, GenerateError> {
    let mut found: Manifest = Vec::new();
    let mut lower: u32 = 1;

    while lower <= gen.max_index {
        let upper = lower.saturating_add(gen.batch_size.max(1) - 1).min(gen.max_index);
        let mut hits = 0u32;

        for n in lower..=upper {
            let name = candidate_name(gen, n);
            let relative = join_base(&source.base_dir, &name);
            let location = match fetcher.resolve(&relative) {
                Ok(l) => l,
                Err(e) => {
                    tracing::debug!(%relative, error = %e, "unresolvable candidate");
                    continue;
                }
            };
            if url_exists(fetcher, &location).await {
                found.push(name);
                hits += 1;
            }
        }

        progress.report(ProgressEvent::Scanned {
            from: lower,
            to: upper,
            hits,
            found: found.len() as u64,
        });

        if hits == 0 && !found.is_empty() {
            break;
        }
        if upper == gen.max_index {
            break;
        }
        lower = upper + 1;
    }

    if found.is_empty() {
        return Err(GenerateError::NoCandidatesFound {
            pattern: format!("{}N{}", gen.prefix, gen.suffix),
            max_index: gen.max_index,
        });
    }

    sort_numerically(&mut found);
    Ok(found)
}

/// First run of ASCII digits in `name`, or 0.
fn embedded_number(name: &str) -> u64 {
    let digits: String = name
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Sort by the embedded integer, so `_chat 2.txt` precedes `_chat 10.txt`.
pub fn sort_numerically(names: &mut [String]) {
    names.sort_by_key(|n| embedded_number(n));
}

/// Pretty-printed JSON array, two-space indented.
pub fn manifest_json(names: &[String]) -> Result<String, GenerateError> {
    Ok(serde_json::to_string_pretty(names)?)
}

/// Write the manifest to `output`, or to stdout when `output` is `-`.
pub fn write_manifest(names: &[String], output: &Path) -> Result<(), GenerateError> {
    let mut json = manifest_json(names)?;
    json.push('\n');
    if output == Path::new("-") {
        let mut out = std::io::stdout().lock();
        out.write_all(json.as_bytes())?;
        out.flush()?;
    } else {
        std::fs::write(output, json)?;
    }
    Ok(())
}

/// `tsearch generate`: scan the configured source and write `manifest.json`.
pub async fn run_generate(
    config: &Config,
    output: &Path,
    progress: &dyn ProgressReporter,
) -> Result<()> {
    let fetcher = source::from_config(&config.source)?;

    let names = scan(fetcher.as_ref(), &config.source, &config.generate, progress)
        .await
        .context("Manifest generation failed")?;

    write_manifest(&names, output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    tracing::info!(files = names.len(), output = %output.display(), "manifest written");
    eprintln!(
        "Manifest generated with {} files. Place it next to the entry point.",
        names.len()
    );
    Ok(())
}
