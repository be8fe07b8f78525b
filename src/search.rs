//! Literal substring search with highlighted snippets.
//!
//! # Algorithm
//!
//! 1. Keep documents passing the language and category filters.
//! 2. Empty query: every eligible document is listed without snippets.
//! 3. Otherwise scan each document left to right for non-overlapping,
//!    case-insensitive occurrences of the query, stopping at
//!    `max_per_file`. Documents without an occurrence are dropped.
//! 4. Each occurrence becomes a snippet: `before` characters of context,
//!    the match, `after` characters, clamped to the text. Every occurrence
//!    inside the window is wrapped in highlight markers, and `…` marks a
//!    side that was cut.
//!
//! The query is never interpreted as a pattern, so `.`, `*` or `(` match
//! themselves. Offsets and window sizes count characters, not bytes.
//! Results keep store order; there is no ranking.

use anyhow::Result;
use serde::Serialize;

use crate::config::{Config, SearchConfig};
use crate::loader;
use crate::models::{Document, Language};
use crate::progress::ProgressReporter;
use crate::store::DocumentStore;

pub const ELLIPSIS: char = '…';

/// How matches are emphasized inside a snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Highlight {
    /// `<mark>…</mark>`
    #[default]
    Html,
    /// Bold yellow terminal escape codes.
    Ansi,
    /// `[[…]]`
    Brackets,
}

impl Highlight {
    pub fn open(&self) -> &'static str {
        match self {
            Highlight::Html => "<mark>",
            Highlight::Ansi => "\x1b[1;33m",
            Highlight::Brackets => "[[",
        }
    }

    pub fn close(&self) -> &'static str {
        match self {
            Highlight::Html => "</mark>",
            Highlight::Ansi => "\x1b[0m",
            Highlight::Brackets => "]]",
        }
    }
}

/// Snippet shaping parameters.
#[derive(Debug, Clone)]
pub struct SnippetParams {
    pub max_per_file: usize,
    pub before: usize,
    pub after: usize,
    pub highlight: Highlight,
}

impl Default for SnippetParams {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for SnippetParams {
    fn from(cfg: &SearchConfig) -> Self {
        Self {
            max_per_file: cfg.max_snippets_per_file,
            before: cfg.chars_before,
            after: cfg.chars_after,
            highlight: Highlight::default(),
        }
    }
}

/// One search invocation: free text plus optional filters.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
    pub lang: Option<Language>,
    pub category: Option<&'a str>,
}

/// A matching document and its snippets (empty in listing mode).
#[derive(Debug, Clone)]
pub struct SearchHit<'a> {
    pub doc: &'a Document,
    pub snippets: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SearchOutcome<'a> {
    pub hits: Vec<SearchHit<'a>>,
    /// Whether the query was empty and documents were only listed.
    pub listing: bool,
}

impl<'a> SearchOutcome<'a> {
    /// Snippet count in query mode, document count in listing mode.
    pub fn total(&self) -> usize {
        if self.listing {
            self.hits.len()
        } else {
            self.hits.iter().map(|h| h.snippets.len()).sum()
        }
    }

    /// Status line shown above the results.
    pub fn summary(&self) -> String {
        if self.hits.is_empty() {
            "No results.".to_string()
        } else if self.listing {
            format!("{} file(s) listed", self.hits.len())
        } else {
            format!(
                "{} occurrence(s) in {} file(s)",
                self.total(),
                self.hits.len()
            )
        }
    }

    /// Plain-text result cards.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for hit in &self.hits {
            let chips = if hit.doc.cats.is_empty() {
                "[uncategorized]".to_string()
            } else {
                hit.doc
                    .cats
                    .iter()
                    .map(|c| format!("[{}]", c))
                    .collect::<Vec<_>>()
                    .join(" ")
            };
            out.push_str(&format!(
                "{} • {}\n",
                hit.doc.file,
                hit.doc.lang.as_str().to_uppercase()
            ));
            out.push_str(&format!("    {}\n", chips));
            out.push_str(&format!("    url: {}\n", hit.doc.url));
            for snippet in &hit.snippets {
                out.push_str(&format!("    > {}\n", snippet.replace('\n', " ")));
            }
            out.push('\n');
        }
        out.push_str(&self.summary());
        out.push('\n');
        out
    }

    pub fn to_json(&self) -> serde_json::Value {
        #[derive(Serialize)]
        struct HitView<'b> {
            file: &'b str,
            url: &'b str,
            lang: Language,
            cats: Vec<&'b str>,
            snippets: &'b [String],
        }

        let hits: Vec<HitView> = self
            .hits
            .iter()
            .map(|h| HitView {
                file: &h.doc.file,
                url: &h.doc.url,
                lang: h.doc.lang,
                cats: h.doc.cats.iter().map(String::as_str).collect(),
                snippets: &h.snippets,
            })
            .collect();

        serde_json::json!({
            "summary": self.summary(),
            "total": self.total(),
            "results": hits,
        })
    }
}

/// Filter and scan the store. An unloaded store yields nothing.
pub fn search<'a>(
    store: &'a DocumentStore,
    req: &SearchRequest<'_>,
    params: &SnippetParams,
) -> SearchOutcome<'a> {
    if !store.is_loaded() {
        return SearchOutcome::default();
    }

    let needle: Vec<char> = req.query.trim().chars().map(fold).collect();
    let listing = needle.is_empty();
    let mut hits = Vec::new();

    for doc in store.iter() {
        if let Some(lang) = req.lang {
            if doc.lang != lang {
                continue;
            }
        }
        if let Some(cat) = req.category {
            if !doc.cats.contains(cat) {
                continue;
            }
        }

        if listing {
            hits.push(SearchHit {
                doc,
                snippets: Vec::new(),
            });
            continue;
        }

        let chars: Vec<char> = doc.text.chars().collect();
        let folded: Vec<char> = chars.iter().map(|&c| fold(c)).collect();
        let snippets: Vec<String> = find_matches(&folded, &needle, params.max_per_file)
            .into_iter()
            .map(|idx| make_snippet(&chars, &folded, idx, &needle, params))
            .collect();

        if !snippets.is_empty() {
            hits.push(SearchHit { doc, snippets });
        }
    }

    SearchOutcome { hits, listing }
}

/// Single-character case folding. Characters whose lowercase form expands
/// to several characters keep only the first, so offsets stay aligned.
fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Start offsets of up to `limit` non-overlapping occurrences of `needle`.
fn find_matches(haystack: &[char], needle: &[char], limit: usize) -> Vec<usize> {
    let mut found = Vec::new();
    if needle.is_empty() || needle.len() > haystack.len() {
        return found;
    }
    let mut i = 0;
    while i + needle.len() <= haystack.len() && found.len() < limit {
        if haystack[i..i + needle.len()] == *needle {
            found.push(i);
            i += needle.len();
        } else {
            i += 1;
        }
    }
    found
}

fn make_snippet(
    chars: &[char],
    folded: &[char],
    idx: usize,
    needle: &[char],
    params: &SnippetParams,
) -> String {
    let start = idx.saturating_sub(params.before);
    let end = (idx + needle.len() + params.after).min(chars.len());

    let mut out = String::new();
    if start > 0 {
        out.push(ELLIPSIS);
    }

    let window = &folded[start..end];
    let mut i = 0;
    while i < window.len() {
        if i + needle.len() <= window.len() && window[i..i + needle.len()] == *needle {
            out.push_str(params.highlight.open());
            out.extend(&chars[start + i..start + i + needle.len()]);
            out.push_str(params.highlight.close());
            i += needle.len();
        } else {
            out.push(chars[start + i]);
            i += 1;
        }
    }

    if end < chars.len() {
        out.push(ELLIPSIS);
    }
    out
}

/// `tsearch search`: load the configured corpus and print matches.
pub async fn run_search(
    config: &Config,
    req: &SearchRequest<'_>,
    highlight: Highlight,
    json: bool,
    progress: &dyn ProgressReporter,
) -> Result<()> {
    let store = loader::load_configured(config, progress).await?;

    let params = SnippetParams {
        highlight,
        ..SnippetParams::from(&config.search)
    };
    let outcome = search(&store, req, &params);

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.to_json())?);
    } else {
        print!("{}", outcome.render());
    }
    Ok(())
}
