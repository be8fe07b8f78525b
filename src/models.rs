//! Core data types shared by the loader, the store and the search engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Language guessed for a transcript.
///
/// Declaration order is the tie-break priority used by
/// [`guess_language`](crate::classify::guess_language).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Pt,
    Es,
    En,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Pt, Language::Es, Language::En];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Pt => "pt",
            Language::Es => "es",
            Language::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pt" => Ok(Language::Pt),
            "es" => Ok(Language::Es),
            "en" => Ok(Language::En),
            other => Err(format!("unknown language '{}': expected pt, es or en", other)),
        }
    }
}

/// Category labels assigned to a document.
pub type CategorySet = BTreeSet<String>;

/// One loaded transcript file.
///
/// Built once by the loader and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    /// File name as listed in the manifest, unique within a load.
    pub file: String,
    /// Location the text was fetched from.
    pub url: String,
    pub text: String,
    pub lang: Language,
    pub cats: CategorySet,
}

/// A manifest: ordered transcript file names, serialized as a JSON array.
pub type Manifest = Vec<String>;
