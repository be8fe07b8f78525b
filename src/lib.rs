//! # Transcript Search
//!
//! Load a set of exported chat transcripts, tag each one with a guessed
//! language and topic categories, and search across them with highlighted
//! snippets. A companion generator discovers numbered transcript files on a
//! static server and writes the manifest the loader reads.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌──────────────┐   ┌──────────┐
//! │ manifest │──▶│  Loader  │──▶│ DocumentStore│──▶│  Search  │
//! │  + txt/  │   │ classify │   │ (sealed)     │   │ snippets │
//! └──────────┘   └──────────┘   └──────────────┘   └──────────┘
//!      ▲
//!      │ writes manifest.json
//! ┌────┴──────┐
//! │ Generator │  probes `_chat N.txt` in batches
//! └───────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! tsearch generate                   # probe the server, write manifest.json
//! tsearch search pix --lang pt       # search the corpus
//! tsearch shell                      # interactive, debounced search
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`classify`] | Language and category heuristics |
//! | [`store`] | Append-only document store |
//! | [`source`] | HTTP and directory fetchers |
//! | [`loader`] | Manifest-driven corpus loading |
//! | [`search`] | Literal search and snippet extraction |
//! | [`generate`] | Manifest generator |
//! | [`debounce`] | Cancelling single-slot scheduler |
//! | [`shell`] | Interactive session |
//! | [`progress`] | stderr progress reporting |
//! | [`error`] | Load and generate error types |

pub mod classify;
pub mod config;
pub mod debounce;
pub mod error;
pub mod generate;
pub mod loader;
pub mod models;
pub mod progress;
pub mod search;
pub mod shell;
pub mod source;
pub mod store;
