//! Interactive search session (`tsearch shell`).
//!
//! Each input line edits the session state and schedules a debounced
//! search, so a burst of pasted lines renders once, for the final state.
//!
//! | Input | Effect |
//! |-------|--------|
//! | `text` | set the query (blank line clears it) |
//! | `:lang pt` / `:lang any` | set or clear the language filter |
//! | `:cat suporte/ajuda` / `:cat any` | set or clear the category filter |
//! | `:quit` | leave |

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::classify::KeywordTables;
use crate::config::Config;
use crate::debounce::Debouncer;
use crate::loader;
use crate::models::Language;
use crate::progress::ProgressReporter;
use crate::search::{search, Highlight, SearchRequest, SnippetParams};
use crate::store::DocumentStore;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellState {
    pub query: String,
    pub lang: Option<Language>,
    pub category: Option<String>,
}

impl ShellState {
    pub fn request(&self) -> SearchRequest<'_> {
        SearchRequest {
            query: &self.query,
            lang: self.lang,
            category: self.category.as_deref(),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ShellCommand {
    Query(String),
    Lang(Option<Language>),
    Category(Option<String>),
    Quit,
}

/// Parse one input line. Unknown `:` directives are errors.
pub fn parse_line(line: &str, tables: &KeywordTables) -> std::result::Result<ShellCommand, String> {
    let trimmed = line.trim();
    let Some(directive) = trimmed.strip_prefix(':') else {
        return Ok(ShellCommand::Query(trimmed.to_string()));
    };

    let (name, arg) = match directive.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (directive, ""),
    };

    match name {
        "q" | "quit" | "exit" => Ok(ShellCommand::Quit),
        "lang" => match arg {
            "" | "any" => Ok(ShellCommand::Lang(None)),
            other => other.parse().map(|l| ShellCommand::Lang(Some(l))),
        },
        "cat" => match arg {
            "" | "any" => Ok(ShellCommand::Category(None)),
            label if tables.has_category(label) => {
                Ok(ShellCommand::Category(Some(label.to_string())))
            }
            label => Err(format!(
                "unknown category '{}'; known: {}",
                label,
                tables.category_labels().collect::<Vec<_>>().join(", ")
            )),
        },
        other => Err(format!("unknown command ':{}'", other)),
    }
}

impl ShellState {
    /// Apply a command. Returns `false` for [`ShellCommand::Quit`].
    pub fn apply(&mut self, cmd: ShellCommand) -> bool {
        match cmd {
            ShellCommand::Query(q) => self.query = q,
            ShellCommand::Lang(l) => self.lang = l,
            ShellCommand::Category(c) => self.category = c,
            ShellCommand::Quit => return false,
        }
        true
    }
}

fn render(store: &DocumentStore, state: &ShellState, params: &SnippetParams) {
    let outcome = search(store, &state.request(), params);
    print!("{}", outcome.render());
}

pub async fn run_shell(config: &Config, progress: &dyn ProgressReporter) -> Result<()> {
    let tables = config.keyword_tables()?;
    let store = Arc::new(loader::load_configured(config, progress).await?);

    let highlight = if atty::is(atty::Stream::Stdout) {
        Highlight::Ansi
    } else {
        Highlight::Brackets
    };
    let params = Arc::new(SnippetParams {
        highlight,
        ..SnippetParams::from(&config.search)
    });

    let mut state = ShellState::default();
    render(&store, &state, &params);

    let debouncer = Debouncer::new(Duration::from_millis(config.search.debounce_ms));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let cmd = match parse_line(&line, &tables) {
            Ok(cmd) => cmd,
            Err(msg) => {
                eprintln!("{}", msg);
                continue;
            }
        };
        if !state.apply(cmd) {
            debouncer.cancel();
            return Ok(());
        }

        let store = store.clone();
        let params = params.clone();
        let snapshot = state.clone();
        debouncer.trigger(move || render(&store, &snapshot, &params));
    }

    debouncer.flush().await;
    Ok(())
}
