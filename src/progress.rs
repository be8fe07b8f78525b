//! Load and scan progress reporting.
//!
//! Progress goes to **stderr** so stdout stays parseable for scripts
//! (search results, `generate --output -`).

use std::io::Write;

/// A single progress event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgressEvent {
    /// `n` of `total` transcript files fetched.
    Loading { n: u64, total: u64 },
    /// A probe batch `[from, to]` finished with `hits` hits; `found` so far.
    Scanned {
        from: u32,
        to: u32,
        hits: u32,
        found: u64,
    },
}

/// Receives progress events from the loader and the manifest generator.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Human-friendly progress on stderr: "scan  1,201 - 1,800  12 hits  (1,214 found)".
pub struct StderrProgress;

impl ProgressReporter for StderrProgress {
    fn report(&self, event: ProgressEvent) {
        let line = match &event {
            ProgressEvent::Loading { n, total } => {
                format!("load  {} / {} files\n", format_number(*n), format_number(*total))
            }
            ProgressEvent::Scanned {
                from,
                to,
                hits,
                found,
            } => format!(
                "scan  {} - {}  {} hits  ({} found)\n",
                format_number(*from as u64),
                format_number(*to as u64),
                format_number(*hits as u64),
                format_number(*found)
            ),
        };
        let mut err = std::io::stderr().lock();
        let _ = err.write_all(line.as_bytes());
        let _ = err.flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ProgressReporter for JsonProgress {
    fn report(&self, event: ProgressEvent) {
        let obj = match &event {
            ProgressEvent::Loading { n, total } => serde_json::json!({
                "event": "progress",
                "phase": "loading",
                "n": n,
                "total": total
            }),
            ProgressEvent::Scanned {
                from,
                to,
                hits,
                found,
            } => serde_json::json!({
                "event": "progress",
                "phase": "scanning",
                "from": from,
                "to": to,
                "hits": hits,
                "found": found
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let mut err = std::io::stderr().lock();
            let _ = writeln!(err, "{}", line);
            let _ = err.flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: ProgressEvent) {}
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    /// Human output when stderr is a TTY, otherwise off.
    Auto,
    Off,
    Human,
    Json,
}

impl ProgressMode {
    pub fn resolve(self) -> Self {
        match self {
            ProgressMode::Auto => {
                if atty::is(atty::Stream::Stderr) {
                    ProgressMode::Human
                } else {
                    ProgressMode::Off
                }
            }
            other => other,
        }
    }

    pub fn reporter(&self) -> Box<dyn ProgressReporter> {
        match self.resolve() {
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
            ProgressMode::Off | ProgressMode::Auto => Box::new(NoProgress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_number_comma() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn explicit_modes_resolve_to_themselves() {
        assert_eq!(ProgressMode::Json.resolve(), ProgressMode::Json);
        assert_eq!(ProgressMode::Off.resolve(), ProgressMode::Off);
        assert_ne!(ProgressMode::Auto.resolve(), ProgressMode::Auto);
    }
}
