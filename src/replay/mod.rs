//! Landmark stream replay.
//!
//! Reads one s-expression message per line, drives a [`ReplayEngine`] and
//! writes every engine event and response as one line of output.  Blank
//! lines and `;` comments are skipped.  Malformed lines produce an error
//! response and the replay continues.

pub mod dispatch;

use std::io::{BufRead, Write};

use anyhow::Context;
use tracing::{info, warn};

pub use dispatch::{handle_message, Outcome, ReplayEngine};

/// Counters for a finished replay.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Messages handled (blank and comment lines excluded).
    pub messages: usize,
    /// Engine events written.
    pub events: usize,
    /// Messages rejected with an error response.
    pub errors: usize,
}

/// Replay `input` through `engine`, writing output lines to `out`.
pub fn run<R: BufRead, W: Write>(
    engine: &mut ReplayEngine,
    input: R,
    out: &mut W,
) -> anyhow::Result<ReplaySummary> {
    let mut summary = ReplaySummary::default();

    for (index, line) in input.lines().enumerate() {
        let line = line.with_context(|| format!("reading replay line {}", index + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(';') {
            continue;
        }

        summary.messages += 1;
        let outcome = handle_message(engine, trimmed);
        if outcome.failed {
            summary.errors += 1;
            warn!(line = index + 1, "replay line rejected");
        }
        summary.events += outcome.events.len();

        for text in outcome.lines() {
            writeln!(out, "{}", text).context("writing replay output")?;
        }
    }

    out.flush().context("flushing replay output")?;
    info!(
        messages = summary.messages,
        events = summary.events,
        errors = summary.errors,
        "Replay finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::GestureEngine;

    #[test]
    fn test_run_skips_blank_and_comments() {
        let input = "; recorded session\n\n(:type gesture-status :id 1)\n   \n";
        let mut engine = GestureEngine::new(Vec::new());
        let mut out = Vec::new();
        let summary = run(&mut engine, input.as_bytes(), &mut out).unwrap();
        assert_eq!(summary.messages, 1);
        assert_eq!(summary.errors, 0);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("(:type :response :id 1 :status :ok"));
    }

    #[test]
    fn test_run_continues_after_errors() {
        let input = "(:type bogus)\n(oops\n(:type dispose)\n";
        let mut engine = GestureEngine::new(Vec::new());
        let mut out = Vec::new();
        let summary = run(&mut engine, input.as_bytes(), &mut out).unwrap();
        assert_eq!(
            summary,
            ReplaySummary {
                messages: 3,
                events: 0,
                errors: 2
            }
        );
        assert!(engine.is_disposed());
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches(":status :error").count(), 2);
    }

    #[test]
    fn test_run_counts_events() {
        let input = "(:type gesture-config :debounce-ms 0)\n(:type no-hand :t 0)\n(:type tick :t 100)\n";
        let mut engine = GestureEngine::new(Vec::new());
        let mut out = Vec::new();
        let summary = run(&mut engine, input.as_bytes(), &mut out).unwrap();
        assert_eq!(summary.messages, 3);
        assert_eq!(summary.events, 0);
        assert_eq!(engine.config().debounce_ms, 0.0);
    }
}
