//! Selector classification.
//!
//! Three single-clause equality shapes can be answered by a direct queue
//! lookup instead of a scan:
//!
//! - `[JMS|NMS]MessageId = '<id>'`
//! - `[JMS|NMS]CorrelationId = '<id>'`
//! - `LookupId = <integer>`
//!
//! Matching is case-insensitive and tolerates surrounding whitespace.
//! The id names resolve to the same headers when a selector is evaluated,
//! so turning fast paths off never changes the answer. Anything else is compiled into a [`Selector`] and scanned.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::ReaderConfig;
use crate::selector::{Selector, SelectorError};

static FAST_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:(?:NMS|JMS)?MessageId\s*=\s*'([^']*)'|(?:NMS|JMS)?CorrelationId\s*=\s*'([^']*)'|LookupId\s*=\s*([-+]?\d+))\s*$",
    )
    .unwrap()
});

/// How a reader answers a selector.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorClassification {
    /// Empty selector: every message matches.
    All,
    ByMessageId(String),
    ByCorrelationId(String),
    ByLookupId(i64),
    /// Scan the queue, evaluating the compiled selector per candidate.
    Generic(Selector),
}

impl SelectorClassification {
    /// Whether this classification is answered without scanning.
    pub fn is_fast_path(&self) -> bool {
        matches!(
            self,
            SelectorClassification::ByMessageId(_)
                | SelectorClassification::ByCorrelationId(_)
                | SelectorClassification::ByLookupId(_)
        )
    }

    fn kind(&self) -> &'static str {
        match self {
            SelectorClassification::All => "all",
            SelectorClassification::ByMessageId(_) => "message-id",
            SelectorClassification::ByCorrelationId(_) => "correlation-id",
            SelectorClassification::ByLookupId(_) => "lookup-id",
            SelectorClassification::Generic(_) => "generic",
        }
    }
}

impl fmt::Display for SelectorClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

/// Classify a selector. Invalid selectors fail here, before any reader
/// exists.
pub fn classify(
    selector: &str,
    config: &ReaderConfig,
) -> Result<SelectorClassification, SelectorError> {
    let classification = if selector.trim().is_empty() {
        SelectorClassification::All
    } else if let Some(fast) = config.fast_paths.then(|| fast_path(selector)).flatten() {
        fast
    } else {
        SelectorClassification::Generic(Selector::parse(selector)?)
    };

    debug!(selector, kind = classification.kind(), "classified selector");
    Ok(classification)
}

fn fast_path(selector: &str) -> Option<SelectorClassification> {
    let caps = FAST_PATH.captures(selector)?;
    if let Some(id) = caps.get(1) {
        return Some(SelectorClassification::ByMessageId(id.as_str().to_string()));
    }
    if let Some(id) = caps.get(2) {
        return Some(SelectorClassification::ByCorrelationId(
            id.as_str().to_string(),
        ));
    }
    // Out-of-range lookup ids fall back to a scan.
    let lookup_id = caps.get(3)?.as_str().parse().ok()?;
    Some(SelectorClassification::ByLookupId(lookup_id))
}
