//! Selector-driven message readers.
//!
//! A [`MessageReader`] classifies its selector once, at construction. Empty
//! selectors read the queue head, simple id equalities become direct
//! lookups, and everything else scans the queue through a cursor,
//! evaluating the compiled selector against each candidate's headers.

mod classify;
mod config;
mod convert;
mod queue;
mod scan;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::eval::{EvalError, MessageEvaluationContext};
use crate::message::Message;
use crate::selector::SelectorError;

pub use classify::{classify, SelectorClassification};
pub use config::ReaderConfig;
pub use convert::{ConversionError, MessageConverter};
pub use queue::{MessageQueue, PeekAction};

use scan::{Scan, ScanMode};

/// Error returned by reader operations.
#[derive(Debug, thiserror::Error)]
pub enum ReadError<E>
where
    E: std::error::Error + 'static,
{
    /// The queue failed; passed through unchanged.
    #[error("queue error: {0}")]
    Queue(#[source] E),
    #[error(transparent)]
    Evaluation(#[from] EvalError),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

/// Counters describing the work done by scanning reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Messages peeked through the cursor.
    pub candidates: u64,
    /// Selector evaluations.
    pub evaluations: u64,
    /// Candidates the selector accepted.
    pub matches: u64,
    /// Matched candidates removed by someone else before we could.
    pub races_lost: u64,
    /// Scans that ended at the deadline without a match.
    pub timeouts: u64,
}

#[derive(Debug, Default)]
struct ScanCounters {
    candidates: AtomicU64,
    evaluations: AtomicU64,
    matches: AtomicU64,
    races_lost: AtomicU64,
    timeouts: AtomicU64,
}

impl ScanCounters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> ScanStats {
        ScanStats {
            candidates: self.candidates.load(Ordering::Relaxed),
            evaluations: self.evaluations.load(Ordering::Relaxed),
            matches: self.matches.load(Ordering::Relaxed),
            races_lost: self.races_lost.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
        }
    }
}

/// Reads messages matching a selector from a queue.
pub struct MessageReader<Q, C> {
    queue: Q,
    converter: C,
    classification: SelectorClassification,
    config: ReaderConfig,
    counters: ScanCounters,
}

impl<Q, C> MessageReader<Q, C>
where
    Q: MessageQueue,
    C: MessageConverter<Q::Raw>,
{
    /// Create a reader with the default configuration.
    ///
    /// An empty selector reads every message. A malformed selector fails
    /// here with [`SelectorError::InvalidSelector`].
    pub fn new(queue: Q, converter: C, selector: &str) -> Result<Self, SelectorError> {
        Self::with_config(queue, converter, selector, ReaderConfig::default())
    }

    pub fn with_config(
        queue: Q,
        converter: C,
        selector: &str,
        config: ReaderConfig,
    ) -> Result<Self, SelectorError> {
        let classification = classify(selector, &config)?;
        Ok(Self {
            queue,
            converter,
            classification,
            config,
            counters: ScanCounters::default(),
        })
    }

    pub fn classification(&self) -> &SelectorClassification {
        &self.classification
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    /// Work done by scanning reads so far. Fast-path and non-filtering
    /// readers leave every counter at zero.
    pub fn stats(&self) -> ScanStats {
        self.counters.snapshot()
    }

    /// Return the first matching message without removing it, waiting up
    /// to `timeout` for one to arrive.
    pub fn peek(&self, timeout: Option<Duration>) -> Result<Option<Message>, ReadError<Q::Error>> {
        let raw = match &self.classification {
            SelectorClassification::All => self.queue.peek(timeout),
            SelectorClassification::ByMessageId(id) => self.queue.peek_by_id(id, timeout),
            SelectorClassification::ByCorrelationId(id) => {
                self.queue.peek_by_correlation_id(id, timeout)
            }
            SelectorClassification::ByLookupId(id) => self.queue.peek_by_lookup_id(*id),
            SelectorClassification::Generic(selector) => {
                return Scan::new(self, selector, timeout).run(ScanMode::Peek);
            }
        };
        self.convert(raw)
    }

    /// Remove and return the first matching message, waiting up to
    /// `timeout` for one to arrive.
    pub fn receive(
        &self,
        timeout: Option<Duration>,
        transaction: Option<&Q::Transaction>,
    ) -> Result<Option<Message>, ReadError<Q::Error>> {
        let raw = match &self.classification {
            SelectorClassification::All => self.queue.receive(timeout, transaction),
            SelectorClassification::ByMessageId(id) => {
                self.queue.receive_by_id(id, timeout, transaction)
            }
            SelectorClassification::ByCorrelationId(id) => {
                self.queue
                    .receive_by_correlation_id(id, timeout, transaction)
            }
            SelectorClassification::ByLookupId(id) => {
                self.queue.receive_by_lookup_id(*id, transaction)
            }
            SelectorClassification::Generic(selector) => {
                return Scan::new(self, selector, timeout).run(ScanMode::Receive(transaction));
            }
        };
        self.convert(raw)
    }

    /// Check a native message against this reader's selector.
    pub fn matches(&self, raw: &Q::Raw) -> Result<bool, ReadError<Q::Error>> {
        if matches!(self.classification, SelectorClassification::All) {
            return Ok(true);
        }

        let message = self.converter.convert_headers(raw)?;
        Ok(match &self.classification {
            SelectorClassification::All => true,
            SelectorClassification::ByMessageId(id) => message.message_id == *id,
            SelectorClassification::ByCorrelationId(id) => {
                message.correlation_id.as_deref() == Some(id.as_str())
            }
            SelectorClassification::ByLookupId(id) => message.lookup_id == Some(*id),
            SelectorClassification::Generic(selector) => {
                selector.matches(&MessageEvaluationContext::new(&message))?
            }
        })
    }

    /// Snapshot of every currently visible matching message, in queue
    /// order. Nothing is removed and nothing waits.
    pub fn browse(&self) -> Result<Vec<Message>, ReadError<Q::Error>> {
        let mut cursor = self.queue.create_cursor();
        let mut action = PeekAction::Current;
        let mut found = Vec::new();

        while let Some(raw) = self
            .queue
            .peek_at(&mut cursor, action, Some(Duration::ZERO))
            .map_err(ReadError::Queue)?
        {
            if self.matches(&raw)? {
                found.push(self.converter.convert(&raw)?);
            }
            action = PeekAction::Next;
        }

        Ok(found)
    }

    fn convert(
        &self,
        raw: Result<Option<Q::Raw>, Q::Error>,
    ) -> Result<Option<Message>, ReadError<Q::Error>> {
        match raw.map_err(ReadError::Queue)? {
            Some(raw) => Ok(Some(self.converter.convert(&raw)?)),
            None => Ok(None),
        }
    }
}
