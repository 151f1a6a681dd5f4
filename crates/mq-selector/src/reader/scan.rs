//! Cursor scan for selectors that need evaluation.
//!
//! ```text
//! Peeking ──▶ Evaluating ──no match──▶ Peeking(Next)
//!    │             │
//!    │           match ──peek──▶ Done
//!    │             │
//!    │           receive ──▶ Removing ──removed──▶ Done
//!    │                          │
//!    │                       race lost ──▶ Peeking(Current)
//!    ▼
//! TimedOut
//! ```
//!
//! The deadline is fixed when the scan starts. Every peek waits only for
//! what is left of it, so a receive that loses races or skips non-matching
//! candidates never waits longer in total than the caller asked.

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use super::{
    ConversionError, MessageConverter, MessageQueue, MessageReader, PeekAction, ReadError,
    ScanCounters,
};
use crate::eval::MessageEvaluationContext;
use crate::message::Message;
use crate::selector::Selector;

/// Absolute point in time after which a scan stops waiting.
#[derive(Debug, Clone, Copy)]
pub(super) struct Deadline(Option<Instant>);

impl Deadline {
    /// `None` never expires. Timeouts too large to represent never expire
    /// either.
    pub(super) fn after(timeout: Option<Duration>) -> Self {
        Deadline(timeout.and_then(|t| Instant::now().checked_add(t)))
    }

    /// Time left, saturating at zero. `None` means unbounded.
    pub(super) fn remaining(&self) -> Option<Duration> {
        self.0
            .map(|at| at.saturating_duration_since(Instant::now()))
    }
}

pub(super) enum ScanMode<'t, T> {
    Peek,
    Receive(Option<&'t T>),
}

impl<T> Clone for ScanMode<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ScanMode<'_, T> {}

enum ScanState<R> {
    Peeking(PeekAction),
    Evaluating(R),
    Removing(Message),
    Done(Message),
    TimedOut,
}

pub(super) struct Scan<'r, Q, C> {
    reader: &'r MessageReader<Q, C>,
    selector: &'r Selector,
    deadline: Deadline,
}

impl<'r, Q, C> Scan<'r, Q, C>
where
    Q: MessageQueue,
    C: MessageConverter<Q::Raw>,
{
    pub(super) fn new(
        reader: &'r MessageReader<Q, C>,
        selector: &'r Selector,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            reader,
            selector,
            deadline: Deadline::after(timeout),
        }
    }

    pub(super) fn run(
        self,
        mode: ScanMode<'_, Q::Transaction>,
    ) -> Result<Option<Message>, ReadError<Q::Error>> {
        let queue = &self.reader.queue;
        let counters = &self.reader.counters;
        let max_races = self.reader.config.max_race_retries;

        let mut cursor = queue.create_cursor();
        let mut races = 0u32;
        let mut state = ScanState::Peeking(PeekAction::Current);

        loop {
            state = match state {
                ScanState::Peeking(action) => {
                    match queue
                        .peek_at(&mut cursor, action, self.deadline.remaining())
                        .map_err(ReadError::Queue)?
                    {
                        Some(raw) => ScanState::Evaluating(raw),
                        None => ScanState::TimedOut,
                    }
                }

                ScanState::Evaluating(raw) => {
                    ScanCounters::bump(&counters.candidates);
                    match self.evaluate(&raw)? {
                        None => ScanState::Peeking(PeekAction::Next),
                        Some(mut message) => match mode {
                            ScanMode::Peek => {
                                if self.reader.config.defer_body_conversion {
                                    self.reader.converter.convert_body(&raw, &mut message)?;
                                }
                                ScanState::Done(message)
                            }
                            ScanMode::Receive(_) => ScanState::Removing(message),
                        },
                    }
                }

                ScanState::Removing(message) => {
                    let lookup_id =
                        message
                            .lookup_id
                            .ok_or_else(|| ConversionError::MissingLookupId {
                                message_id: message.message_id.clone(),
                            })?;
                    let transaction = match mode {
                        ScanMode::Receive(transaction) => transaction,
                        ScanMode::Peek => None,
                    };

                    match queue
                        .receive_by_lookup_id(lookup_id, transaction)
                        .map_err(ReadError::Queue)?
                    {
                        Some(raw) => ScanState::Done(self.reader.converter.convert(&raw)?),
                        None => {
                            ScanCounters::bump(&counters.races_lost);
                            races = races.saturating_add(1);
                            debug!(lookup_id, races, "matched message taken by another consumer");
                            if max_races.is_some_and(|max| races > max) {
                                debug!(races, "giving up after lost races");
                                return Ok(None);
                            }
                            ScanState::Peeking(PeekAction::Current)
                        }
                    }
                }

                ScanState::Done(message) => return Ok(Some(message)),

                ScanState::TimedOut => {
                    ScanCounters::bump(&counters.timeouts);
                    debug!(selector = %self.selector, "scan deadline reached without a match");
                    return Ok(None);
                }
            };
        }
    }

    /// Evaluate one candidate. Returns the converted message when it
    /// matches; its body is only present if conversion is not deferred.
    fn evaluate(&self, raw: &Q::Raw) -> Result<Option<Message>, ReadError<Q::Error>> {
        let converter = &self.reader.converter;
        let counters = &self.reader.counters;

        let message = if self.reader.config.defer_body_conversion {
            converter.convert_headers(raw)?
        } else {
            converter.convert(raw)?
        };

        ScanCounters::bump(&counters.evaluations);
        let matched = self
            .selector
            .matches(&MessageEvaluationContext::new(&message))?;
        trace!(
            message_id = %message.message_id,
            lookup_id = ?message.lookup_id,
            matched,
            "evaluated candidate"
        );

        if matched {
            ScanCounters::bump(&counters.matches);
            Ok(Some(message))
        } else {
            Ok(None)
        }
    }
}
