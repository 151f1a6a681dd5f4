//! The queue collaborator a reader pulls candidates from.

use std::sync::Arc;
use std::time::Duration;

/// How a cursor peek moves before reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeekAction {
    /// Read at the cursor, or at the next surviving message if the one under
    /// the cursor was removed.
    Current,
    /// Move strictly past the cursor, then read.
    Next,
}

/// A provider queue.
///
/// Timeouts are `Option<Duration>`: `None` waits indefinitely and
/// `Some(Duration::ZERO)` does not wait at all. A peek or receive that times
/// out returns `Ok(None)`. Lookups by id return `Ok(None)` when no such
/// message is present. Errors are transport failures and are passed through
/// to the caller unchanged.
pub trait MessageQueue {
    /// The provider's native message.
    type Raw;
    /// A position in the queue used for ordered, non-destructive scans.
    type Cursor;
    /// A provider transaction a receive can enlist in.
    type Transaction;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Create a cursor positioned before the first message.
    fn create_cursor(&self) -> Self::Cursor;

    /// Peek through a cursor, waiting up to `timeout` for a message.
    fn peek_at(
        &self,
        cursor: &mut Self::Cursor,
        action: PeekAction,
        timeout: Option<Duration>,
    ) -> Result<Option<Self::Raw>, Self::Error>;

    /// Peek the head of the queue.
    fn peek(&self, timeout: Option<Duration>) -> Result<Option<Self::Raw>, Self::Error>;

    /// Remove and return the head of the queue.
    fn receive(
        &self,
        timeout: Option<Duration>,
        transaction: Option<&Self::Transaction>,
    ) -> Result<Option<Self::Raw>, Self::Error>;

    fn peek_by_id(
        &self,
        message_id: &str,
        timeout: Option<Duration>,
    ) -> Result<Option<Self::Raw>, Self::Error>;

    fn receive_by_id(
        &self,
        message_id: &str,
        timeout: Option<Duration>,
        transaction: Option<&Self::Transaction>,
    ) -> Result<Option<Self::Raw>, Self::Error>;

    fn peek_by_correlation_id(
        &self,
        correlation_id: &str,
        timeout: Option<Duration>,
    ) -> Result<Option<Self::Raw>, Self::Error>;

    fn receive_by_correlation_id(
        &self,
        correlation_id: &str,
        timeout: Option<Duration>,
        transaction: Option<&Self::Transaction>,
    ) -> Result<Option<Self::Raw>, Self::Error>;

    /// Peek by provider lookup id. Never waits.
    fn peek_by_lookup_id(&self, lookup_id: i64) -> Result<Option<Self::Raw>, Self::Error>;

    /// Remove by provider lookup id. Never waits; `Ok(None)` when the
    /// message is gone, for instance because another consumer took it.
    fn receive_by_lookup_id(
        &self,
        lookup_id: i64,
        transaction: Option<&Self::Transaction>,
    ) -> Result<Option<Self::Raw>, Self::Error>;
}

macro_rules! forward_queue {
    () => {
        type Raw = Q::Raw;
        type Cursor = Q::Cursor;
        type Transaction = Q::Transaction;
        type Error = Q::Error;

        fn create_cursor(&self) -> Self::Cursor {
            (**self).create_cursor()
        }

        fn peek_at(
            &self,
            cursor: &mut Self::Cursor,
            action: PeekAction,
            timeout: Option<Duration>,
        ) -> Result<Option<Self::Raw>, Self::Error> {
            (**self).peek_at(cursor, action, timeout)
        }

        fn peek(&self, timeout: Option<Duration>) -> Result<Option<Self::Raw>, Self::Error> {
            (**self).peek(timeout)
        }

        fn receive(
            &self,
            timeout: Option<Duration>,
            transaction: Option<&Self::Transaction>,
        ) -> Result<Option<Self::Raw>, Self::Error> {
            (**self).receive(timeout, transaction)
        }

        fn peek_by_id(
            &self,
            message_id: &str,
            timeout: Option<Duration>,
        ) -> Result<Option<Self::Raw>, Self::Error> {
            (**self).peek_by_id(message_id, timeout)
        }

        fn receive_by_id(
            &self,
            message_id: &str,
            timeout: Option<Duration>,
            transaction: Option<&Self::Transaction>,
        ) -> Result<Option<Self::Raw>, Self::Error> {
            (**self).receive_by_id(message_id, timeout, transaction)
        }

        fn peek_by_correlation_id(
            &self,
            correlation_id: &str,
            timeout: Option<Duration>,
        ) -> Result<Option<Self::Raw>, Self::Error> {
            (**self).peek_by_correlation_id(correlation_id, timeout)
        }

        fn receive_by_correlation_id(
            &self,
            correlation_id: &str,
            timeout: Option<Duration>,
            transaction: Option<&Self::Transaction>,
        ) -> Result<Option<Self::Raw>, Self::Error> {
            (**self).receive_by_correlation_id(correlation_id, timeout, transaction)
        }

        fn peek_by_lookup_id(&self, lookup_id: i64) -> Result<Option<Self::Raw>, Self::Error> {
            (**self).peek_by_lookup_id(lookup_id)
        }

        fn receive_by_lookup_id(
            &self,
            lookup_id: i64,
            transaction: Option<&Self::Transaction>,
        ) -> Result<Option<Self::Raw>, Self::Error> {
            (**self).receive_by_lookup_id(lookup_id, transaction)
        }
    };
}

impl<Q: MessageQueue + ?Sized> MessageQueue for &Q {
    forward_queue!();
}

impl<Q: MessageQueue + ?Sized> MessageQueue for Arc<Q> {
    forward_queue!();
}
