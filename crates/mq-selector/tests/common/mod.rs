//! Common test utilities for mq-selector integration tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use mq_selector::memory::{MemoryCursor, MemoryQueueError, MemoryTransaction, StoredMessage};
use mq_selector::{MemoryQueue, Message, MessageQueue, PeekAction, PropertyContext, Selector, Value};

pub const NO_WAIT: Option<Duration> = Some(Duration::ZERO);

/// Build a queue holding `messages` in order.
#[allow(dead_code)]
pub fn queue_with(messages: impl IntoIterator<Item = Message>) -> MemoryQueue {
    let queue = MemoryQueue::new();
    for message in messages {
        queue.send(message).expect("send");
    }
    queue
}

/// Parse and evaluate a selector against a property context.
#[allow(dead_code)]
pub fn eval(selector: &str, ctx: &PropertyContext) -> Value {
    Selector::parse(selector)
        .unwrap_or_else(|e| panic!("failed to parse '{}': {}", selector, e))
        .evaluate(ctx)
        .unwrap_or_else(|e| panic!("failed to evaluate '{}': {}", selector, e))
}

/// Evaluate a selector with no properties.
#[allow(dead_code)]
pub fn eval_empty(selector: &str) -> Value {
    eval(selector, &PropertyContext::new())
}

/// A queue where another consumer removes matched messages before the
/// reader can, for the first `steals` removal attempts.
#[allow(dead_code)]
pub struct RacingQueue<'q> {
    inner: &'q MemoryQueue,
    steals_left: AtomicU32,
    stolen: AtomicU32,
}

#[allow(dead_code)]
impl<'q> RacingQueue<'q> {
    pub fn new(inner: &'q MemoryQueue, steals: u32) -> Self {
        Self {
            inner,
            steals_left: AtomicU32::new(steals),
            stolen: AtomicU32::new(0),
        }
    }

    pub fn stolen(&self) -> u32 {
        self.stolen.load(Ordering::Relaxed)
    }

    fn steal(&self) -> bool {
        self.steals_left
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl MessageQueue for RacingQueue<'_> {
    type Raw = StoredMessage;
    type Cursor = MemoryCursor;
    type Transaction = MemoryTransaction;
    type Error = MemoryQueueError;

    fn create_cursor(&self) -> MemoryCursor {
        self.inner.create_cursor()
    }

    fn peek_at(
        &self,
        cursor: &mut MemoryCursor,
        action: PeekAction,
        timeout: Option<Duration>,
    ) -> Result<Option<StoredMessage>, MemoryQueueError> {
        self.inner.peek_at(cursor, action, timeout)
    }

    fn peek(&self, timeout: Option<Duration>) -> Result<Option<StoredMessage>, MemoryQueueError> {
        self.inner.peek(timeout)
    }

    fn receive(
        &self,
        timeout: Option<Duration>,
        transaction: Option<&MemoryTransaction>,
    ) -> Result<Option<StoredMessage>, MemoryQueueError> {
        self.inner.receive(timeout, transaction)
    }

    fn peek_by_id(
        &self,
        message_id: &str,
        timeout: Option<Duration>,
    ) -> Result<Option<StoredMessage>, MemoryQueueError> {
        self.inner.peek_by_id(message_id, timeout)
    }

    fn receive_by_id(
        &self,
        message_id: &str,
        timeout: Option<Duration>,
        transaction: Option<&MemoryTransaction>,
    ) -> Result<Option<StoredMessage>, MemoryQueueError> {
        self.inner.receive_by_id(message_id, timeout, transaction)
    }

    fn peek_by_correlation_id(
        &self,
        correlation_id: &str,
        timeout: Option<Duration>,
    ) -> Result<Option<StoredMessage>, MemoryQueueError> {
        self.inner.peek_by_correlation_id(correlation_id, timeout)
    }

    fn receive_by_correlation_id(
        &self,
        correlation_id: &str,
        timeout: Option<Duration>,
        transaction: Option<&MemoryTransaction>,
    ) -> Result<Option<StoredMessage>, MemoryQueueError> {
        self.inner
            .receive_by_correlation_id(correlation_id, timeout, transaction)
    }

    fn peek_by_lookup_id(&self, lookup_id: i64) -> Result<Option<StoredMessage>, MemoryQueueError> {
        self.inner.peek_by_lookup_id(lookup_id)
    }

    fn receive_by_lookup_id(
        &self,
        lookup_id: i64,
        transaction: Option<&MemoryTransaction>,
    ) -> Result<Option<StoredMessage>, MemoryQueueError> {
        if self.steal() {
            self.inner.receive_by_lookup_id(lookup_id, None)?;
            self.stolen.fetch_add(1, Ordering::Relaxed);
        }
        self.inner.receive_by_lookup_id(lookup_id, transaction)
    }
}
