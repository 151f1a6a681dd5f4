//! In-process queue.
//!
//! [`MemoryQueue`] keeps messages in arrival order behind a mutex and wakes
//! blocked peeks through a condition variable. It is the reference
//! implementation of [`MessageQueue`]: readers built on it behave the way
//! they would against a provider queue, including lost receive races when
//! several consumers share one queue.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::message::{Body, DeliveryMode, Message, Properties};
use crate::reader::{ConversionError, MessageConverter, MessageQueue, PeekAction};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryQueueError {
    #[error("memory queue lock poisoned")]
    Poisoned,
}

/// Payload as stored. Text is kept as bytes and decoded on conversion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StoredBody {
    #[default]
    Empty,
    Text(Vec<u8>),
    Bytes(Vec<u8>),
}

/// The queue's native message.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMessage {
    /// Assigned by the queue on send.
    pub lookup_id: i64,
    pub id: String,
    pub correlation_id: Option<String>,
    pub label: Option<String>,
    pub priority: u8,
    pub sent_at: DateTime<Utc>,
    pub recoverable: bool,
    pub properties: Properties,
    pub body: StoredBody,
}

impl From<Message> for StoredMessage {
    fn from(message: Message) -> Self {
        let body = match message.body {
            None => StoredBody::Empty,
            Some(Body::Text(text)) => StoredBody::Text(text.into_bytes()),
            Some(Body::Bytes(bytes)) => StoredBody::Bytes(bytes),
        };
        Self {
            lookup_id: 0,
            id: message.message_id,
            correlation_id: message.correlation_id,
            label: message.message_type,
            priority: message.priority.min(9),
            sent_at: message.timestamp,
            recoverable: message.delivery_mode == DeliveryMode::Persistent,
            properties: message.properties,
            body,
        }
    }
}

/// Cursor into a [`MemoryQueue`], remembering the lookup id it last saw.
#[derive(Debug, Clone, Default)]
pub struct MemoryCursor {
    position: Option<i64>,
}

/// Messages received under a transaction, restorable with
/// [`MemoryQueue::rollback`].
#[derive(Debug, Default)]
pub struct MemoryTransaction {
    received: Mutex<Vec<StoredMessage>>,
}

impl MemoryTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lookup ids received so far, in order.
    pub fn received(&self) -> Vec<i64> {
        self.received
            .lock()
            .map(|r| r.iter().map(|m| m.lookup_id).collect())
            .unwrap_or_default()
    }

    fn record(&self, message: &StoredMessage) -> Result<(), MemoryQueueError> {
        self.received
            .lock()
            .map_err(|_| MemoryQueueError::Poisoned)?
            .push(message.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
struct State {
    messages: BTreeMap<i64, StoredMessage>,
    next_lookup_id: i64,
}

impl State {
    fn first_from(&self, from: Option<i64>, inclusive: bool) -> Option<&StoredMessage> {
        let lower = match from {
            None => Bound::Unbounded,
            Some(at) if inclusive => Bound::Included(at),
            Some(at) => Bound::Excluded(at),
        };
        self.messages
            .range((lower, Bound::Unbounded))
            .next()
            .map(|(_, m)| m)
    }

    fn find(&self, predicate: impl Fn(&StoredMessage) -> bool) -> Option<i64> {
        self.messages
            .values()
            .find(|m| predicate(m))
            .map(|m| m.lookup_id)
    }
}

/// An in-process queue with blocking peeks and cursors.
#[derive(Debug, Default)]
pub struct MemoryQueue {
    state: Mutex<State>,
    arrived: Condvar,
    cursor_peeks: AtomicU64,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a message, returning its lookup id. Messages without an id
    /// are given `mem-<lookup id>`.
    pub fn send(&self, message: Message) -> Result<i64, MemoryQueueError> {
        self.send_stored(StoredMessage::from(message))
    }

    /// Enqueue a native message. Its lookup id is reassigned.
    pub fn send_stored(&self, mut message: StoredMessage) -> Result<i64, MemoryQueueError> {
        let mut state = self.lock()?;
        state.next_lookup_id += 1;
        let lookup_id = state.next_lookup_id;

        message.lookup_id = lookup_id;
        if message.id.is_empty() {
            message.id = format!("mem-{lookup_id}");
        }
        trace!(lookup_id, message_id = %message.id, "sent");
        state.messages.insert(lookup_id, message);
        drop(state);

        self.arrived.notify_all();
        Ok(lookup_id)
    }

    /// Put back everything received under `transaction`.
    pub fn rollback(&self, transaction: &MemoryTransaction) -> Result<usize, MemoryQueueError> {
        let restored = std::mem::take(
            &mut *transaction
                .received
                .lock()
                .map_err(|_| MemoryQueueError::Poisoned)?,
        );
        let count = restored.len();

        let mut state = self.lock()?;
        for message in restored {
            state.messages.insert(message.lookup_id, message);
        }
        drop(state);

        self.arrived.notify_all();
        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.lock().map(|s| s.messages.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of cursor peeks served so far.
    pub fn cursor_peeks(&self) -> u64 {
        self.cursor_peeks.load(Ordering::Relaxed)
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, MemoryQueueError> {
        self.state.lock().map_err(|_| MemoryQueueError::Poisoned)
    }

    /// Run `attempt` until it yields a value or `timeout` expires.
    fn wait_for<T>(
        &self,
        timeout: Option<Duration>,
        mut attempt: impl FnMut(&mut State) -> Result<Option<T>, MemoryQueueError>,
    ) -> Result<Option<T>, MemoryQueueError> {
        // Timeouts too large to represent wait forever.
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
        let mut state = self.lock()?;

        loop {
            if let Some(found) = attempt(&mut state)? {
                return Ok(Some(found));
            }

            state = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Ok(None);
                    }
                    self.arrived
                        .wait_timeout(state, deadline - now)
                        .map_err(|_| MemoryQueueError::Poisoned)?
                        .0
                }
                None => self
                    .arrived
                    .wait(state)
                    .map_err(|_| MemoryQueueError::Poisoned)?,
            };
        }
    }

    fn take(
        state: &mut State,
        lookup_id: i64,
        transaction: Option<&MemoryTransaction>,
    ) -> Result<Option<StoredMessage>, MemoryQueueError> {
        let Some(message) = state.messages.remove(&lookup_id) else {
            return Ok(None);
        };
        if let Some(transaction) = transaction {
            transaction.record(&message)?;
        }
        Ok(Some(message))
    }

    fn peek_where(
        &self,
        timeout: Option<Duration>,
        predicate: impl Fn(&StoredMessage) -> bool,
    ) -> Result<Option<StoredMessage>, MemoryQueueError> {
        self.wait_for(timeout, |state| {
            Ok(state
                .find(&predicate)
                .and_then(|id| state.messages.get(&id).cloned()))
        })
    }

    fn receive_where(
        &self,
        timeout: Option<Duration>,
        transaction: Option<&MemoryTransaction>,
        predicate: impl Fn(&StoredMessage) -> bool,
    ) -> Result<Option<StoredMessage>, MemoryQueueError> {
        self.wait_for(timeout, |state| match state.find(&predicate) {
            Some(lookup_id) => Self::take(state, lookup_id, transaction),
            None => Ok(None),
        })
    }
}

impl MessageQueue for MemoryQueue {
    type Raw = StoredMessage;
    type Cursor = MemoryCursor;
    type Transaction = MemoryTransaction;
    type Error = MemoryQueueError;

    fn create_cursor(&self) -> MemoryCursor {
        MemoryCursor::default()
    }

    fn peek_at(
        &self,
        cursor: &mut MemoryCursor,
        action: PeekAction,
        timeout: Option<Duration>,
    ) -> Result<Option<StoredMessage>, MemoryQueueError> {
        self.cursor_peeks.fetch_add(1, Ordering::Relaxed);
        self.wait_for(timeout, |state| {
            let found = state
                .first_from(cursor.position, action == PeekAction::Current)
                .cloned();
            if let Some(message) = &found {
                cursor.position = Some(message.lookup_id);
            }
            Ok(found)
        })
    }

    fn peek(&self, timeout: Option<Duration>) -> Result<Option<StoredMessage>, MemoryQueueError> {
        self.peek_where(timeout, |_| true)
    }

    fn receive(
        &self,
        timeout: Option<Duration>,
        transaction: Option<&MemoryTransaction>,
    ) -> Result<Option<StoredMessage>, MemoryQueueError> {
        self.receive_where(timeout, transaction, |_| true)
    }

    fn peek_by_id(
        &self,
        message_id: &str,
        timeout: Option<Duration>,
    ) -> Result<Option<StoredMessage>, MemoryQueueError> {
        self.peek_where(timeout, |m| m.id == message_id)
    }

    fn receive_by_id(
        &self,
        message_id: &str,
        timeout: Option<Duration>,
        transaction: Option<&MemoryTransaction>,
    ) -> Result<Option<StoredMessage>, MemoryQueueError> {
        self.receive_where(timeout, transaction, |m| m.id == message_id)
    }

    fn peek_by_correlation_id(
        &self,
        correlation_id: &str,
        timeout: Option<Duration>,
    ) -> Result<Option<StoredMessage>, MemoryQueueError> {
        self.peek_where(timeout, |m| {
            m.correlation_id.as_deref() == Some(correlation_id)
        })
    }

    fn receive_by_correlation_id(
        &self,
        correlation_id: &str,
        timeout: Option<Duration>,
        transaction: Option<&MemoryTransaction>,
    ) -> Result<Option<StoredMessage>, MemoryQueueError> {
        self.receive_where(timeout, transaction, |m| {
            m.correlation_id.as_deref() == Some(correlation_id)
        })
    }

    fn peek_by_lookup_id(&self, lookup_id: i64) -> Result<Option<StoredMessage>, MemoryQueueError> {
        Ok(self.lock()?.messages.get(&lookup_id).cloned())
    }

    fn receive_by_lookup_id(
        &self,
        lookup_id: i64,
        transaction: Option<&MemoryTransaction>,
    ) -> Result<Option<StoredMessage>, MemoryQueueError> {
        let mut state = self.lock()?;
        Self::take(&mut state, lookup_id, transaction)
    }
}

/// Converts [`StoredMessage`]s, decoding text bodies as UTF-8.
///
/// The lookup id is also exposed as the `LookupId` property so selectors
/// can reference it on the scanning path.
#[derive(Debug, Default)]
pub struct MemoryConverter {
    body_conversions: AtomicU64,
}

impl MemoryConverter {
    pub const LOOKUP_ID_PROPERTY: &'static str = "LookupId";

    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bodies converted so far.
    pub fn body_conversions(&self) -> u64 {
        self.body_conversions.load(Ordering::Relaxed)
    }
}

impl MessageConverter<StoredMessage> for MemoryConverter {
    fn convert_headers(&self, raw: &StoredMessage) -> Result<Message, ConversionError> {
        let mut properties = raw.properties.clone();
        properties.insert(Self::LOOKUP_ID_PROPERTY, raw.lookup_id);

        Ok(Message {
            message_id: raw.id.clone(),
            correlation_id: raw.correlation_id.clone(),
            priority: raw.priority,
            timestamp: raw.sent_at,
            message_type: raw.label.clone(),
            delivery_mode: if raw.recoverable {
                DeliveryMode::Persistent
            } else {
                DeliveryMode::NonPersistent
            },
            lookup_id: Some(raw.lookup_id),
            properties,
            body: None,
        })
    }

    fn convert_body(&self, raw: &StoredMessage, message: &mut Message) -> Result<(), ConversionError> {
        self.body_conversions.fetch_add(1, Ordering::Relaxed);
        message.body = match &raw.body {
            StoredBody::Empty => None,
            StoredBody::Text(bytes) => {
                let text = String::from_utf8(bytes.clone()).map_err(|e| {
                    ConversionError::InvalidBody {
                        message_id: raw.id.clone(),
                        reason: e.to_string(),
                    }
                })?;
                Some(Body::Text(text))
            }
            StoredBody::Bytes(bytes) => Some(Body::Bytes(bytes.clone())),
        };
        Ok(())
    }
}
