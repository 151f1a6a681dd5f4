//! Consumer-side message model.
//!
//! A [`Message`] is what a reader hands back after conversion from the
//! queue's native representation. Selectors see its standard headers
//! through reserved aliases and everything else through [`Properties`].

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::eval::Value;

/// Whether the queue keeps the message across restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryMode {
    #[default]
    Persistent,
    NonPersistent,
}

impl DeliveryMode {
    /// The string a selector compares the delivery mode header against.
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryMode::Persistent => "PERSISTENT",
            DeliveryMode::NonPersistent => "NON_PERSISTENT",
        }
    }
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Text(String),
    Bytes(Vec<u8>),
}

/// Application-defined message properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    entries: HashMap<String, Value>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a property, returning the previous value if any.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(name.into(), value.into())
    }

    /// Look up a property. Names are case-sensitive.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A converted message.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub message_id: String,
    pub correlation_id: Option<String>,
    /// 0 (lowest) to 9 (highest).
    pub priority: u8,
    pub timestamp: DateTime<Utc>,
    pub message_type: Option<String>,
    pub delivery_mode: DeliveryMode,
    /// Provider-assigned identifier used to remove a peeked message.
    pub lookup_id: Option<i64>,
    pub properties: Properties,
    /// `None` until the body has been converted.
    pub body: Option<Body>,
}

impl Message {
    /// Default priority for new messages.
    pub const DEFAULT_PRIORITY: u8 = 4;

    /// Create a message with the given id, stamped with the current time.
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            correlation_id: None,
            priority: Self::DEFAULT_PRIORITY,
            timestamp: Utc::now(),
            message_type: None,
            delivery_mode: DeliveryMode::default(),
            lookup_id: None,
            properties: Properties::new(),
            body: None,
        }
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Set the priority, clamped to 0..=9.
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority.min(9);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_type(mut self, message_type: impl Into<String>) -> Self {
        self.message_type = Some(message_type.into());
        self
    }

    pub fn with_delivery_mode(mut self, mode: DeliveryMode) -> Self {
        self.delivery_mode = mode;
        self
    }

    pub fn with_lookup_id(mut self, lookup_id: i64) -> Self {
        self.lookup_id = Some(lookup_id);
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    /// The body as text, if it is a text body.
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            Some(Body::Text(s)) => Some(s),
            _ => None,
        }
    }
}
