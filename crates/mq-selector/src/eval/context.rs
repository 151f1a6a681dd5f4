//! Property resolution for selector evaluation.
//!
//! The `EvaluationContext` trait resolves identifiers in a selector to
//! values. `MessageEvaluationContext` binds one message at a time and maps
//! the reserved `JMS*`/`NMS*` header aliases onto standard message headers;
//! `PropertyContext` is a plain name-to-value map for ad-hoc evaluation.

use std::collections::HashMap;
use std::sync::Arc;

use super::Value;
use crate::message::Message;

/// Trait for resolving identifiers during evaluation.
pub trait EvaluationContext {
    /// Resolve a name to its value. Unknown names resolve to `Value::Null`.
    fn get_property(&self, name: &str) -> Value;
}

impl<T: EvaluationContext + ?Sized> EvaluationContext for &T {
    fn get_property(&self, name: &str) -> Value {
        (**self).get_property(name)
    }
}

impl<T: EvaluationContext + ?Sized> EvaluationContext for Box<T> {
    fn get_property(&self, name: &str) -> Value {
        (**self).get_property(name)
    }
}

impl<T: EvaluationContext + ?Sized> EvaluationContext for Arc<T> {
    fn get_property(&self, name: &str) -> Value {
        (**self).get_property(name)
    }
}

/// Standard headers reachable through reserved aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Header {
    CorrelationId,
    MessageId,
    Priority,
    Timestamp,
    Type,
    DeliveryMode,
}

impl Header {
    /// Recognize a reserved alias: `JMS` or `NMS` followed by a header
    /// name, compared case-insensitively. `MessageID` and `CorrelationID`
    /// are also recognized without a prefix.
    pub fn from_alias(name: &str) -> Option<Header> {
        if let Some(header) = Self::from_unprefixed(name) {
            return Some(header);
        }

        let prefix = name.get(..3)?;
        if !prefix.eq_ignore_ascii_case("JMS") && !prefix.eq_ignore_ascii_case("NMS") {
            return None;
        }

        let suffix = &name[3..];
        [
            ("CorrelationID", Header::CorrelationId),
            ("MessageID", Header::MessageId),
            ("Priority", Header::Priority),
            ("Timestamp", Header::Timestamp),
            ("Type", Header::Type),
            ("DeliveryMode", Header::DeliveryMode),
        ]
        .into_iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(suffix))
        .map(|(_, header)| header)
    }

    fn from_unprefixed(name: &str) -> Option<Header> {
        if name.eq_ignore_ascii_case("MessageID") {
            Some(Header::MessageId)
        } else if name.eq_ignore_ascii_case("CorrelationID") {
            Some(Header::CorrelationId)
        } else {
            None
        }
    }

    /// Read this header from a message.
    pub fn read(self, message: &Message) -> Value {
        match self {
            Header::CorrelationId => message.correlation_id.as_deref().into(),
            Header::MessageId => Value::from(message.message_id.as_str()),
            Header::Priority => Value::Int32(i32::from(message.priority)),
            Header::Timestamp => Value::Int64(message.timestamp.timestamp_millis()),
            Header::Type => message.message_type.as_deref().into(),
            Header::DeliveryMode => Value::from(message.delivery_mode.as_str()),
        }
    }
}

/// Evaluation context over a single message.
///
/// Not meant to be shared between threads; each scanning reader re-points
/// its own context at every candidate.
#[derive(Debug, Clone, Copy)]
pub struct MessageEvaluationContext<'m> {
    message: &'m Message,
}

impl<'m> MessageEvaluationContext<'m> {
    pub fn new(message: &'m Message) -> Self {
        Self { message }
    }

    /// Re-point the context at another message.
    pub fn set_message(&mut self, message: &'m Message) {
        self.message = message;
    }

    pub fn message(&self) -> &'m Message {
        self.message
    }
}

impl EvaluationContext for MessageEvaluationContext<'_> {
    fn get_property(&self, name: &str) -> Value {
        match Header::from_alias(name) {
            Some(header) => header.read(self.message),
            None => self
                .message
                .properties
                .get(name)
                .cloned()
                .unwrap_or(Value::Null),
        }
    }
}

/// A context backed by a map of names to values.
#[derive(Debug, Clone, Default)]
pub struct PropertyContext {
    bindings: HashMap<String, Value>,
}

impl PropertyContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.bindings.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.bindings.insert(name.into(), value.into());
    }
}

impl EvaluationContext for PropertyContext {
    fn get_property(&self, name: &str) -> Value {
        self.bindings.get(name).cloned().unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::message::DeliveryMode;

    fn sample() -> Message {
        Message::new("ID:1")
            .with_correlation_id("corr-7")
            .with_priority(7)
            .with_timestamp(Utc.timestamp_millis_opt(1_700_000_000_123).unwrap())
            .with_type("ORDER")
            .with_delivery_mode(DeliveryMode::NonPersistent)
            .with_property("color", "red")
            .with_property("JMSXGroupID", "g1")
    }

    #[test]
    fn reserved_aliases_resolve_to_headers() {
        let message = sample();
        let ctx = MessageEvaluationContext::new(&message);

        assert_eq!(ctx.get_property("JMSMessageID"), Value::from("ID:1"));
        assert_eq!(ctx.get_property("JMSCorrelationID"), Value::from("corr-7"));
        assert_eq!(ctx.get_property("JMSPriority"), Value::Int32(7));
        assert_eq!(
            ctx.get_property("JMSTimestamp"),
            Value::Int64(1_700_000_000_123)
        );
        assert_eq!(ctx.get_property("JMSType"), Value::from("ORDER"));
        assert_eq!(
            ctx.get_property("JMSDeliveryMode"),
            Value::from("NON_PERSISTENT")
        );
    }

    #[test]
    fn aliases_are_case_insensitive_with_either_prefix() {
        let message = sample();
        let ctx = MessageEvaluationContext::new(&message);

        assert_eq!(ctx.get_property("jmstype"), Value::from("ORDER"));
        assert_eq!(ctx.get_property("NMSType"), Value::from("ORDER"));
        assert_eq!(ctx.get_property("nmsMessageId"), Value::from("ID:1"));
    }

    #[test]
    fn message_and_correlation_ids_resolve_without_prefix() {
        let message = sample();
        let ctx = MessageEvaluationContext::new(&message);

        assert_eq!(ctx.get_property("MessageId"), Value::from("ID:1"));
        assert_eq!(ctx.get_property("CORRELATIONID"), Value::from("corr-7"));
        assert_eq!(Header::from_alias("Priority"), None);
        assert_eq!(Header::from_alias("Type"), None);
    }

    #[test]
    fn other_names_use_property_bag() {
        let message = sample();
        let ctx = MessageEvaluationContext::new(&message);

        assert_eq!(ctx.get_property("color"), Value::from("red"));
        assert_eq!(ctx.get_property("Color"), Value::Null);
        assert_eq!(ctx.get_property("JMSXGroupID"), Value::from("g1"));
        assert_eq!(ctx.get_property("missing"), Value::Null);
    }

    #[test]
    fn absent_optional_headers_are_null() {
        let message = Message::new("ID:2");
        let ctx = MessageEvaluationContext::new(&message);

        assert_eq!(ctx.get_property("JMSCorrelationID"), Value::Null);
        assert_eq!(ctx.get_property("JMSType"), Value::Null);
        assert_eq!(ctx.get_property("JMSDeliveryMode"), Value::from("PERSISTENT"));
    }

    #[test]
    fn set_message_repoints_context() {
        let first = sample();
        let second = Message::new("ID:2").with_type("OTHER");
        let mut ctx = MessageEvaluationContext::new(&first);
        assert_eq!(ctx.get_property("JMSType"), Value::from("ORDER"));

        ctx.set_message(&second);
        assert_eq!(ctx.get_property("JMSType"), Value::from("OTHER"));
        assert_eq!(ctx.message().message_id, "ID:2");
    }

    #[test]
    fn property_context_and_blanket_impls() {
        let ctx = PropertyContext::new().with("x", 5);
        assert_eq!(ctx.get_property("x"), Value::Int32(5));
        assert_eq!((&ctx).get_property("x"), Value::Int32(5));

        let boxed: Box<dyn EvaluationContext> = Box::new(ctx.clone());
        assert_eq!(boxed.get_property("x"), Value::Int32(5));

        let shared = Arc::new(ctx);
        assert_eq!(shared.get_property("y"), Value::Null);
    }
}
