//! Conversion from a queue's native messages to [`Message`].

use crate::message::Message;

/// Error raised while converting a native message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("message '{message_id}' has no lookup id")]
    MissingLookupId { message_id: String },
    #[error("message '{message_id}' has an invalid body: {reason}")]
    InvalidBody { message_id: String, reason: String },
}

/// Converts native messages in two steps so that bodies of candidates that
/// do not match a selector are never decoded.
pub trait MessageConverter<Raw> {
    /// Convert headers and properties only. `body` is left `None`.
    fn convert_headers(&self, raw: &Raw) -> Result<Message, ConversionError>;

    /// Fill in the body of a message produced by `convert_headers`.
    fn convert_body(&self, raw: &Raw, message: &mut Message) -> Result<(), ConversionError>;

    /// Full conversion.
    fn convert(&self, raw: &Raw) -> Result<Message, ConversionError> {
        let mut message = self.convert_headers(raw)?;
        self.convert_body(raw, &mut message)?;
        Ok(message)
    }
}

impl<Raw, C: MessageConverter<Raw> + ?Sized> MessageConverter<Raw> for &C {
    fn convert_headers(&self, raw: &Raw) -> Result<Message, ConversionError> {
        (**self).convert_headers(raw)
    }

    fn convert_body(&self, raw: &Raw, message: &mut Message) -> Result<(), ConversionError> {
        (**self).convert_body(raw, message)
    }
}
