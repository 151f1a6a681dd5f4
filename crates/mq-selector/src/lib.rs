//! Message selectors for queue consumers.
//!
//! A selector is a SQL-like boolean expression over a message's headers and
//! properties, e.g. `JMSPriority > 4 AND region IN ('eu', 'us')`. This crate
//! compiles selectors, evaluates them with SQL tri-state semantics, and uses
//! them to filter what a consumer reads from a queue.
//!
//! # Quick Start
//!
//! ```
//! use std::time::Duration;
//! use mq_selector::{MemoryConverter, MemoryQueue, Message, MessageReader};
//!
//! let queue = MemoryQueue::new();
//! queue.send(Message::new("a").with_property("color", "blue")).unwrap();
//! queue.send(Message::new("b").with_property("color", "red")).unwrap();
//!
//! let reader = MessageReader::new(&queue, MemoryConverter::new(), "color = 'red'").unwrap();
//! let message = reader.receive(Some(Duration::ZERO), None).unwrap().unwrap();
//! assert_eq!(message.message_id, "b");
//! assert_eq!(queue.len(), 1);
//! ```
//!
//! # Modules
//!
//! - `eval`: values, numeric promotion, evaluation contexts and the evaluator
//! - `message`: the consumer-side message model
//! - `reader`: selector classification and selector-driven readers
//! - `memory`: an in-process queue implementing the reader's collaborator traits

mod expr;
mod selector;
mod unparser;

pub mod eval;
pub mod memory;
pub mod message;
pub mod reader;

pub use expr::{BinaryOp, Expression, InSet, UnaryOp};
pub use selector::{Selector, SelectorError};
pub use unparser::encode_string;

pub use eval::{EvalError, EvaluationContext, MessageEvaluationContext, PropertyContext, Value};
pub use memory::{MemoryConverter, MemoryQueue};
pub use message::{Body, DeliveryMode, Message, Properties};
pub use reader::{
    classify, ConversionError, MessageConverter, MessageQueue, MessageReader, PeekAction,
    ReadError, ReaderConfig, ScanStats, SelectorClassification,
};
