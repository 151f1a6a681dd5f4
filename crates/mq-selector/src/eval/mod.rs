//! Selector evaluation engine.
//!
//! - `Value` represents runtime values
//! - `numeric` aligns mixed numeric operands through the promotion lattice
//! - `EvaluationContext` resolves identifiers against a message
//! - `Evaluator` performs tree-walking evaluation
//!
//! # Example
//!
//! ```
//! use mq_selector::Selector;
//! use mq_selector::eval::{PropertyContext, Value};
//!
//! let selector = Selector::parse("weight > 2500 AND color = 'red'").unwrap();
//! let ctx = PropertyContext::new()
//!     .with("weight", 3000)
//!     .with("color", "red");
//!
//! assert_eq!(selector.evaluate(&ctx).unwrap(), Value::Bool(true));
//! ```

mod context;
mod error;
mod evaluator;
mod like;
pub mod numeric;
mod value;

pub use context::{EvaluationContext, Header, MessageEvaluationContext, PropertyContext};
pub use error::{EvalError, EvalErrorKind};
pub use evaluator::Evaluator;
pub use like::LikePattern;
pub use value::{NumericKind, Value};
