//! Error and diagnostic system for the structviz parser.
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error or warning message with optional error code, labelled
//! source locations, and help text. Diagnostics are wrapped in
//! [`ParseError`] when returned from [`parse`](crate::parse).
//!
//! # Example
//!
//! ```
//! # use structviz_parser::error::{Diagnostic, ErrorCode};
//! # use structviz_parser::Span;
//!
//! let diag = Diagnostic::error("unterminated string literal")
//!     .with_code(ErrorCode::E001)
//!     .with_label(Span::new(9..13), "unterminated string literal")
//!     .with_help("add closing `\"`");
//! ```

mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use parse_error::Result;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
