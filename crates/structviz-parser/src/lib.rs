//! # structviz Parser
//!
//! Turns user-supplied text into a [`Value`]. Input is first parsed with a
//! strict JSON grammar; when that fails, a permissive line-oriented reader
//! splits each line into comma or whitespace separated tokens.
//!
//! ## Usage
//!
//! ```
//! # use structviz_parser::{parse, ParseError};
//! # use structviz_core::value::Value;
//!
//! fn main() -> Result<(), ParseError> {
//!     let strict = parse(r#"{"value": 1, "next": null}"#)?;
//!     assert!(strict.has_key("next"));
//!
//!     let tokens = parse("5, 2, 8")?;
//!     assert_eq!(tokens.as_sequence().map(<[Value]>::len), Some(3));
//!     Ok(())
//! }
//! ```

pub mod error;
mod fallback;
mod pretty;
mod span;
mod strict;

pub use error::ParseError;
pub use pretty::to_pretty_string;
pub use span::Span;

use log::debug;

use structviz_core::value::Value;

use error::{Diagnostic, ErrorCode};

fn empty_input_error(source: &str) -> ParseError {
    Diagnostic::error("input is empty")
        .with_code(ErrorCode::E103)
        .with_label(Span::new(0..source.len()), "nothing to visualize")
        .with_help("enter a JSON value or a list of comma separated values")
        .into()
}

/// Parse text into a structured value.
///
/// The strict grammar is tried first. If it rejects the text, every
/// non-blank line is read on its own (strictly when possible, otherwise as
/// tokens), so inputs such as `1, 2, 3` or a whitespace separated matrix
/// still produce a value.
///
/// # Errors
///
/// Returns a [`ParseError`] with code [`ErrorCode::E103`] when the text is
/// empty or only whitespace. Any non-blank input produces a value.
pub fn parse(source: &str) -> Result<Value, ParseError> {
    if source.trim().is_empty() {
        return Err(empty_input_error(source));
    }

    let diagnostic = match strict::parse_value(source) {
        Ok(value) => {
            debug!(kind = value.kind_name(); "Parsed input strictly");
            return Ok(value);
        }
        Err(diagnostic) => diagnostic,
    };

    debug!(reason = diagnostic.to_string(); "Strict parse failed, reading input by lines");
    fallback::parse_lines(source).ok_or_else(|| diagnostic.into())
}

/// Parse text with the strict grammar only.
///
/// Unlike [`parse`], no fallback is attempted: the first grammar violation
/// is returned as a diagnostic pointing into `source`.
///
/// # Errors
///
/// Returns a [`ParseError`] describing the first violation, or
/// [`ErrorCode::E103`] for empty input.
pub fn parse_strict(source: &str) -> Result<Value, ParseError> {
    if source.trim().is_empty() {
        return Err(empty_input_error(source));
    }
    strict::parse_value(source).map_err(ParseError::from)
}

/// Read text the way [`parse`] does and render it re-indented.
///
/// Input that only the line reader accepts comes back in canonical form,
/// so `1, 2` formats as a two-element array.
///
/// # Errors
///
/// Returns the same errors as [`parse`].
///
/// # Example
///
/// ```
/// # use structviz_parser::format;
/// assert_eq!(format("[1,2]").unwrap(), "[\n  1,\n  2\n]");
/// assert_eq!(format("1, 2").unwrap(), "[\n  1,\n  2\n]");
/// ```
pub fn format(source: &str) -> Result<String, ParseError> {
    parse(source).map(|value| to_pretty_string(&value))
}
