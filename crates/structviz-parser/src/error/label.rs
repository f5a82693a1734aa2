//! Labeled source spans for diagnostic messages.

use crate::span::Span;

/// A labeled span in the input text.
///
/// **Primary labels** mark where parsing failed; **secondary labels** point
/// at related context, such as the opening bracket of an unclosed sequence.
///
/// ```text
/// error[E001]: unterminated string literal
///  --> input:1:9
///   |
/// 1 | {"name": "abc
///   |          ^^^^ unterminated string literal
/// ```
#[derive(Debug, Clone)]
pub struct Label {
    span: Span,
    message: String,
    is_primary: bool,
}

impl Label {
    /// Create a new primary label.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a new secondary label.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }

    /// Get the span this label applies to.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Get the label message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Check if this is a primary label.
    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    /// Check if this is a secondary label.
    pub fn is_secondary(&self) -> bool {
        !self.is_primary
    }
}
