//! Error codes for the structviz diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - String and character errors
//! - `E1xx` - Structure errors

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // String and Character Errors (E0xx)
    // =========================================================================
    /// Unterminated string literal.
    ///
    /// A string was opened with a quote but never closed on the same line.
    E001,

    /// Unexpected character.
    ///
    /// A character was encountered that cannot start a value.
    E002,

    /// Invalid escape sequence.
    ///
    /// Valid escapes are: `\"`, `\\`, `\/`, `\b`, `\f`, `\n`, `\r`, `\t`, `\uXXXX`.
    E003,

    /// Invalid unicode escape format.
    ///
    /// A `\u` escape must be followed by exactly four hexadecimal digits.
    E004,

    /// Invalid number literal.
    ///
    /// A number had a dangling decimal point or exponent.
    E005,

    // =========================================================================
    // Structure Errors (E1xx)
    // =========================================================================
    /// Unexpected token.
    ///
    /// The parser encountered a character it did not expect at this position.
    E100,

    /// Incomplete input.
    ///
    /// The input ended before a complete value was parsed.
    E101,

    /// Trailing characters.
    ///
    /// A complete value was parsed but more input followed it.
    E102,

    /// Empty input.
    ///
    /// The input contains nothing but whitespace.
    E103,

    /// Nesting too deep.
    ///
    /// Sequences and mappings are nested beyond the supported depth.
    E104,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            ErrorCode::E005 => "E005",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated string literal",
            ErrorCode::E002 => "unexpected character",
            ErrorCode::E003 => "invalid escape sequence",
            ErrorCode::E004 => "invalid unicode escape",
            ErrorCode::E005 => "invalid number literal",
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "incomplete input",
            ErrorCode::E102 => "trailing characters",
            ErrorCode::E103 => "empty input",
            ErrorCode::E104 => "nesting too deep",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E100.to_string(), "E100");
        assert_eq!(ErrorCode::E104.to_string(), "E104");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E001.description(), "unterminated string literal");
        assert_eq!(ErrorCode::E102.description(), "trailing characters");
        assert_eq!(ErrorCode::E103.description(), "empty input");
    }
}
