//! Permissive line-oriented parser used when strict parsing fails.
//!
//! Every non-blank line is read on its own: first strictly, and if that
//! fails, as a list of comma or whitespace separated tokens.

use log::trace;
use winnow::{
    Parser as _,
    ascii::{digit0, digit1},
    combinator::{alt, opt},
    error::{ContextError, ErrMode},
    token::one_of,
};

use structviz_core::value::Value;

use crate::strict;

/// The longest decimal literal at the start of a token:
/// `[+-]?(digits(.digits?)?|.digits)([eE][+-]?digits)?`
fn float_prefix<'src>(input: &mut &'src str) -> Result<&'src str, ErrMode<ContextError>> {
    (
        opt(one_of(['+', '-'])),
        alt(((digit1, opt(('.', digit0))).void(), ('.', digit1).void())),
        opt((one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1)),
    )
        .take()
        .parse_next(input)
}

/// Reads one token as the finite number its leading literal spells, or as
/// the raw text when it does not start with one.
fn token_value(token: &str) -> Value {
    let mut rest = token;
    match float_prefix(&mut rest).map(str::parse::<f64>) {
        Ok(Ok(number)) if number.is_finite() => Value::Number(number),
        _ => Value::String(token.to_string()),
    }
}

/// Splits a line on runs of commas and whitespace.
///
/// A single token yields a scalar, several yield a sequence.
fn tokenize_line(line: &str) -> Value {
    let mut tokens: Vec<Value> = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(token_value)
        .collect();

    if tokens.len() == 1 {
        tokens.swap_remove(0)
    } else {
        Value::Sequence(tokens)
    }
}

fn parse_line(index: usize, line: &str) -> Value {
    match strict::parse_value(line) {
        Ok(value) => value,
        Err(diagnostic) => {
            trace!(line = index + 1, reason = diagnostic.message(); "Reading line as tokens");
            tokenize_line(line)
        }
    }
}

/// Parses `source` line by line.
///
/// Returns `None` when there is no non-blank line. A single line yields its
/// own value; several lines yield a sequence of line values.
pub(crate) fn parse_lines(source: &str) -> Option<Value> {
    let mut values: Vec<Value> = source
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(index, line)| parse_line(index, line))
        .collect();

    match values.len() {
        0 => None,
        1 => values.pop(),
        _ => Some(Value::Sequence(values)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(values: &[f64]) -> Value {
        Value::Sequence(values.iter().copied().map(Value::from).collect())
    }

    #[test]
    fn test_comma_separated_numbers() {
        assert_eq!(parse_lines("5, 2, 8, 1"), Some(numbers(&[5.0, 2.0, 8.0, 1.0])));
    }

    #[test]
    fn test_whitespace_separated_tokens() {
        assert_eq!(
            parse_lines("1 two\t3.5"),
            Some(Value::Sequence(vec![
                Value::from(1),
                Value::from("two"),
                Value::from(3.5),
            ]))
        );
    }

    #[test]
    fn test_single_token_is_scalar() {
        assert_eq!(parse_lines("apple"), Some(Value::from("apple")));
        assert_eq!(parse_lines("  42  "), Some(Value::from(42)));
    }

    #[test]
    fn test_each_line_parsed_strictly_first() {
        let value = parse_lines("[1, 2]\n{\"a\": 1}\nx y").unwrap();
        let lines = value.as_sequence().unwrap();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], numbers(&[1.0, 2.0]));
        assert_eq!(lines[1].get("a"), Some(&Value::from(1)));
        assert_eq!(
            lines[2],
            Value::Sequence(vec![Value::from("x"), Value::from("y")])
        );
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        assert_eq!(
            parse_lines("1 2 3\n\n   \n4 5 6\r\n"),
            Some(Value::Sequence(vec![
                numbers(&[1.0, 2.0, 3.0]),
                numbers(&[4.0, 5.0, 6.0]),
            ]))
        );
        assert_eq!(parse_lines(" \n\t\n"), None);
    }

    #[test]
    fn test_leading_number_is_read() {
        assert_eq!(parse_lines("3px, 4px"), Some(numbers(&[3.0, 4.0])));
        assert_eq!(
            parse_lines("12abc -2.5e1x .5s 7.e 1.2.3"),
            Some(numbers(&[12.0, -25.0, 0.5, 7.0, 1.2]))
        );
    }

    #[test]
    fn test_tokens_without_leading_number_stay_strings() {
        assert_eq!(
            parse_lines("px3, inf, NaN, -, 1e999"),
            Some(Value::Sequence(vec![
                Value::from("px3"),
                Value::from("inf"),
                Value::from("NaN"),
                Value::from("-"),
                Value::from("1e999"),
            ]))
        );
    }
}
