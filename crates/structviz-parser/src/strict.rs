//! Strict parser for the JSON value grammar.
//!
//! The grammar is parsed directly from the source `&str` with winnow
//! combinators. Failures carry [`Context`] entries which [`convert_error`]
//! turns into a [`Diagnostic`] with a span into the source.

use winnow::{
    Parser as _,
    ascii::{digit0, digit1},
    combinator::{alt, cut_err, delimited, opt, preceded, repeat, separated, terminated},
    error::{ContextError, ErrMode},
    stream::Stream,
    token::{none_of, one_of, take_while},
};

use structviz_core::value::{Mapping, Value};

use crate::{
    error::{Diagnostic, ErrorCode, Result},
    span::Span,
};

/// Maximum nesting of sequences and mappings.
const MAX_DEPTH: usize = 128;

/// Context type for parser errors
#[derive(Debug, Clone, PartialEq, Eq)]
enum Context {
    /// Description of what was expected at the failure position
    Expected(&'static str),
    /// Error code of a committed failure
    Code(ErrorCode),
    /// Remaining input length (`eof_offset()`) where the failing construct started
    StartOffset(usize),
}

type Input<'src> = &'src str;
type IResult<O> = std::result::Result<O, ErrMode<ContextError<Context>>>;

/// Helper to create a Cut error carrying the given contexts
fn cut_error(contexts: impl IntoIterator<Item = Context>) -> ErrMode<ContextError<Context>> {
    let mut e = ContextError::new();
    for ctx in contexts {
        e.push(ctx);
    }
    ErrMode::Cut(e)
}

/// Parse insignificant whitespace
fn ws(input: &mut Input<'_>) -> IResult<()> {
    take_while(0.., [' ', '\t', '\n', '\r'])
        .void()
        .parse_next(input)
}

/// Digits that must follow a `.` or an exponent marker
fn required_digits<'src>(input: &mut Input<'src>) -> IResult<&'src str> {
    cut_err(digit1)
        .context(Context::Code(ErrorCode::E005))
        .parse_next(input)
}

/// Parse a number: `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?`
fn number(input: &mut Input<'_>) -> IResult<Value> {
    let start = input.eof_offset();
    (
        opt('-'),
        alt(('0'.void(), (one_of('1'..='9'), digit0).void())),
        opt(preceded('.', required_digits)),
        opt((
            one_of(['e', 'E']),
            opt(one_of(['+', '-'])),
            required_digits,
        )),
    )
        .take()
        .verify_map(|literal: &str| literal.parse::<f64>().ok())
        .map(Value::Number)
        .context(Context::StartOffset(start))
        .parse_next(input)
}

/// Parse `true`, `false` or `null`
fn keyword(input: &mut Input<'_>) -> IResult<Value> {
    alt((
        "true".value(Value::Boolean(true)),
        "false".value(Value::Boolean(false)),
        "null".value(Value::Null),
    ))
    .parse_next(input)
}

/// Parse exactly four hex digits of a `\u` escape
fn hex4(input: &mut Input<'_>) -> IResult<u32> {
    take_while(4, |c: char| c.is_ascii_hexdigit())
        .verify_map(|hex: &str| u32::from_str_radix(hex, 16).ok())
        .parse_next(input)
}

/// Parse the code unit(s) after `\u`, combining surrogate pairs.
///
/// Unpaired surrogates decode to U+FFFD.
fn unicode_escape(input: &mut Input<'_>) -> IResult<char> {
    let unit = hex4
        .context(Context::Code(ErrorCode::E004))
        .parse_next(input)?;

    if (0xD800..0xDC00).contains(&unit) {
        let low = opt(preceded("\\u", hex4).verify(|low: &u32| (0xDC00..0xE000).contains(low)))
            .parse_next(input)?;
        if let Some(low) = low {
            let combined = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
            return Ok(char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER));
        }
    }

    Ok(char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER))
}

/// Parse an escape sequence starting with a backslash
fn escape(input: &mut Input<'_>) -> IResult<char> {
    let start = input.eof_offset();
    preceded(
        '\\',
        cut_err(alt((
            one_of(['"', '\\', '/', 'b', 'f', 'n', 'r', 't']).map(|c| match c {
                'b' => '\u{08}',
                'f' => '\u{0C}',
                'n' => '\n',
                'r' => '\r',
                't' => '\t',
                other => other,
            }),
            preceded('u', unicode_escape),
        ))),
    )
    .context(Context::Code(ErrorCode::E003))
    .context(Context::StartOffset(start))
    .parse_next(input)
}

/// Parse a double-quoted string literal
fn string_literal(input: &mut Input<'_>) -> IResult<String> {
    let start = input.eof_offset();
    // Raw control characters are not allowed inside strings
    let plain = none_of(|c: char| c == '"' || c == '\\' || c < ' ');

    preceded(
        '"',
        cut_err(terminated(
            repeat(0.., alt((escape, plain))).fold(String::new, |mut acc, c| {
                acc.push(c);
                acc
            }),
            '"',
        ))
        .context(Context::Code(ErrorCode::E001)),
    )
    .context(Context::StartOffset(start))
    .parse_next(input)
}

/// Parse `[ value, ... ]`
fn sequence<'src>(input: &mut Input<'src>, depth: usize) -> IResult<Value> {
    let start = input.eof_offset();
    let element = move |input: &mut Input<'src>| value(input, depth + 1);

    preceded(
        '[',
        cut_err(terminated(
            preceded(ws, separated(0.., element, ',')),
            ']'.context(Context::Expected("`,` or `]`")),
        )),
    )
    .map(Value::Sequence)
    .context(Context::StartOffset(start))
    .parse_next(input)
}

/// Parse a single `"key": value` entry of a mapping
fn entry<'src>(input: &mut Input<'src>, depth: usize) -> IResult<(String, Value)> {
    let element = move |input: &mut Input<'src>| value(input, depth + 1);

    (
        delimited(ws, string_literal, ws),
        cut_err(preceded(
            ':'.context(Context::Expected("`:` after the key")),
            element,
        )),
    )
        .parse_next(input)
}

/// Parse `{ "key": value, ... }`
///
/// Duplicate keys keep their first position and their last value.
fn mapping<'src>(input: &mut Input<'src>, depth: usize) -> IResult<Value> {
    let start = input.eof_offset();
    let member = move |input: &mut Input<'src>| entry(input, depth);

    preceded(
        '{',
        cut_err(terminated(
            preceded(ws, separated(0.., member, ',')),
            preceded(ws, '}').context(Context::Expected("`,` or `}`")),
        )),
    )
    .map(|entries: Vec<(String, Value)>| Value::Mapping(entries.into_iter().collect::<Mapping>()))
    .context(Context::StartOffset(start))
    .parse_next(input)
}

/// Parse any value surrounded by optional whitespace
fn value<'src>(input: &mut Input<'src>, depth: usize) -> IResult<Value> {
    if depth > MAX_DEPTH {
        return Err(cut_error([
            Context::Code(ErrorCode::E104),
            Context::StartOffset(input.eof_offset()),
        ]));
    }

    delimited(
        ws,
        alt((
            move |input: &mut Input<'src>| mapping(input, depth),
            move |input: &mut Input<'src>| sequence(input, depth),
            string_literal.map(Value::String),
            number,
            keyword,
        ))
        .context(Context::Expected("a value")),
        ws,
    )
    .parse_next(input)
}

/// Help text shown for committed failures
fn help_for(code: ErrorCode) -> Option<&'static str> {
    match code {
        ErrorCode::E001 => Some("add a closing `\"` before the end of the line"),
        ErrorCode::E003 => Some(
            "valid escapes: `\\\"`, `\\\\`, `\\/`, `\\b`, `\\f`, `\\n`, `\\r`, `\\t`, `\\uXXXX`",
        ),
        ErrorCode::E004 => Some("use `\\u` followed by four hex digits, e.g. `\\u00e9`"),
        ErrorCode::E005 => Some("add digits after the `.` or exponent marker"),
        ErrorCode::E104 => Some("flatten the structure"),
        _ => None,
    }
}

/// Byte length of the character at `offset`, or `0` at the end of input
fn char_len_at(source: &str, offset: usize) -> usize {
    source
        .get(offset..)
        .and_then(|rest| rest.chars().next())
        .map_or(0, char::len_utf8)
}

/// Secondary label describing the construct opened at `start`
fn opened_here(source: &str, start: usize) -> Option<&'static str> {
    match source.get(start..)?.chars().next()? {
        '[' => Some("sequence opened here"),
        '{' => Some("mapping opened here"),
        '"' => Some("string starts here"),
        _ => None,
    }
}

/// Convert winnow errors to a Diagnostic
///
/// Extracts the innermost error code, expectation and start offset from the
/// error context and computes the span from the remaining input length.
fn convert_error(error: ErrMode<ContextError<Context>>, source: &str, remaining: usize) -> Diagnostic {
    let end = source.len() - remaining;
    let contexts: Vec<Context> = match &error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e.context().cloned().collect(),
        ErrMode::Incomplete(_) => Vec::new(),
    };

    let start = contexts.iter().find_map(|ctx| match ctx {
        Context::StartOffset(n) => Some(source.len() - n),
        _ => None,
    });
    let code = contexts.iter().find_map(|ctx| match ctx {
        Context::Code(code) => Some(*code),
        _ => None,
    });
    let expected = contexts
        .iter()
        .find_map(|ctx| match ctx {
            Context::Expected(label) => Some(*label),
            _ => None,
        })
        .unwrap_or("a value");

    if let Some(code) = code {
        let start = start.unwrap_or(end).min(end);
        let span = Span::new(start..end.max(start + char_len_at(source, start)));
        let mut diag = Diagnostic::error(code.description())
            .with_code(code)
            .with_label(span, code.description());
        if let Some(help) = help_for(code) {
            diag = diag.with_help(help);
        }
        return diag;
    }

    let diag = match source[end..].chars().next() {
        None => Diagnostic::error(format!("unexpected end of input, expected {expected}"))
            .with_code(ErrorCode::E101)
            .with_label(Span::new(end..end), "input ends here"),
        Some(found) => {
            let code = if expected == "a value" {
                ErrorCode::E002
            } else {
                ErrorCode::E100
            };
            Diagnostic::error(format!(
                "expected {expected}, found `{}`",
                found.escape_debug()
            ))
            .with_code(code)
            .with_label(Span::new(end..end + found.len_utf8()), code.description())
        }
    };

    match start.filter(|start| *start < end) {
        Some(start) => match opened_here(source, start) {
            Some(label) => diag.with_secondary_label(Span::new(start..start + 1), label),
            None => diag,
        },
        None => diag,
    }
}

/// Parse `source` as exactly one value, surrounded by optional whitespace.
pub(crate) fn parse_value(source: &str) -> Result<Value> {
    let mut input = source;

    match value(&mut input, 0) {
        Ok(parsed) if input.is_empty() => Ok(parsed),
        Ok(_) => {
            let offset = source.len() - input.len();
            Err(Diagnostic::error("trailing characters after value")
                .with_code(ErrorCode::E102)
                .with_label(Span::new(offset..source.len()), "unexpected trailing input")
                .with_help("only one top-level value is allowed"))
        }
        Err(e) => Err(convert_error(e, source, input.len())),
    }
}
