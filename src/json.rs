//! JSON grammar built from the combinators.
//!
//! Works over any [`PatternInput`], so the same grammar reads from a string
//! through [`Cursor`] or from a stream through [`TokenStream`]. Values come
//! back as [`serde_json::Value`].

use std::cell::RefCell;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde_json::{Map, Number, Value};

use crate::errors::PatternError;
use crate::input::{Cursor, PatternInput};
use crate::lexical::{compiled, end_of_input, trim};
use crate::outcome::Outcome;
use crate::parser::{failure, lazy, succeed, BoxedParser, Parser};
use crate::pattern::Pattern;
use crate::repetition::separated_by_zero_or_more;
use crate::tokenizer::{Source, TokenStream, Tokenizer};

type Compiled = Lazy<Result<Arc<Pattern>, PatternError>>;

macro_rules! token_pattern {
    ($name:ident, $regex:expr) => {
        static $name: Compiled = Lazy::new(|| Pattern::new($regex).map(Arc::new));
    };
}

token_pattern!(NULL, "null");
token_pattern!(BOOLEAN, "true|false");
token_pattern!(NUMBER, r"-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?");
token_pattern!(STRING, r#""([^"\\]|\\.)*""#);
token_pattern!(COMMA, ",");
token_pattern!(COLON, ":");
token_pattern!(OPEN_BRACKET, r"\[");
token_pattern!(CLOSE_BRACKET, r"\]");
token_pattern!(OPEN_BRACE, r"\{");
token_pattern!(CLOSE_BRACE, r"\}");

fn token<'p, I: PatternInput + 'p>(pattern: &Compiled) -> BoxedParser<'p, I, String> {
    trim(compiled(Lazy::force(pattern).clone()))
}

pub fn null<'p, I: PatternInput + 'p>() -> BoxedParser<'p, I, Value> {
    token(&NULL).map(|_| Value::Null)
}

pub fn boolean<'p, I: PatternInput + 'p>() -> BoxedParser<'p, I, Value> {
    token(&BOOLEAN).map(|text| Value::Bool(text == "true"))
}

/// Integers stay integers; anything with a fraction or exponent is a float.
pub fn number<'p, I: PatternInput + 'p>() -> BoxedParser<'p, I, Value> {
    token(&NUMBER).and_then(|text| match text.parse::<Number>() {
        Ok(number) => succeed(Value::Number(number)),
        Err(err) => failure(format!("invalid number `{text}`: {err}")),
    })
}

/// A quoted string with JSON escapes resolved.
pub fn string<'p, I: PatternInput + 'p>() -> BoxedParser<'p, I, String> {
    token(&STRING).and_then(|text| match serde_json::from_str::<String>(&text) {
        Ok(unescaped) => succeed(unescaped),
        Err(err) => failure(format!("invalid string {text}: {err}")),
    })
}

/// Once `[` has matched the input can only be an array, so the rest is committed.
pub fn array<'p, I: PatternInput + 'p>() -> BoxedParser<'p, I, Value> {
    let elements = separated_by_zero_or_more(lazy(value), token(&COMMA));
    token(&OPEN_BRACKET)
        .skip_left(elements.skip(token(&CLOSE_BRACKET)).commit())
        .map(Value::Array)
}

fn property<'p, I: PatternInput + 'p>() -> BoxedParser<'p, I, (String, Value)> {
    string().seq(token(&COLON).skip_left(lazy(value)))
}

/// Later duplicate keys replace earlier ones. Committed after `{`, like [`array`].
pub fn object<'p, I: PatternInput + 'p>() -> BoxedParser<'p, I, Value> {
    let properties = separated_by_zero_or_more(property(), token(&COMMA));
    token(&OPEN_BRACE)
        .skip_left(properties.skip(token(&CLOSE_BRACE)).commit())
        .map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>()))
}

/// Any JSON value, after optional leading whitespace.
///
/// Every alternative is decided by its first token. Containers commit right
/// after their opening bracket, so over a [`TokenStream`] the buffer only ever
/// has to hold a few tokens, however large the document.
pub fn value<'p, I: PatternInput + 'p>() -> BoxedParser<'p, I, Value> {
    null()
        | boolean()
        | number()
        | string().map(Value::String)
        | object()
        | array()
}

/// A whole document: one value, surrounded by nothing but whitespace.
pub fn document<'p, I: PatternInput + 'p>() -> BoxedParser<'p, I, Value> {
    value().skip(trim(end_of_input()))
}

pub fn parse_str(text: &str) -> Outcome<Value> {
    document().parse(Cursor::new(text)).map(|(value, _)| value)
}

/// Parses one document from a tokenizer, reading only as far as it needs.
///
/// A failure before the first container opens leaves the tokenizer where it
/// started. Past that point the failure is [`ParseError::Committed`] and the
/// tokenizer stays where the parse stopped.
///
/// [`ParseError::Committed`]: crate::ParseError::Committed
pub fn parse_tokens<S: Source>(tokenizer: &RefCell<Tokenizer<S>>) -> Outcome<Value> {
    document()
        .parse(TokenStream::new(tokenizer))
        .map(|(value, _)| value)
}
