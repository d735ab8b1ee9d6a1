//! Regex-driven primitive parsers for any [`PatternInput`].

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::errors::{ParseError, PatternError};
use crate::input::PatternInput;
use crate::parser::BoxedParser;
use crate::pattern::Pattern;

static WHITESPACE: Lazy<Result<Arc<Pattern>, PatternError>> =
    Lazy::new(|| Pattern::new(r"\s*").map(Arc::new));

static END_OF_INPUT: Lazy<Result<Arc<Pattern>, PatternError>> =
    Lazy::new(|| Pattern::new(r"\z").map(Arc::new));

/// The shared `\s*` pattern.
pub fn whitespace() -> Result<Arc<Pattern>, PatternError> {
    WHITESPACE.clone()
}

/// Matches `regex` at the current position and yields the matched text.
///
/// An invalid `regex` yields a parser that always fails with the
/// non-recoverable [`PatternError`]; use [`try_pattern`] to reject it while
/// building the grammar instead.
pub fn pattern<'p, I: PatternInput + 'p>(regex: &str) -> BoxedParser<'p, I, String> {
    compiled(Pattern::new(regex).map(Arc::new))
}

pub fn try_pattern<'p, I: PatternInput + 'p>(
    regex: &str,
) -> Result<BoxedParser<'p, I, String>, PatternError> {
    Ok(pattern_of(Arc::new(Pattern::new(regex)?)))
}

/// Matches an already-compiled pattern.
pub fn pattern_of<'p, I: PatternInput + 'p>(pattern: Arc<Pattern>) -> BoxedParser<'p, I, String> {
    BoxedParser::new(move |input: I| input.match_pattern(&pattern))
}

/// Matches `text` verbatim.
pub fn literal<'p, I: PatternInput + 'p>(text: &str) -> BoxedParser<'p, I, String> {
    compiled(Pattern::literal(text).map(Arc::new))
}

/// Skips leading whitespace, then runs `parser`.
pub fn trim<'p, I: PatternInput + 'p, O: 'p>(parser: BoxedParser<'p, I, O>) -> BoxedParser<'p, I, O> {
    compiled(whitespace()).skip_left(parser)
}

/// `pattern(regex)` after optional leading whitespace.
pub fn token<'p, I: PatternInput + 'p>(regex: &str) -> BoxedParser<'p, I, String> {
    trim(pattern(regex))
}

/// Succeeds, consuming nothing, only when no input remains.
pub fn end_of_input<'p, I: PatternInput + 'p>() -> BoxedParser<'p, I, ()> {
    compiled(END_OF_INPUT.clone()).map(|_| ())
}

/// Wraps a compile result; a failed compile becomes an always-failing parser.
pub(crate) fn compiled<'p, I: PatternInput + 'p>(
    result: Result<Arc<Pattern>, PatternError>,
) -> BoxedParser<'p, I, String> {
    match result {
        Ok(pattern) => pattern_of(pattern),
        Err(err) => BoxedParser::new(move |_: I| Err(ParseError::Pattern(err.clone()))),
    }
}
