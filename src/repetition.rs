//! Repetition and bracketing combinators.
//!
//! Everything here is derived from the core combinators' contract: parse,
//! thread the remaining input, and backtrack through [`Input::attempt`].
//! Repetition runs as an explicit loop, so the number of matches is not bounded
//! by stack depth. Outputs always keep left-to-right match order.
//!
//! A repeated parser that succeeds without consuming anything contributes one
//! item and then ends the repetition.

use crate::errors::ParseError;
use crate::input::Input;
use crate::outcome::Outcome;
use crate::parser::{BoxedParser, Parser};

/// Attempts `parser` up to `max` more times, appending to `items`.
/// Returns the input after the last success.
fn repeat_into<I: Input, O>(
    parser: &BoxedParser<'_, I, O>,
    mut input: I,
    max: Option<usize>,
    items: &mut Vec<O>,
) -> Outcome<I> {
    let mut taken = 0;
    while max.map_or(true, |max| taken < max) {
        let before = input.position();
        match input.attempt(|i| parser.parse(i)) {
            Ok((item, rest)) => {
                items.push(item);
                taken += 1;
                let stalled = rest.position() == before;
                input = rest;
                if stalled {
                    break;
                }
            }
            Err(cause) if cause.is_recoverable() => break,
            Err(cause) => return Err(cause),
        }
    }
    Ok(input)
}

/// Zero or one occurrence; absence consumes nothing.
pub fn zero_or_one<'p, I: Input + 'p, O: 'p>(
    parser: BoxedParser<'p, I, O>,
) -> BoxedParser<'p, I, Option<O>> {
    BoxedParser::new(move |input: I| match input.attempt(|i| parser.parse(i)) {
        Ok((item, rest)) => Ok((Some(item), rest)),
        Err(cause) if cause.is_recoverable() => Ok((None, input)),
        Err(cause) => Err(cause),
    })
}

/// Zero or more occurrences. Never fails on a mismatch.
pub fn zero_or_more<'p, I: Input + 'p, O: 'p>(
    parser: BoxedParser<'p, I, O>,
) -> BoxedParser<'p, I, Vec<O>> {
    BoxedParser::new(move |input: I| {
        let mut items = Vec::new();
        let rest = repeat_into(&parser, input, None, &mut items)?;
        Ok((items, rest))
    })
}

/// One or more occurrences; fails with the first attempt's cause if there is none.
pub fn one_or_more<'p, I: Input + 'p, O: 'p>(
    parser: BoxedParser<'p, I, O>,
) -> BoxedParser<'p, I, Vec<O>> {
    at_least(parser, 1)
}

/// Exactly `count` occurrences in a row. `count == 0` yields an empty sequence.
pub fn exactly<'p, I: Input + 'p, O: 'p>(
    parser: BoxedParser<'p, I, O>,
    count: usize,
) -> BoxedParser<'p, I, Vec<O>> {
    BoxedParser::new(move |input: I| {
        input.transaction(|mut input| {
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                let (item, rest) = parser.parse(input)?;
                items.push(item);
                input = rest;
            }
            Ok((items, input))
        })
    })
}

/// `count` occurrences followed by as many more as match.
pub fn at_least<'p, I: Input + 'p, O: 'p>(
    parser: BoxedParser<'p, I, O>,
    count: usize,
) -> BoxedParser<'p, I, Vec<O>> {
    let required = exactly(parser.clone(), count);
    BoxedParser::new(move |input: I| {
        let (mut items, rest) = required.parse(input)?;
        let rest = repeat_into(&parser, rest, None, &mut items)?;
        Ok((items, rest))
    })
}

/// As many occurrences as match, up to `to`, but never fewer than `from`.
///
/// # Errors
/// Returns [`ParseError::InvalidArgument`] when `from > to`.
pub fn between<'p, I: Input + 'p, O: 'p>(
    parser: BoxedParser<'p, I, O>,
    from: usize,
    to: usize,
) -> Result<BoxedParser<'p, I, Vec<O>>, ParseError> {
    if from > to {
        return Err(ParseError::invalid_argument(format!(
            "between: lower bound {from} exceeds upper bound {to}"
        )));
    }
    let required = exactly(parser.clone(), from);
    Ok(BoxedParser::new(move |input: I| {
        let (mut items, rest) = required.parse(input)?;
        let rest = repeat_into(&parser, rest, Some(to - from), &mut items)?;
        Ok((items, rest))
    }))
}

/// One or more `parser` occurrences separated by `separator`, whose output is dropped.
pub fn separated_by_one_or_more<'p, I: Input + 'p, O: 'p, S: 'p>(
    parser: BoxedParser<'p, I, O>,
    separator: BoxedParser<'p, I, S>,
) -> BoxedParser<'p, I, Vec<O>> {
    separated(parser, separator, true)
}

/// Like [`separated_by_one_or_more`], but an absent first item yields an empty sequence.
pub fn separated_by_zero_or_more<'p, I: Input + 'p, O: 'p, S: 'p>(
    parser: BoxedParser<'p, I, O>,
    separator: BoxedParser<'p, I, S>,
) -> BoxedParser<'p, I, Vec<O>> {
    separated(parser, separator, false)
}

// Each attempt covers one item (or one separator and item), never the whole list.
fn separated<'p, I: Input + 'p, O: 'p, S: 'p>(
    parser: BoxedParser<'p, I, O>,
    separator: BoxedParser<'p, I, S>,
    required: bool,
) -> BoxedParser<'p, I, Vec<O>> {
    let tail = separator.skip_left(parser.clone());
    BoxedParser::new(move |input: I| {
        let (first, rest) = match input.attempt(|i| parser.parse(i)) {
            Ok(parsed) => parsed,
            Err(cause) if !required && cause.is_recoverable() => return Ok((Vec::new(), input)),
            Err(cause) => return Err(cause),
        };
        let mut items = vec![first];
        let rest = repeat_into(&tail, rest, None, &mut items)?;
        Ok((items, rest))
    })
}

/// `begin`, then `parser`, then `end`; only `parser`'s output surfaces.
pub fn surrounded_with<'p, I: Input + 'p, O: 'p, B: 'p, E: 'p>(
    parser: BoxedParser<'p, I, O>,
    begin: BoxedParser<'p, I, B>,
    end: BoxedParser<'p, I, E>,
) -> BoxedParser<'p, I, O> {
    begin.skip_left(parser).skip(end)
}
