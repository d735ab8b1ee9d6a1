//! The parser abstraction and its core combinators.
//!
//! A parser maps an input to `Outcome<(output, remaining input)>`. Parsers are
//! immutable values: every combinator builds a new parser around the ones it
//! is given, so a grammar can be composed once and reused for any number of
//! parses.
//!
//! Combinators that can fail after consuming input (sequences, `and_then`,
//! `filter`) run inside [`Input::transaction`], so a failed parse never leaves
//! a mutable input advanced. [`BoxedParser::commit`] opts out of that once a
//! branch is certain.

use std::ops::{BitOr, Shr};
use std::rc::Rc;

use crate::errors::ParseError;
use crate::input::Input;
use crate::outcome::Outcome;

type ParserFn<'p, I, O> = Rc<dyn Fn(I) -> Outcome<(O, I)> + 'p>;

pub trait Parser<I: Input, O> {
    fn parse(&self, input: I) -> Outcome<(O, I)>;
}

impl<I: Input, O, F: Fn(I) -> Outcome<(O, I)>> Parser<I, O> for F {
    fn parse(&self, input: I) -> Outcome<(O, I)> {
        self(input)
    }
}

// === Boxed Parser for type erasure ===

pub struct BoxedParser<'p, I, O> {
    parser: ParserFn<'p, I, O>,
}

impl<I, O> Clone for BoxedParser<'_, I, O> {
    fn clone(&self) -> Self {
        BoxedParser {
            parser: Rc::clone(&self.parser),
        }
    }
}

impl<'p, I: Input + 'p, O: 'p> BoxedParser<'p, I, O> {
    pub fn new<P: Parser<I, O> + 'p>(parser: P) -> Self {
        BoxedParser {
            parser: Rc::new(move |input| parser.parse(input)),
        }
    }
}

impl<I: Input, O> Parser<I, O> for BoxedParser<'_, I, O> {
    fn parse(&self, input: I) -> Outcome<(O, I)> {
        (self.parser)(input)
    }
}

// === Combinators as methods ===

impl<'p, I: Input + 'p, O: 'p> BoxedParser<'p, I, O> {
    /// Sequential composition: parse with `self`, build the next parser from
    /// its output, and run that on the remaining input.
    pub fn and_then<U: 'p, F>(self, next: F) -> BoxedParser<'p, I, U>
    where
        F: Fn(O) -> BoxedParser<'p, I, U> + 'p,
    {
        BoxedParser::new(move |input: I| {
            input.transaction(|input| {
                let (output, rest) = self.parse(input)?;
                next(output).parse(rest)
            })
        })
    }

    /// Transforms the output; the remaining input is untouched.
    pub fn map<U: 'p, F: Fn(O) -> U + 'p>(self, f: F) -> BoxedParser<'p, I, U> {
        BoxedParser::new(move |input: I| {
            let (output, rest) = self.parse(input)?;
            Ok((f(output), rest))
        })
    }

    /// Succeeds only when the output satisfies `predicate`.
    pub fn filter<P: Fn(&O) -> bool + 'p>(self, predicate: P) -> BoxedParser<'p, I, O> {
        BoxedParser::new(move |input: I| {
            input.transaction(|input| {
                let (output, rest) = self.parse(input)?;
                if predicate(&output) {
                    Ok((output, rest))
                } else {
                    Err(ParseError::NoMatchingElement)
                }
            })
        })
    }

    /// Tries `self`; on a recoverable failure, builds the alternative and runs
    /// it against the original input. If both fail, the alternative's failure
    /// is returned.
    ///
    /// Requires that a failed attempt leaves the input as it found it, which
    /// [`Input::attempt`] guarantees for every input kind in this crate.
    pub fn or_else<F>(self, alternative: F) -> BoxedParser<'p, I, O>
    where
        F: Fn() -> BoxedParser<'p, I, O> + 'p,
    {
        BoxedParser::new(move |input: I| match input.attempt(|i| self.parse(i)) {
            Ok(parsed) => Ok(parsed),
            Err(cause) if cause.is_recoverable() => alternative().parse(input),
            Err(cause) => Err(cause),
        })
    }

    /// Choice between two already-built parsers.
    pub fn or(self, other: BoxedParser<'p, I, O>) -> BoxedParser<'p, I, O> {
        self.or_else(move || other.clone())
    }

    /// On failure, fails with `message`, keeping the original failure as its cause.
    pub fn or_else_fail(self, message: impl Into<String>) -> BoxedParser<'p, I, O> {
        let message = message.into();
        BoxedParser::new(move |input: I| {
            self.parse(input)
                .map_err(|cause| ParseError::with_cause(message.clone(), cause))
        })
    }

    /// Sequence: parse self then other, return both outputs.
    pub fn seq<U: 'p>(self, other: BoxedParser<'p, I, U>) -> BoxedParser<'p, I, (O, U)> {
        BoxedParser::new(move |input: I| {
            input.transaction(|input| {
                let (a, rest) = self.parse(input)?;
                let (b, rest) = other.parse(rest)?;
                Ok(((a, b), rest))
            })
        })
    }

    /// Keep left: parse self then other, discard other's output.
    pub fn skip<U: 'p>(self, other: BoxedParser<'p, I, U>) -> BoxedParser<'p, I, O> {
        BoxedParser::new(move |input: I| {
            input.transaction(|input| {
                let (a, rest) = self.parse(input)?;
                let (_, rest) = other.parse(rest)?;
                Ok((a, rest))
            })
        })
    }

    /// Keep right: parse self then other, discard self's output.
    pub fn skip_left<U: 'p>(self, other: BoxedParser<'p, I, U>) -> BoxedParser<'p, I, U> {
        BoxedParser::new(move |input: I| {
            input.transaction(|input| {
                let (_, rest) = self.parse(input)?;
                other.parse(rest)
            })
        })
    }

    /// Commits to this branch: enclosing attempts give up their rollback
    /// points and any failure of `self` becomes fatal
    /// ([`ParseError::Committed`]), so no alternative is tried after it.
    ///
    /// Use it after a token that already decides the branch, such as an
    /// opening bracket. Over a stream this is what keeps a long construct from
    /// having to fit in the tokenizer's buffer.
    pub fn commit(self) -> BoxedParser<'p, I, O> {
        BoxedParser::new(move |input: I| {
            let position = input.position();
            input.commit();
            self.parse(input)
                .map_err(|cause| ParseError::committed(position, cause))
        })
    }
}

// === Operator Overloading ===

/// `|` for choice: A | B -> A or B
impl<'p, I: Input + 'p, O: 'p> BitOr<BoxedParser<'p, I, O>> for BoxedParser<'p, I, O> {
    type Output = BoxedParser<'p, I, O>;

    fn bitor(self, rhs: BoxedParser<'p, I, O>) -> Self::Output {
        self.or(rhs)
    }
}

/// `>>` for map: A >> fn -> B
impl<'p, I: Input + 'p, O: 'p, U: 'p, F: Fn(O) -> U + 'p> Shr<F> for BoxedParser<'p, I, O> {
    type Output = BoxedParser<'p, I, U>;

    fn shr(self, f: F) -> Self::Output {
        self.map(f)
    }
}

// === Primitive Parsers ===

/// Always succeeds with a copy of `value`, consuming nothing.
pub fn succeed<'p, I: Input + 'p, O: Clone + 'p>(value: O) -> BoxedParser<'p, I, O> {
    BoxedParser::new(move |input: I| Ok((value.clone(), input)))
}

/// Always fails with `message`, consuming nothing.
pub fn failure<'p, I: Input + 'p, O: 'p>(message: impl Into<String>) -> BoxedParser<'p, I, O> {
    let message = message.into();
    BoxedParser::new(move |_: I| Err(ParseError::failure(message.clone())))
}

/// Defers building a parser until parse time, for recursive grammars.
pub fn lazy<'p, I: Input + 'p, O: 'p, F>(build: F) -> BoxedParser<'p, I, O>
where
    F: Fn() -> BoxedParser<'p, I, O> + 'p,
{
    BoxedParser::new(move |input: I| build().parse(input))
}
