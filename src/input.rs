//! Input kinds a parser can run against.
//!
//! The combinators assume that a failed attempt leaves no trace on the input.
//! Immutable inputs such as [`Cursor`] get that for free. Inputs over mutable
//! state (see [`TokenStream`](crate::tokenizer::TokenStream)) make it explicit
//! through [`Input::attempt`], which snapshots the position before running an
//! attempt and restores it if the attempt fails. [`Input::commit`] gives up
//! those snapshots once a grammar knows which branch it is in.

use std::fmt;

use crate::errors::ParseError;
use crate::outcome::Outcome;
use crate::pattern::{MatchStatus, Pattern};

pub trait Input: Clone {
    /// Byte offset of the next unconsumed character since the start of the session.
    fn position(&self) -> usize;

    /// Runs `attempt` on a copy of this input. If it fails, any consumption
    /// it made is rolled back before the failure is returned.
    fn attempt<T, F>(&self, attempt: F) -> Outcome<(T, Self)>
    where
        F: FnOnce(Self) -> Outcome<(T, Self)>;

    /// Runs a step that may fail after consuming input, with the same rollback
    /// guarantee as [`attempt`](Self::attempt). Inputs may skip the snapshot
    /// when an enclosing attempt already covers the step.
    fn transaction<T, F>(&self, run: F) -> Outcome<(T, Self)>
    where
        F: FnOnce(Self) -> Outcome<(T, Self)>,
    {
        run(self.clone())
    }

    /// Gives up the rollback points of every enclosing attempt. An enclosing
    /// attempt that then fails leaves the input where the failure happened and
    /// reports it as fatal. A no-op for inputs that never need rolling back.
    fn commit(&self) {}
}

/// An input that can apply a pattern at its current position.
///
/// Implementations must not advance on failure.
pub trait PatternInput: Input {
    fn match_pattern(&self, pattern: &Pattern) -> Outcome<(String, Self)>;
}

/// Immutable position within in-memory text.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Cursor<'a> {
    text: &'a str,
    position: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, position: 0 }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn remaining(&self) -> &'a str {
        self.text.get(self.position..).unwrap_or_default()
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.text.len()
    }
}

impl fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("position", &self.position)
            .field("remaining", &self.remaining())
            .finish()
    }
}

impl Input for Cursor<'_> {
    fn position(&self) -> usize {
        self.position
    }

    fn attempt<T, F>(&self, attempt: F) -> Outcome<(T, Self)>
    where
        F: FnOnce(Self) -> Outcome<(T, Self)>,
    {
        attempt(*self)
    }
}

impl PatternInput for Cursor<'_> {
    fn match_pattern(&self, pattern: &Pattern) -> Outcome<(String, Self)> {
        match pattern.match_at(self.text.as_bytes(), self.position, true)? {
            MatchStatus::Matched(end) => match self.text.get(self.position..end) {
                Some(matched) => Ok((
                    matched.to_string(),
                    Self {
                        text: self.text,
                        position: end,
                    },
                )),
                None => Err(ParseError::expected(pattern.as_str(), self.position)),
            },
            MatchStatus::NeedsInput | MatchStatus::NoMatch => {
                Err(ParseError::expected(pattern.as_str(), self.position))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_advances_a_copy() {
        let start = Cursor::new("abc123");
        let letters = Pattern::new("[a-z]+").unwrap();
        let (matched, rest) = start.match_pattern(&letters).unwrap();
        assert_eq!(matched, "abc");
        assert_eq!(rest.position(), 3);
        assert_eq!(rest.remaining(), "123");
        assert_eq!(start.position(), 0);
    }

    #[test]
    fn mismatch_reports_pattern_and_position() {
        let cursor = Cursor::new("123");
        let letters = Pattern::new("[a-z]+").unwrap();
        let err = cursor.match_pattern(&letters).unwrap_err();
        assert_eq!(err.to_string(), "[a-z]+ expected at position 0");
    }

    #[test]
    fn end_of_text_is_end_of_input() {
        let cursor = Cursor::new("ab");
        let end = Pattern::new(r"ab\z").unwrap();
        let (_, rest) = cursor.match_pattern(&end).unwrap();
        assert!(rest.is_at_end());
    }
}
