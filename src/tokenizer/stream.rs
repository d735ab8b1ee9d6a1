//! [`Tokenizer`] as a parser input.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::errors::ParseError;
use crate::input::{Input, PatternInput};
use crate::outcome::Outcome;
use crate::pattern::Pattern;

use super::{Source, Tokenizer};

/// A handle that lets combinators pull raw matches from a shared tokenizer.
///
/// Every copy of a stream drives the same tokenizer, so the position lives in
/// the tokenizer, not the handle. Backtracking works through
/// [`Input::attempt`], which marks the tokenizer before an attempt and resets
/// it if the attempt fails. While an attempt runs, the bytes it has read stay
/// buffered, so anything that may be rolled back has to fit in the tokenizer's
/// buffer; [`Input::commit`] lets those bytes go once a branch is certain.
/// The tokenizer's skip pattern is not applied;
/// grammars skip whitespace explicitly, as they do over a [`Cursor`](crate::Cursor).
pub struct TokenStream<'t, S> {
    tokenizer: &'t RefCell<Tokenizer<S>>,
    /// Attempts currently running on this stream and its copies.
    open: Rc<Cell<usize>>,
}

impl<'t, S: Source> TokenStream<'t, S> {
    pub fn new(tokenizer: &'t RefCell<Tokenizer<S>>) -> Self {
        Self {
            tokenizer,
            open: Rc::new(Cell::new(0)),
        }
    }
}

impl<S> Clone for TokenStream<'_, S> {
    fn clone(&self) -> Self {
        Self {
            tokenizer: self.tokenizer,
            open: Rc::clone(&self.open),
        }
    }
}

impl<S> fmt::Debug for TokenStream<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tokenizer.try_borrow() {
            Ok(tokenizer) => f.debug_tuple("TokenStream").field(&*tokenizer).finish(),
            Err(_) => f.write_str("TokenStream(<in use>)"),
        }
    }
}

impl<S: Source> Input for TokenStream<'_, S> {
    fn position(&self) -> usize {
        self.tokenizer.borrow().position()
    }

    fn attempt<T, F>(&self, attempt: F) -> Outcome<(T, Self)>
    where
        F: FnOnce(Self) -> Outcome<(T, Self)>,
    {
        let mark = self.tokenizer.borrow_mut().mark();
        self.open.set(self.open.get() + 1);
        let result = attempt(self.clone());
        self.open.set(self.open.get() - 1);
        let mut tokenizer = self.tokenizer.borrow_mut();
        if !tokenizer.is_held(mark) {
            // Committed inside the attempt; there is nothing to go back to.
            let position = tokenizer.position();
            return result.map_err(|cause| ParseError::committed(position, cause));
        }
        let restored = match &result {
            Err(_) => tokenizer.reset(mark),
            Ok(_) => Ok(()),
        };
        tokenizer.release(mark);
        restored?;
        result
    }

    /// Only the outermost step takes a mark. Nested steps are covered by it,
    /// or sit past a commit where nothing is rolled back.
    fn transaction<T, F>(&self, run: F) -> Outcome<(T, Self)>
    where
        F: FnOnce(Self) -> Outcome<(T, Self)>,
    {
        if self.open.get() > 0 {
            run(self.clone())
        } else {
            self.attempt(run)
        }
    }

    fn commit(&self) {
        self.tokenizer.borrow_mut().commit();
    }
}

impl<S: Source> PatternInput for TokenStream<'_, S> {
    fn match_pattern(&self, pattern: &Pattern) -> Outcome<(String, Self)> {
        let token = self
            .tokenizer
            .borrow_mut()
            .raw_next(pattern)
            .map_err(ParseError::from)?;
        Ok((token, self.clone()))
    }
}
