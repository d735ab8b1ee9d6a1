//! Streaming tokenizer.
//!
//! Turns a [`Source`] into tokens matched against patterns, holding at most
//! `buffer_capacity` bytes at a time. A match that runs into the end of the
//! buffered bytes is provisional: the tokenizer compacts, reads more, and
//! retries it from scratch until it settles, the source ends, or the pending
//! token fills the whole buffer.
//!
//! A tokenizer is single-owner state. It does no locking; sharing one between
//! threads is the caller's problem.

mod buffer;
mod source;
mod stream;

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::config::{self, TokenizerConfig};
use crate::errors::{NoSuchElement, ParseError, TokenError};
use crate::pattern::{MatchStatus, Pattern, PatternCache};

use buffer::TokenBuffer;
pub use source::{ReadSource, ReadStatus, Source};
pub use stream::TokenStream;

/// Lifecycle of a [`Tokenizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Nothing has been read yet.
    Uninitialized,
    Ready,
    /// The last match attempt ran out of buffered bytes.
    NeedsInput,
    Closed,
}

/// A saved tokenizer position. Bytes from a held mark on are never compacted away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mark {
    id: u64,
    offset: usize,
}

impl Mark {
    pub fn offset(&self) -> usize {
        self.offset
    }
}

pub struct Tokenizer<S> {
    source: S,
    buffer: TokenBuffer,
    state: State,
    exhausted: bool,
    cache: PatternCache,
    skip: Option<Arc<Pattern>>,
}

impl<S: Source> Tokenizer<S> {
    /// A tokenizer with the default buffer and cache sizes that skips whitespace.
    ///
    /// The default skip pattern is a constant that always compiles
    /// (`default_skip_pattern_is_cached` checks it). Should that ever break,
    /// the tokenizer logs a warning and runs without skipping.
    pub fn new(source: S) -> Self {
        let mut cache = PatternCache::new(config::DEFAULT_CACHE_CAPACITY);
        let skip = match cache.get_or_compile(config::DEFAULT_SKIP_PATTERN) {
            Ok(pattern) => Some(pattern),
            Err(err) => {
                warn!(target: "braid::tokenizer", error = %err, "default skip pattern rejected");
                None
            }
        };
        Self {
            source,
            buffer: TokenBuffer::new(config::DEFAULT_BUFFER_CAPACITY),
            state: State::Uninitialized,
            exhausted: false,
            cache,
            skip,
        }
    }

    /// Builds a tokenizer from `config`, compiling its skip pattern up front.
    pub fn with_config(source: S, config: &TokenizerConfig) -> Result<Self, ParseError> {
        config.validate()?;
        let mut cache = PatternCache::new(config.cache_capacity);
        let skip = match &config.skip_pattern {
            Some(regex) => Some(cache.get_or_compile(regex)?),
            None => None,
        };
        Ok(Self {
            source,
            buffer: TokenBuffer::new(config.buffer_capacity),
            state: State::Uninitialized,
            exhausted: false,
            cache,
            skip,
        })
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Absolute byte offset of the next unconsumed byte.
    pub fn position(&self) -> usize {
        self.buffer.position()
    }

    pub fn cache(&self) -> &PatternCache {
        &self.cache
    }

    /// Replaces the skip pattern; `None` disables skipping. Applies from the next call.
    pub fn use_skip_pattern(&mut self, pattern: Option<Arc<Pattern>>) {
        self.skip = pattern;
    }

    pub fn use_skip_regex(&mut self, regex: &str) -> Result<(), TokenError> {
        self.skip = Some(self.cache.get_or_compile(regex)?);
        Ok(())
    }

    /// Skips, then matches `regex` (compiled through the pattern cache).
    pub fn next(&mut self, regex: &str) -> Result<String, TokenError> {
        let pattern = self.cache.get_or_compile(regex)?;
        self.next_pattern(&pattern)
    }

    /// Skips, then matches an already-compiled pattern.
    pub fn next_pattern(&mut self, pattern: &Pattern) -> Result<String, TokenError> {
        self.skip()?;
        self.raw_next(pattern)
    }

    /// Matches `pattern` at the cursor without skipping first.
    ///
    /// # Errors
    /// - [`TokenError::InputMismatch`] when unconsumed input remains but does
    ///   not match.
    /// - [`TokenError::NoSuchElement`] when the tokenizer is closed, the input
    ///   is exhausted, or the pending token cannot fit in the buffer.
    /// - [`TokenError::Io`] when the source fails.
    pub fn raw_next(&mut self, pattern: &Pattern) -> Result<String, TokenError> {
        let end = self.find(pattern)?;
        let token = self.buffer.take(end)?;
        trace!(target: "braid::tokenizer", pattern = %pattern, token = %token, "matched");
        Ok(token)
    }

    /// Whether `next(regex)` would succeed. Reads as needed but consumes nothing
    /// beyond what skipping consumes.
    pub fn has_next(&mut self, regex: &str) -> Result<bool, TokenError> {
        let pattern = self.cache.get_or_compile(regex)?;
        self.skip()?;
        match self.find(&pattern) {
            Ok(_) => Ok(true),
            Err(err) if err.is_recoverable() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Closes the tokenizer and its source. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<(), TokenError> {
        if self.state == State::Closed {
            return Ok(());
        }
        self.state = State::Closed;
        debug!(target: "braid::tokenizer", position = self.position(), "closing");
        self.source.close()?;
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.state == State::Closed
    }

    /// Saves the current position. Pair every mark with a [`release`](Self::release).
    pub fn mark(&mut self) -> Mark {
        let (id, offset) = self.buffer.mark();
        Mark { id, offset }
    }

    /// Whether `mark` is still outstanding, i.e. neither released nor dropped by [`commit`](Self::commit).
    pub fn is_held(&self, mark: Mark) -> bool {
        self.buffer.holds(mark.id)
    }

    /// Returns to a saved position. Failed attempts use this to undo their matches.
    ///
    /// # Errors
    /// [`TokenError::StaleMark`] if the mark is no longer held.
    pub fn reset(&mut self, mark: Mark) -> Result<(), TokenError> {
        if !self.is_held(mark) {
            return Err(TokenError::StaleMark {
                offset: mark.offset,
            });
        }
        self.buffer.reset(mark.offset)
    }

    /// Stops holding `mark`. Returns false if it was already released or committed past.
    pub fn release(&mut self, mark: Mark) -> bool {
        self.buffer.release(mark.id)
    }

    /// Drops every outstanding mark. Input consumed so far can no longer be
    /// reset to, and the bytes those marks pinned become free for reading.
    pub fn commit(&mut self) {
        let dropped = self.buffer.forget_marks();
        if dropped > 0 {
            trace!(target: "braid::tokenizer", position = self.position(), dropped, "committed");
        }
    }

    fn skip(&mut self) -> Result<(), TokenError> {
        let Some(skip) = self.skip.clone() else {
            return Ok(());
        };
        match self.raw_next(&skip) {
            Ok(_) => Ok(()),
            Err(err) if err.is_recoverable() => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Settles a match of `pattern` at the cursor and returns its buffer-relative end.
    fn find(&mut self, pattern: &Pattern) -> Result<usize, TokenError> {
        match self.state {
            State::Closed => return Err(TokenError::NoSuchElement(NoSuchElement::Closed)),
            State::Uninitialized => self.fill()?,
            State::Ready | State::NeedsInput => {}
        }
        loop {
            let status =
                pattern.match_at(self.buffer.filled(), self.buffer.cursor(), self.exhausted)?;
            match status {
                MatchStatus::Matched(end) => {
                    self.state = State::Ready;
                    return Ok(end);
                }
                MatchStatus::NoMatch if self.buffer.is_drained() && !self.exhausted => {
                    // Nothing buffered to judge by; find out whether input remains.
                    self.state = State::NeedsInput;
                    if self.buffer.is_full() {
                        return Err(self.window_full(pattern));
                    }
                    self.refill()?;
                }
                MatchStatus::NoMatch => {
                    self.state = State::Ready;
                    return Err(if self.buffer.is_drained() {
                        TokenError::NoSuchElement(NoSuchElement::Exhausted)
                    } else {
                        TokenError::InputMismatch {
                            pattern: pattern.as_str().to_string(),
                        }
                    });
                }
                MatchStatus::NeedsInput => {
                    self.state = State::NeedsInput;
                    if self.buffer.is_full() {
                        return Err(self.window_full(pattern));
                    }
                    self.refill()?;
                }
            }
        }
    }

    /// The error for a buffer that compaction cannot free: either the pending
    /// token alone fills it, or marks hold consumed bytes in front of it.
    fn window_full(&self, pattern: &Pattern) -> TokenError {
        let capacity = self.capacity();
        let pinned = self.buffer.pinned();
        warn!(
            target: "braid::tokenizer",
            pattern = %pattern,
            capacity,
            pinned,
            "no room left in the buffer"
        );
        if pinned == 0 {
            TokenError::NoSuchElement(NoSuchElement::TokenExceedsBuffer { capacity })
        } else {
            TokenError::WindowFull { capacity, pinned }
        }
    }

    fn fill(&mut self) -> Result<(), TokenError> {
        trace!(target: "braid::tokenizer", capacity = self.capacity(), "initial fill");
        self.read()?;
        self.state = State::Ready;
        Ok(())
    }

    fn refill(&mut self) -> Result<(), TokenError> {
        let dropped = self.buffer.compact();
        trace!(
            target: "braid::tokenizer",
            dropped,
            kept = self.buffer.filled().len(),
            "refilling"
        );
        self.read()
    }

    fn read(&mut self) -> Result<(), TokenError> {
        let spare = self.buffer.spare_mut();
        let room = spare.len();
        match self.source.read_into(spare)? {
            ReadStatus::Read(count) => self.buffer.commit(count.min(room)),
            ReadStatus::End => {
                debug!(target: "braid::tokenizer", position = self.position(), "end of input");
                self.exhausted = true;
            }
        }
        Ok(())
    }
}

impl<S> std::fmt::Debug for Tokenizer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokenizer")
            .field("state", &self.state)
            .field("position", &self.buffer.position())
            .field("buffered", &self.buffer.unconsumed().len())
            .field("capacity", &self.buffer.capacity())
            .field("exhausted", &self.exhausted)
            .field("skip", &self.skip)
            .finish()
    }
}
