//! Compiled patterns and the bounded pattern cache.
//!
//! A [`Pattern`] is an anchored, leftmost-first DFA. Matching it against a
//! window of bytes has three outcomes ([`MatchStatus`]), which is what lets the
//! streaming tokenizer tell a finished token from one that the next read could
//! still extend.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use regex_automata::dfa::{dense, Automaton, StartKind};
use regex_automata::util::primitives::StateID;
use regex_automata::{Anchored, Input};
use tracing::trace;

use crate::errors::PatternError;

/// Result of matching a pattern at a fixed starting offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    /// The match is final and ends at this absolute byte offset.
    Matched(usize),
    /// The outcome depends on bytes past the end of the window.
    NeedsInput,
    /// No match is possible, whatever follows.
    NoMatch,
}

pub struct Pattern {
    source: String,
    dfa: dense::DFA<Vec<u32>>,
}

impl Pattern {
    /// Compiles `regex`. Syntax errors carry a span into the pattern text.
    pub fn new(regex: &str) -> Result<Self, PatternError> {
        if let Err(err) = regex_syntax::Parser::new().parse(regex) {
            return Err(syntax_error(regex, &err));
        }
        let config = dense::Config::new()
            .start_kind(StartKind::Anchored)
            .unicode_word_boundary(true);
        let dfa = dense::Builder::new()
            .configure(config)
            .build(regex)
            .map_err(|err| PatternError::Build {
                pattern: regex.to_string(),
                message: err.to_string(),
            })?;
        Ok(Self {
            source: regex.to_string(),
            dfa,
        })
    }

    /// A pattern matching `text` verbatim.
    pub fn literal(text: &str) -> Result<Self, PatternError> {
        Self::new(&regex_syntax::escape(text))
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Matches at `start` within `haystack`. Bytes before `start` are only
    /// look-behind context.
    ///
    /// When `at_end` is false, the end of `haystack` is treated as a window
    /// boundary rather than end of input: if the bytes that would follow could
    /// change the result, the answer is [`MatchStatus::NeedsInput`].
    pub fn match_at(
        &self,
        haystack: &[u8],
        start: usize,
        at_end: bool,
    ) -> Result<MatchStatus, PatternError> {
        let start = start.min(haystack.len());
        let input = Input::new(haystack).range(start..).anchored(Anchored::Yes);
        let mut sid = self
            .dfa
            .start_state_forward(&input)
            .map_err(|err| PatternError::Build {
                pattern: self.source.clone(),
                message: err.to_string(),
            })?;

        let mut last = None;
        for (offset, &byte) in haystack.iter().enumerate().skip(start) {
            sid = self.dfa.next_state(sid, byte);
            if !self.dfa.is_special_state(sid) {
                continue;
            }
            if self.dfa.is_match_state(sid) {
                // Match states are delayed by one byte.
                last = Some(offset);
            } else if self.dfa.is_dead_state(sid) {
                return Ok(settled(last));
            } else if self.dfa.is_quit_state(sid) {
                return Err(PatternError::Unsupported {
                    pattern: self.source.clone(),
                    offset,
                });
            }
        }

        let at_eoi = if self.dfa.is_match_state(self.dfa.next_eoi_state(sid)) {
            Some(haystack.len())
        } else {
            last
        };
        if at_end || self.is_settled(sid, last, at_eoi, haystack.len()) {
            Ok(settled(at_eoi))
        } else {
            Ok(MatchStatus::NeedsInput)
        }
    }

    /// True when no continuation of the window can change the result.
    fn is_settled(&self, sid: StateID, last: Option<usize>, at_eoi: Option<usize>, len: usize) -> bool {
        let mut checked: Vec<StateID> = Vec::new();
        for byte in 0..=u8::MAX {
            let next = self.dfa.next_state(sid, byte);
            if self.dfa.is_dead_state(next) {
                if at_eoi != last {
                    return false;
                }
                continue;
            }
            if !self.dfa.is_match_state(next) || at_eoi != Some(len) {
                return false;
            }
            if checked.contains(&next) {
                continue;
            }
            // A match ends exactly at the boundary; anything live after it
            // would make the match longer.
            if (0..=u8::MAX).any(|b| !self.dfa.is_dead_state(self.dfa.next_state(next, b))) {
                return false;
            }
            checked.push(next);
        }
        true
    }
}

fn settled(end: Option<usize>) -> MatchStatus {
    end.map_or(MatchStatus::NoMatch, MatchStatus::Matched)
}

fn syntax_error(regex: &str, err: &regex_syntax::Error) -> PatternError {
    let (span, message) = match err {
        regex_syntax::Error::Parse(e) => (*e.span(), e.kind().to_string()),
        regex_syntax::Error::Translate(e) => (*e.span(), e.kind().to_string()),
        other => {
            return PatternError::Build {
                pattern: regex.to_string(),
                message: other.to_string(),
            }
        }
    };
    PatternError::Syntax {
        pattern: regex.to_string(),
        span: (span.start.offset..span.end.offset).into(),
        message,
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

// ============================================================================
// PATTERN CACHE
// ============================================================================

/// Maps pattern text to compiled patterns, evicting the least recently used
/// entry beyond `capacity`. A capacity of zero disables caching.
#[derive(Debug)]
pub struct PatternCache {
    capacity: usize,
    entries: HashMap<String, Arc<Pattern>>,
    recency: VecDeque<String>,
}

impl PatternCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            recency: VecDeque::with_capacity(capacity),
        }
    }

    pub fn get_or_compile(&mut self, regex: &str) -> Result<Arc<Pattern>, PatternError> {
        if let Some(pattern) = self.entries.get(regex).cloned() {
            trace!(target: "braid::pattern", pattern = regex, "cache hit");
            self.touch(regex);
            return Ok(pattern);
        }
        trace!(target: "braid::pattern", pattern = regex, "cache miss");
        let pattern = Arc::new(Pattern::new(regex)?);
        if self.capacity == 0 {
            return Ok(pattern);
        }
        if self.entries.len() >= self.capacity {
            if let Some(evicted) = self.recency.pop_front() {
                trace!(target: "braid::pattern", pattern = %evicted, "evicting");
                self.entries.remove(&evicted);
            }
        }
        self.entries.insert(regex.to_string(), Arc::clone(&pattern));
        self.recency.push_back(regex.to_string());
        Ok(pattern)
    }

    /// Moves `regex` to the most-recent end. The scan is linear in `capacity`,
    /// which is fine for small caches like the default 16; a cache sized in
    /// the thousands would want an indexed recency list instead.
    fn touch(&mut self, regex: &str) {
        if let Some(index) = self.recency.iter().position(|k| k == regex) {
            if let Some(key) = self.recency.remove(index) {
                self.recency.push_back(key);
            }
        }
    }

    pub fn contains(&self, regex: &str) -> bool {
        self.entries.contains_key(regex)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
