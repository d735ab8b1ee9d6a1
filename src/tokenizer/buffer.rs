//! The tokenizer's fixed-capacity byte window.
//!
//! Layout of `data`:
//!
//! ```text
//! 0 ........ retained ........ cursor ........ limit ........ capacity
//!   consumed   kept for marks    unconsumed      free
//! ```
//!
//! Offsets handed out to callers are absolute: `discarded` is the number of
//! bytes compacted away since the start of the session.

use crate::errors::TokenError;

#[derive(Debug)]
pub(crate) struct TokenBuffer {
    data: Box<[u8]>,
    cursor: usize,
    limit: usize,
    discarded: usize,
    /// Outstanding marks as `(id, absolute offset)`.
    marks: Vec<(u64, usize)>,
    next_mark: u64,
}

impl TokenBuffer {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity].into_boxed_slice(),
            cursor: 0,
            limit: 0,
            discarded: 0,
            marks: Vec::new(),
            next_mark: 0,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Everything still buffered, including look-behind before the cursor.
    pub(crate) fn filled(&self) -> &[u8] {
        &self.data[..self.limit]
    }

    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    pub(crate) fn position(&self) -> usize {
        self.discarded + self.cursor
    }

    pub(crate) fn unconsumed(&self) -> &[u8] {
        &self.data[self.cursor..self.limit]
    }

    pub(crate) fn is_drained(&self) -> bool {
        self.cursor == self.limit
    }

    /// Start of the bytes compaction must keep.
    fn retained(&self) -> usize {
        self.marks
            .iter()
            .map(|&(_, offset)| offset - self.discarded)
            .fold(self.cursor, usize::min)
    }

    /// Consumed bytes kept only because a mark still points at or before them.
    pub(crate) fn pinned(&self) -> usize {
        self.cursor - self.retained()
    }

    /// True when compaction cannot make room for another byte.
    pub(crate) fn is_full(&self) -> bool {
        self.limit - self.retained() == self.capacity()
    }

    /// Slides the retained bytes to the front. Returns how many bytes were dropped.
    pub(crate) fn compact(&mut self) -> usize {
        let retained = self.retained();
        if retained > 0 {
            self.data.copy_within(retained..self.limit, 0);
            self.cursor -= retained;
            self.limit -= retained;
            self.discarded += retained;
        }
        retained
    }

    pub(crate) fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.data[self.limit..]
    }

    pub(crate) fn commit(&mut self, count: usize) {
        self.limit = (self.limit + count).min(self.capacity());
    }

    /// Consumes up to the buffer-relative `end` and returns the consumed text.
    pub(crate) fn take(&mut self, end: usize) -> Result<String, TokenError> {
        let text = std::str::from_utf8(&self.data[self.cursor..end])
            .map_err(|_| TokenError::InvalidUtf8 {
                offset: self.position(),
            })?
            .to_string();
        self.cursor = end;
        Ok(text)
    }

    /// Records the current position. Returns the mark's id and absolute offset.
    pub(crate) fn mark(&mut self) -> (u64, usize) {
        let id = self.next_mark;
        self.next_mark += 1;
        let offset = self.position();
        self.marks.push((id, offset));
        (id, offset)
    }

    pub(crate) fn holds(&self, id: u64) -> bool {
        self.marks.iter().any(|&(held, _)| held == id)
    }

    /// Moves the cursor back (or forward) to an absolute offset still buffered.
    pub(crate) fn reset(&mut self, offset: usize) -> Result<(), TokenError> {
        if offset < self.discarded || offset > self.discarded + self.limit {
            return Err(TokenError::StaleMark { offset });
        }
        self.cursor = offset - self.discarded;
        Ok(())
    }

    /// Drops the mark `id`. Returns false if it was no longer outstanding.
    pub(crate) fn release(&mut self, id: u64) -> bool {
        match self.marks.iter().position(|&(held, _)| held == id) {
            Some(index) => {
                self.marks.swap_remove(index);
                true
            }
            None => false,
        }
    }

    /// Drops every outstanding mark; the bytes they pinned become compactable.
    pub(crate) fn forget_marks(&mut self) -> usize {
        let dropped = self.marks.len();
        self.marks.clear();
        dropped
    }
}
