//! # Braid Test Doubles
//!
//! Sources that stand in for live input: one that trickles its text out in
//! small pieces, and one that records how it was driven.

#![allow(dead_code)]

use std::cell::Cell;
use std::io;
use std::rc::Rc;

use braid::{ReadSource, ReadStatus, Source, Tokenizer, TokenizerConfig};

/// Hands out its text at most `chunk` bytes per read.
pub struct ChunkedSource {
    text: Vec<u8>,
    offset: usize,
    chunk: usize,
}

impl ChunkedSource {
    pub fn new(text: &str, chunk: usize) -> Self {
        Self {
            text: text.as_bytes().to_vec(),
            offset: 0,
            chunk,
        }
    }
}

impl Source for ChunkedSource {
    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<ReadStatus> {
        if self.offset == self.text.len() {
            return Ok(ReadStatus::End);
        }
        let count = self.chunk.min(buf.len()).min(self.text.len() - self.offset);
        buf[..count].copy_from_slice(&self.text[self.offset..self.offset + count]);
        self.offset += count;
        Ok(ReadStatus::Read(count))
    }
}

/// Shared counters a [`CountingSource`] updates as it is used.
#[derive(Debug, Default)]
pub struct Counters {
    pub reads: Cell<usize>,
    pub closes: Cell<usize>,
}

/// Wraps another source and counts reads and closes.
pub struct CountingSource<S> {
    inner: S,
    counters: Rc<Counters>,
}

impl<S: Source> CountingSource<S> {
    pub fn new(inner: S) -> (Self, Rc<Counters>) {
        let counters = Rc::new(Counters::default());
        (
            Self {
                inner,
                counters: Rc::clone(&counters),
            },
            counters,
        )
    }
}

impl<S: Source> Source for CountingSource<S> {
    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<ReadStatus> {
        self.counters.reads.set(self.counters.reads.get() + 1);
        self.inner.read_into(buf)
    }

    fn close(&mut self) -> io::Result<()> {
        self.counters.closes.set(self.counters.closes.get() + 1);
        self.inner.close()
    }
}

/// A source whose reads always fail.
pub struct BrokenSource;

impl Source for BrokenSource {
    fn read_into(&mut self, _buf: &mut [u8]) -> io::Result<ReadStatus> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
    }
}

pub fn tokenizer_over(text: &str, capacity: usize) -> Tokenizer<ReadSource<&[u8]>> {
    let config = TokenizerConfig::default().with_buffer_capacity(capacity);
    Tokenizer::with_config(ReadSource::from_text(text), &config).unwrap()
}
