//! Where the tokenizer's bytes come from.

use std::io::{self, Read};

/// Result of one read from a [`Source`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// This many bytes were written to the front of the buffer. Zero means
    /// nothing is available yet, not end of input.
    Read(usize),
    /// No more bytes will ever arrive.
    End,
}

/// A blocking byte source.
pub trait Source {
    /// Reads into `buf`, which is never empty when called by the tokenizer.
    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<ReadStatus>;

    /// Releases the source. Called once, when the tokenizer is closed.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: Source + ?Sized> Source for Box<S> {
    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<ReadStatus> {
        (**self).read_into(buf)
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// Adapts any [`Read`]. A zero-byte read is end of input; closing drops the reader.
pub struct ReadSource<R> {
    reader: Option<R>,
}

impl<R: Read> ReadSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
        }
    }
}

impl<'a> ReadSource<&'a [u8]> {
    pub fn from_text(text: &'a str) -> Self {
        Self::new(text.as_bytes())
    }
}

impl<R: Read> Source for ReadSource<R> {
    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<ReadStatus> {
        let Some(reader) = self.reader.as_mut() else {
            return Err(io::Error::other("source is closed"));
        };
        if buf.is_empty() {
            return Ok(ReadStatus::Read(0));
        }
        loop {
            match reader.read(buf) {
                Ok(0) => return Ok(ReadStatus::End),
                Ok(n) => return Ok(ReadStatus::Read(n)),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
    }

    fn close(&mut self) -> io::Result<()> {
        self.reader = None;
        Ok(())
    }
}
