//! Tokenizer configuration.
//!
//! Buffer size and cache size depend on the workload: the buffer bounds the
//! longest token that can be matched, the cache bounds how many distinct
//! patterns stay compiled. Both are fixed when a tokenizer is built.

use serde::{Deserialize, Serialize};

use crate::errors::ParseError;

pub const DEFAULT_BUFFER_CAPACITY: usize = 64 * 1024;
pub const DEFAULT_CACHE_CAPACITY: usize = 16;
pub const DEFAULT_SKIP_PATTERN: &str = r"\s*";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Bytes held in the token buffer. A token longer than this cannot match.
    pub buffer_capacity: usize,
    /// Compiled patterns kept by the tokenizer's pattern cache.
    pub cache_capacity: usize,
    /// Pattern consumed before every `next`; `None` disables skipping.
    pub skip_pattern: Option<String>,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            skip_pattern: Some(DEFAULT_SKIP_PATTERN.to_string()),
        }
    }
}

impl TokenizerConfig {
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_skip_pattern(mut self, pattern: Option<&str>) -> Self {
        self.skip_pattern = pattern.map(str::to_string);
        self
    }

    /// Rejects settings no tokenizer can work with.
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.buffer_capacity == 0 {
            return Err(ParseError::invalid_argument(
                "buffer_capacity must be at least 1",
            ));
        }
        if self.cache_capacity == 0 {
            return Err(ParseError::invalid_argument(
                "cache_capacity must be at least 1",
            ));
        }
        Ok(())
    }
}
