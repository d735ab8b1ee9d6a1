//! Braid: parser combinators over in-memory text and streaming input.
//!
//! Parsers are immutable values built from small pieces: regex primitives in
//! [`lexical`], the core combinators on [`BoxedParser`], and the repetition
//! algebra in [`repetition`]. Every parse reports through [`Outcome`]. The
//! same grammar runs over a [`Cursor`] or, through a [`TokenStream`], over a
//! [`Tokenizer`] that reads its source incrementally into a bounded buffer.

pub use crate::config::TokenizerConfig;
pub use crate::errors::{print_error, NoSuchElement, ParseError, PatternError, TokenError};
pub use crate::input::{Cursor, Input, PatternInput};
pub use crate::outcome::{Outcome, OutcomeExt};
pub use crate::parser::{BoxedParser, Parser};
pub use crate::pattern::{MatchStatus, Pattern, PatternCache};
pub use crate::tokenizer::{Mark, ReadSource, ReadStatus, Source, State, TokenStream, Tokenizer};

pub mod config;
pub mod errors;
pub mod input;
pub mod json;
pub mod lexical;
pub mod outcome;
pub mod parser;
pub mod pattern;
pub mod repetition;
pub mod tokenizer;
