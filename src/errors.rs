//! Braid Error Handling
//!
//! Three families of failure travel through a parse:
//! - [`ParseError`]: what combinators produce and what alternation recovers from.
//! - [`TokenError`]: signals raised by the streaming tokenizer.
//! - [`PatternError`]: a regex that could not be compiled into a matcher.
//!
//! Every error is a `miette` diagnostic with a stable code, so a failed top-level
//! parse can be rendered with [`print_error`] or turned into a `miette::Report`.

use std::fmt;
use std::io;

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

// ============================================================================
// PARSE ERRORS
// ============================================================================

/// Failure cause carried by every unsuccessful [`Outcome`](crate::Outcome).
#[derive(Debug, Error, Diagnostic)]
pub enum ParseError {
    /// A labelled failure, usually produced by `or_else_fail`, wrapping the
    /// cause it replaced.
    #[error("{message}")]
    #[diagnostic(code(braid::parse::failure))]
    Failure {
        message: String,
        #[source]
        cause: Option<Box<ParseError>>,
    },

    /// The input at `position` did not match `pattern`.
    #[error("{pattern} expected at position {position}")]
    #[diagnostic(code(braid::parse::expected))]
    Expected { pattern: String, position: usize },

    /// A filter predicate rejected an otherwise successful value.
    #[error("no matching element")]
    #[diagnostic(code(braid::parse::no_matching_element))]
    NoMatchingElement,

    /// A combinator was built with arguments that can never parse anything.
    #[error("invalid argument: {0}")]
    #[diagnostic(
        code(braid::parse::invalid_argument),
        help("this is a grammar construction bug, not an input problem")
    )]
    InvalidArgument(String),

    /// A branch failed after committing to it, so no alternative may be tried.
    #[error("committed parse failed at position {position}")]
    #[diagnostic(code(braid::parse::committed))]
    Committed {
        position: usize,
        #[source]
        cause: Box<ParseError>,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Pattern(#[from] PatternError),
}

impl ParseError {
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
            cause: None,
        }
    }

    /// Wraps `cause` under a new message, keeping it reachable through `source()`.
    pub fn with_cause(message: impl Into<String>, cause: ParseError) -> Self {
        Self::Failure {
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    pub fn expected(pattern: impl Into<String>, position: usize) -> Self {
        Self::Expected {
            pattern: pattern.into(),
            position,
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Makes a recoverable failure fatal; fatal ones pass through unchanged.
    pub fn committed(position: usize, cause: ParseError) -> Self {
        if cause.is_recoverable() {
            Self::Committed {
                position,
                cause: Box::new(cause),
            }
        } else {
            cause
        }
    }

    /// Whether alternation and repetition may backtrack past this failure.
    ///
    /// Ordinary mismatches are recoverable. I/O failures, closed tokenizers,
    /// oversized tokens, failures past a commit, bad patterns and construction
    /// errors are not: they
    /// propagate to the top of the parse unless a recovery combinator on the
    /// outcome itself handles them.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Failure { cause: Some(cause), .. } => cause.is_recoverable(),
            Self::Failure { cause: None, .. } | Self::Expected { .. } | Self::NoMatchingElement => {
                true
            }
            Self::Token(token) => token.is_recoverable(),
            Self::Committed { .. } | Self::InvalidArgument(_) | Self::Pattern(_) => false,
        }
    }

    /// Follows the cause chain down to the most specific failure.
    pub fn deepest(&self) -> &ParseError {
        let mut current = self;
        loop {
            match current {
                Self::Failure {
                    cause: Some(cause), ..
                }
                | Self::Committed { cause, .. } => current = &**cause,
                _ => return current,
            }
        }
    }
}

// ============================================================================
// TOKENIZER ERRORS
// ============================================================================

/// Why the tokenizer has nothing left to hand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoSuchElement {
    /// The source reported end of input and the buffer is drained.
    Exhausted,
    /// The tokenizer was closed.
    Closed,
    /// A pending match grew to fill the whole buffer without completing.
    TokenExceedsBuffer { capacity: usize },
}

impl fmt::Display for NoSuchElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted => write!(f, "input exhausted"),
            Self::Closed => write!(f, "tokenizer is closed"),
            Self::TokenExceedsBuffer { capacity } => {
                write!(f, "token does not fit in a {capacity}-byte buffer")
            }
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum TokenError {
    /// Input remains, but it is not what was requested.
    #[error("input mismatch: remaining input does not match `{pattern}`")]
    #[diagnostic(code(braid::token::input_mismatch))]
    InputMismatch { pattern: String },

    /// There is nothing left to match at all.
    #[error("no such element: {0}")]
    #[diagnostic(code(braid::token::no_such_element))]
    NoSuchElement(NoSuchElement),

    /// The character source failed; the tokenizer cannot retry safely.
    #[error("source read failed: {0}")]
    #[diagnostic(code(braid::token::io))]
    Io(#[from] io::Error),

    /// Matched bytes were not valid UTF-8.
    #[error("matched text at offset {offset} is not valid UTF-8")]
    #[diagnostic(code(braid::token::invalid_utf8))]
    InvalidUtf8 { offset: usize },

    /// A mark was reset after the bytes it points at were compacted away.
    #[error("mark at offset {offset} is no longer buffered")]
    #[diagnostic(
        code(braid::token::stale_mark),
        help("reset a mark before releasing it")
    )]
    StaleMark { offset: usize },

    /// Open attempts hold so much consumed input that no room is left to read more.
    #[error("rollback window full: {pinned} of {capacity} buffered bytes are held for backtracking")]
    #[diagnostic(
        code(braid::token::window_full),
        help("commit to a branch once its first token decides it, or raise buffer_capacity")
    )]
    WindowFull { capacity: usize, pinned: usize },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Pattern(#[from] PatternError),
}

impl TokenError {
    pub fn is_input_mismatch(&self) -> bool {
        matches!(self, Self::InputMismatch { .. })
    }

    pub fn is_no_such_element(&self) -> bool {
        matches!(self, Self::NoSuchElement(_))
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InputMismatch { .. } | Self::NoSuchElement(NoSuchElement::Exhausted)
        )
    }
}

// ============================================================================
// PATTERN ERRORS
// ============================================================================

#[derive(Debug, Clone, Error, Diagnostic)]
pub enum PatternError {
    #[error("invalid pattern: {message}")]
    #[diagnostic(code(braid::pattern::syntax))]
    Syntax {
        #[source_code]
        pattern: String,
        #[label("here")]
        span: SourceSpan,
        message: String,
    },

    #[error("pattern `{pattern}` could not be compiled: {message}")]
    #[diagnostic(code(braid::pattern::build))]
    Build { pattern: String, message: String },

    /// The matcher gave up, e.g. a Unicode word boundary next to non-ASCII text.
    #[error("pattern `{pattern}` cannot be matched at byte offset {offset}")]
    #[diagnostic(
        code(braid::pattern::unsupported),
        help("use ASCII word boundaries `(?-u:\\b)` when matching non-ASCII text")
    )]
    Unsupported { pattern: String, offset: usize },
}

impl PatternError {
    pub fn pattern(&self) -> &str {
        match self {
            Self::Syntax { pattern, .. }
            | Self::Build { pattern, .. }
            | Self::Unsupported { pattern, .. } => pattern,
        }
    }
}

// ============================================================================
// ERROR FORMATTING UTILITIES
// ============================================================================

/// Prints an error with full miette diagnostics to stderr.
pub fn print_error(error: impl Diagnostic + Send + Sync + 'static) {
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}
