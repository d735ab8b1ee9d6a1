//! The result monad every parser reports through.
//!
//! An [`Outcome`] is either a value or the [`ParseError`] that prevented it.
//! Chaining with `and_then`/`map` short-circuits on failure and hands the
//! original cause through untouched; [`OutcomeExt`] adds the dual recovery
//! side (`or_recover`, `recover`, `or_else_try`) and the terminal accessors.
//!
//! Failures are always values: nothing in a composed parser unwinds.

use crate::errors::ParseError;

/// Either a value or the cause of its absence.
pub type Outcome<T> = Result<T, ParseError>;

/// An always-successful outcome.
pub fn succeed<T>(value: T) -> Outcome<T> {
    Ok(value)
}

/// An always-failing outcome.
///
/// A cause is required by construction, so there is no "failure without a
/// reason" to guard against.
pub fn fail<T>(cause: impl Into<ParseError>) -> Outcome<T> {
    Err(cause.into())
}

/// Runs a fallible computation and captures its error as the failure cause.
pub fn attempt<T, E>(computation: impl FnOnce() -> Result<T, E>) -> Outcome<T>
where
    E: Into<ParseError>,
{
    computation().map_err(Into::into)
}

/// Recovery and terminal operations on [`Outcome`].
pub trait OutcomeExt<T>: Sized {
    /// On failure, hands the cause to `recovery`, which may itself fail.
    /// A success short-circuits.
    fn or_recover<F>(self, recovery: F) -> Outcome<T>
    where
        F: FnOnce(ParseError) -> Outcome<T>;

    /// Keeps a success only if it satisfies `predicate`; otherwise fails with
    /// [`ParseError::NoMatchingElement`].
    fn filter<P>(self, predicate: P) -> Outcome<T>
    where
        P: FnOnce(&T) -> bool;

    /// Replaces a failure with the value computed from its cause.
    fn recover<F>(self, recovery: F) -> Outcome<T>
    where
        F: FnOnce(ParseError) -> T;

    /// Replaces a failure with another outcome, discarding the cause.
    fn or_else_try<F>(self, alternative: F) -> Outcome<T>
    where
        F: FnOnce() -> Outcome<T>;

    fn or_else_get<F>(self, fallback: F) -> T
    where
        F: FnOnce() -> T;

    fn or_else_value(self, fallback: T) -> T;

    /// Drops the cause, keeping only presence.
    fn to_optional(self) -> Option<T>;

    /// Returns the value, panicking with the full cause chain on failure.
    ///
    /// # Panics
    /// Panics if the outcome failed.
    fn get_unchecked(self) -> T;

    /// Turns a failure into a `miette::Report` for display at the top level.
    fn into_report(self) -> Result<T, miette::Report>;
}

impl<T> OutcomeExt<T> for Outcome<T> {
    fn or_recover<F>(self, recovery: F) -> Outcome<T>
    where
        F: FnOnce(ParseError) -> Outcome<T>,
    {
        match self {
            Ok(value) => Ok(value),
            Err(cause) => recovery(cause),
        }
    }

    fn filter<P>(self, predicate: P) -> Outcome<T>
    where
        P: FnOnce(&T) -> bool,
    {
        self.and_then(|value| {
            if predicate(&value) {
                Ok(value)
            } else {
                Err(ParseError::NoMatchingElement)
            }
        })
    }

    fn recover<F>(self, recovery: F) -> Outcome<T>
    where
        F: FnOnce(ParseError) -> T,
    {
        self.or_recover(|cause| Ok(recovery(cause)))
    }

    fn or_else_try<F>(self, alternative: F) -> Outcome<T>
    where
        F: FnOnce() -> Outcome<T>,
    {
        self.or_recover(|_| alternative())
    }

    fn or_else_get<F>(self, fallback: F) -> T
    where
        F: FnOnce() -> T,
    {
        self.unwrap_or_else(|_| fallback())
    }

    fn or_else_value(self, fallback: T) -> T {
        self.unwrap_or(fallback)
    }

    fn to_optional(self) -> Option<T> {
        self.ok()
    }

    fn get_unchecked(self) -> T {
        match self {
            Ok(value) => value,
            Err(cause) => panic!("{:?}", miette::Report::new(cause)),
        }
    }

    fn into_report(self) -> Result<T, miette::Report> {
        self.map_err(miette::Report::new)
    }
}
