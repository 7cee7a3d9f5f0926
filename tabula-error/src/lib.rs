#![deny(missing_docs)]
#![feature(error_generic_member_access)]

//! This crate defines error & result types for Tabula.
//!
//! Every failure a verb can raise belongs to one of a small number of kinds (see [`ErrorKind`]),
//! and all of them are detected before a verb produces its output table.

mod ext;

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Deref;

pub use ext::*;

/// A string that can be used as an error message.
#[derive(Debug)]
pub struct ErrString(Cow<'static, str>);

impl<T> From<T> for ErrString
where
    T: Into<Cow<'static, str>>,
{
    fn from(msg: T) -> Self {
        Self(msg.into())
    }
}

impl AsRef<str> for ErrString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for ErrString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for ErrString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// The top-level error type for Tabula.
#[derive(thiserror::Error)]
#[non_exhaustive]
pub enum TabulaError {
    /// An unknown column name, a duplicate name, or a type mismatch in an operator.
    #[error("schema error: {0}\nBacktrace:\n{1}")]
    Schema(ErrString, Backtrace),
    /// A result whose length is neither the scope length nor a length-1 broadcast.
    #[error("shape error: {0}\nBacktrace:\n{1}")]
    Shape(ErrString, Backtrace),
    /// A function used where its semantics do not apply, e.g. a window function in summarise.
    #[error("semantic misuse: {0}\nBacktrace:\n{1}")]
    SemanticMisuse(ErrString, Backtrace),
    /// A mutate expression referencing an assignment that is not yet defined.
    #[error("scope error: {0}\nBacktrace:\n{1}")]
    Scope(ErrString, Backtrace),
    /// An argument to a function or verb is invalid.
    #[error("invalid argument: {0}\nBacktrace:\n{1}")]
    InvalidArgument(ErrString, Backtrace),
    /// An index is out of bounds.
    #[error("index {0} out of bounds from {1} to {2}\nBacktrace:\n{3}")]
    OutOfBounds(usize, usize, usize, Backtrace),
    /// A column-name pattern could not be compiled.
    #[error(transparent)]
    Regex(#[from] regex::Error),
    /// A wrapper for other errors, carrying additional context.
    #[error("{0}: {1}")]
    Context(ErrString, Box<TabulaError>),
}

/// The classification of a [`TabulaError`], looking through any [`TabulaError::Context`] layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`TabulaError::Schema`].
    Schema,
    /// See [`TabulaError::Shape`].
    Shape,
    /// See [`TabulaError::SemanticMisuse`].
    SemanticMisuse,
    /// See [`TabulaError::Scope`].
    Scope,
    /// See [`TabulaError::InvalidArgument`].
    InvalidArgument,
    /// See [`TabulaError::OutOfBounds`].
    OutOfBounds,
    /// See [`TabulaError::Regex`].
    Regex,
}

impl TabulaError {
    /// Adds additional context to an error.
    pub fn with_context<T: Into<ErrString>>(self, msg: T) -> Self {
        TabulaError::Context(msg.into(), Box::new(self))
    }

    /// The innermost error, skipping every context layer.
    pub fn root(&self) -> &TabulaError {
        match self {
            TabulaError::Context(_, inner) => inner.root(),
            other => other,
        }
    }

    /// The kind of the innermost error.
    pub fn kind(&self) -> ErrorKind {
        match self.root() {
            TabulaError::Schema(..) => ErrorKind::Schema,
            TabulaError::Shape(..) => ErrorKind::Shape,
            TabulaError::SemanticMisuse(..) => ErrorKind::SemanticMisuse,
            TabulaError::Scope(..) => ErrorKind::Scope,
            TabulaError::InvalidArgument(..) => ErrorKind::InvalidArgument,
            TabulaError::OutOfBounds(..) => ErrorKind::OutOfBounds,
            TabulaError::Regex(..) => ErrorKind::Regex,
            // root() never returns a context layer
            TabulaError::Context(_, inner) => inner.kind(),
        }
    }
}

impl Debug for TabulaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

/// A type alias for Results that return TabulaErrors as their error type.
pub type TabulaResult<T> = Result<T, TabulaError>;

/// A convenient macro for creating a TabulaError.
#[macro_export]
macro_rules! tabula_err {
    (OutOfBounds: $idx:expr, $start:expr, $stop:expr) => {{
        use std::backtrace::Backtrace;
        $crate::__private::must_use(
            $crate::TabulaError::OutOfBounds($idx, $start, $stop, Backtrace::capture())
        )
    }};
    (Context: $msg:literal, $err:expr) => {{
        $crate::__private::must_use(
            $crate::TabulaError::Context($msg.into(), Box::new($err))
        )
    }};
    ($variant:ident: $fmt:literal $(, $arg:expr)* $(,)?) => {{
        use std::backtrace::Backtrace;
        $crate::__private::must_use(
            $crate::TabulaError::$variant(format!($fmt, $($arg),*).into(), Backtrace::capture())
        )
    }};
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::tabula_err!(InvalidArgument: $fmt, $($arg),*)
    };
}

/// A convenient macro for returning a TabulaError.
#[macro_export]
macro_rules! tabula_bail {
    ($($tt:tt)+) => {
        return Err($crate::tabula_err!($($tt)+))
    };
}

/// A convenient macro for panicking with a TabulaError in the presence of a programmer error
/// (e.g., an invariant has been violated).
#[macro_export]
macro_rules! tabula_panic {
    ($variant:ident: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::tabula_panic!($crate::tabula_err!($variant: $fmt, $($arg),*))
    };
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::tabula_panic!($crate::tabula_err!($fmt, $($arg),*))
    };
    ($err:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        let err: $crate::TabulaError = $err;
        panic!("{}", err.with_context(format!($fmt, $($arg),*)))
    }};
    ($err:expr) => {{
        let err: $crate::TabulaError = $err;
        panic!("{}", err)
    }};
}

/// A trait for unwrapping a TabulaResult.
pub trait TabulaUnwrap {
    /// The type of the value being unwrapped.
    type Output;

    /// Returns the value of the result if it is Ok, otherwise panics with the error.
    /// Should be called only in contexts where the error condition represents a bug (programmer error).
    fn tabula_unwrap(self) -> Self::Output;
}

impl<T, E> TabulaUnwrap for Result<T, E>
where
    E: Into<TabulaError>,
{
    type Output = T;

    #[inline(always)]
    fn tabula_unwrap(self) -> Self::Output {
        self.map_err(|err| err.into())
            .unwrap_or_else(|err| tabula_panic!(err))
    }
}

/// A trait for expect-ing a TabulaResult or an Option.
pub trait TabulaExpect {
    /// The type of the value being expected.
    type Output;

    /// Returns the value of the result if it is Ok, otherwise panics with the error.
    /// Should be called only in contexts where the error condition represents a bug (programmer error).
    fn tabula_expect(self, msg: &str) -> Self::Output;
}

impl<T, E> TabulaExpect for Result<T, E>
where
    E: Into<TabulaError>,
{
    type Output = T;

    #[inline(always)]
    fn tabula_expect(self, msg: &str) -> Self::Output {
        self.map_err(|err| err.into())
            .unwrap_or_else(|e| tabula_panic!(e.with_context(msg.to_string())))
    }
}

impl<T> TabulaExpect for Option<T> {
    type Output = T;

    #[inline(always)]
    fn tabula_expect(self, msg: &str) -> Self::Output {
        self.unwrap_or_else(|| {
            let err = TabulaError::InvalidArgument(msg.to_string().into(), Backtrace::capture());
            tabula_panic!(err)
        })
    }
}

#[doc(hidden)]
pub mod __private {
    #[doc(hidden)]
    #[inline]
    #[cold]
    #[must_use]
    pub const fn must_use(error: crate::TabulaError) -> crate::TabulaError {
        error
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn fails(kind: ErrorKind) -> TabulaResult<()> {
        match kind {
            ErrorKind::Schema => tabula_bail!(Schema: "unknown column {}", "x"),
            ErrorKind::Shape => tabula_bail!(Shape: "length {} does not match {}", 3, 2),
            ErrorKind::SemanticMisuse => tabula_bail!(SemanticMisuse: "window in summarise"),
            ErrorKind::Scope => tabula_bail!(Scope: "z is defined later"),
            ErrorKind::InvalidArgument => tabula_bail!("bad argument"),
            ErrorKind::OutOfBounds => tabula_bail!(OutOfBounds: 5, 0, 3),
            ErrorKind::Regex => Err(regex::Regex::new("(").map(|_| ()).unwrap_err().into()),
        }
    }

    #[rstest]
    #[case(ErrorKind::Schema)]
    #[case(ErrorKind::Shape)]
    #[case(ErrorKind::SemanticMisuse)]
    #[case(ErrorKind::Scope)]
    #[case(ErrorKind::InvalidArgument)]
    #[case(ErrorKind::OutOfBounds)]
    #[case(ErrorKind::Regex)]
    fn kinds_survive_context(#[case] kind: ErrorKind) {
        let err = fails(kind).unwrap_err();
        assert_eq!(err.kind(), kind);
        let wrapped = err.with_context("step 1").with_context("pipeline");
        assert_eq!(wrapped.kind(), kind);
    }

    #[test]
    fn context_is_displayed_outermost_first() {
        let err = tabula_err!(Schema: "unknown column {}", "x").with_context("filter");
        let msg = err.to_string();
        assert!(msg.starts_with("filter: schema error: unknown column x"), "{msg}");
    }

    #[test]
    #[should_panic(expected = "missing value")]
    fn expect_on_none_panics() {
        let value: Option<u8> = None;
        value.tabula_expect("missing value");
    }
}
