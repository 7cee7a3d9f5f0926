use crate::{ErrString, TabulaResult};

/// Extension trait for TabulaResult
pub trait ResultExt<T>: private::Sealed {
    /// Wrap the error, if any, in a [`crate::TabulaError::Context`] layer.
    fn context<M: Into<ErrString>>(self, msg: M) -> TabulaResult<T>;

    /// Like [`ResultExt::context`], but only builds the message when there is an error.
    fn with_context<M: Into<ErrString>, F: FnOnce() -> M>(self, f: F) -> TabulaResult<T>;
}

mod private {
    use crate::TabulaResult;

    pub trait Sealed {}

    impl<T> Sealed for TabulaResult<T> {}
}

impl<T> ResultExt<T> for TabulaResult<T> {
    fn context<M: Into<ErrString>>(self, msg: M) -> TabulaResult<T> {
        self.map_err(|err| err.with_context(msg))
    }

    fn with_context<M: Into<ErrString>, F: FnOnce() -> M>(self, f: F) -> TabulaResult<T> {
        self.map_err(|err| err.with_context(f()))
    }
}
