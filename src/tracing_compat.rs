//! Logging shim.
//!
//! With `tracing-integration` the `trace!` macro is `tracing`'s own. Without
//! it the macro swallows its arguments, so call sites compile unchanged and
//! cost nothing.

#[cfg(feature = "tracing-integration")]
pub(crate) use tracing::trace;

#[cfg(not(feature = "tracing-integration"))]
mod noop {
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    pub(crate) use trace;
}

#[cfg(not(feature = "tracing-integration"))]
pub(crate) use noop::trace;
