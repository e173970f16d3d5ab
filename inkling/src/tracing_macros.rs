//! Logging shims: forward to `tracing` when the `tracing` feature is on,
//! expand to nothing otherwise.
//!
//! The warn-level shim is `warning!`: a `warn` macro collides with the
//! built-in `#[warn]` attribute on re-export.

#[cfg(feature = "tracing")]
macro_rules! trace {
    ($($tt:tt)*) => { ::tracing::trace!($($tt)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! debug {
    ($($tt:tt)*) => { ::tracing::debug!($($tt)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! debug {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! warning {
    ($($tt:tt)*) => { ::tracing::warn!($($tt)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! warning {
    ($($tt:tt)*) => {};
}

#[allow(unused_imports)]
pub(crate) use {debug, trace, warning};
