//! Fatal-assertion facility.
//!
//! Violated preconditions and broken internal invariants are programmer
//! errors with no local recovery path. They are reported through
//! [`fatal`], which logs the message and panics at the caller's location.
//! Recoverable conditions (backend refusal, size overflow) never come
//! through here; they are returned as `Result`s by the allocator.

use std::fmt;

/// Terminate the current operation with `message`.
///
/// Emits an `error` event first so the message reaches any installed
/// subscriber even when the panic is caught or the process aborts.
#[cold]
#[inline(never)]
#[track_caller]
pub fn fatal(message: fmt::Arguments<'_>) -> ! {
    tracing::error!("fatal allocator violation: {message}");
    panic!("{message}");
}

/// Check `condition`, terminating with `message` when it is false.
///
/// Function form of [`fatal_assert!`](crate::fatal_assert) for callers
/// with a fixed message.
#[inline]
#[track_caller]
pub fn check(message: &str, condition: bool) {
    if !condition {
        fatal(format_args!("{message}"));
    }
}

/// Assert a precondition or invariant, routing failures through
/// [`fatal`](crate::fatal::fatal).
///
/// ```should_panic
/// use linarena_core::fatal_assert;
///
/// let len = 0usize;
/// fatal_assert!(len > 0, "alloc length must be positive, got {len}");
/// ```
#[macro_export]
macro_rules! fatal_assert {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            $crate::fatal::fatal(::core::format_args!($($arg)+));
        }
    };
}
