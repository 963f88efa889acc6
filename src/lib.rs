//! Value-owning lock boxes with scoped access guards.
//!
//! A box binds one protected value to one lock and only hands the value out
//! through a guard that holds the lock for as long as it lives:
//!
//! - [`ExclusiveBox`]: one holder at a time, via [`ExclusiveBox::lock`].
//! - [`SharedBox`]: many readers via [`SharedBox::read`], or one writer via
//!   [`SharedBox::write`].
//!
//! Acquisition blocks the calling thread. There are no timeouts, no
//! try-acquire calls, and no reentrancy: locking a box twice from the same
//! thread deadlocks.
//!
//! # Example
//!
//! ```
//! use lockbox::{ExclusiveBox, SharedBox};
//!
//! let counter = ExclusiveBox::new(5);
//! {
//!     let mut guard = counter.lock();
//!     *guard = 10;
//! }
//! assert_eq!(*counter.lock(), 10);
//!
//! let name = SharedBox::new(String::from("x"));
//! let (a, b) = (name.read(), name.read());
//! assert_eq!((a.as_str(), b.as_str()), ("x", "x"));
//! drop((a, b));
//! name.write().push('y');
//! assert_eq!(*name.read(), "xy");
//! ```
//!
//! # Construction strategies
//!
//! [`ExclusiveBox::with`] and [`SharedBox::with`] accept any
//! [`Construct`] tag. The tag's type picks the initialization path at compile
//! time; see the [`construct`] module for the table.
//!
//! ```
//! use lockbox::{Copied, ExclusiveBox, InPlace, MoveAssigned};
//!
//! let moved = ExclusiveBox::with(MoveAssigned(vec![1, 2, 3]));
//! let copied = ExclusiveBox::with(Copied(&7_u64));
//! let built: ExclusiveBox<String> = ExclusiveBox::with(InPlace("in place"));
//! assert_eq!(moved.lock().len(), 3);
//! assert_eq!(*copied.lock(), 7);
//! assert_eq!(*built.lock(), "in place");
//! ```
//!
//! # Panics inside a critical section
//!
//! A guard releases its lock while unwinding, so a panic never leaks a lock.
//! Nothing marks the value as tainted afterwards: whatever partial mutation
//! happened before the panic is what the next holder sees. The boxes are
//! therefore not [`RefUnwindSafe`](std::panic::RefUnwindSafe); wrapping a
//! critical section in `catch_unwind` requires an explicit
//! [`AssertUnwindSafe`](std::panic::AssertUnwindSafe).
//!
//! # Guard discipline
//!
//! Guards borrow their box, cannot be cloned, and stay on the thread that
//! acquired them. Each of these is a compile error:
//!
//! ```compile_fail
//! use lockbox::ExclusiveBox;
//!
//! fn assert_clone<C: Clone>(_: &C) {}
//! let boxed = ExclusiveBox::new(1);
//! let guard = boxed.lock();
//! assert_clone(&guard); // ERROR: guards are not Clone
//! ```
//!
//! ```compile_fail
//! use lockbox::ExclusiveBox;
//!
//! let guard = {
//!     let boxed = ExclusiveBox::new(1);
//!     boxed.lock() // ERROR: the guard would outlive its box
//! };
//! ```
//!
//! ```compile_fail
//! use lockbox::SharedBox;
//!
//! let boxed = SharedBox::new(1);
//! let guard = boxed.write();
//! let moved = boxed; // ERROR: the box is borrowed by a live guard
//! drop(guard);
//! ```
//!
//! ```compile_fail
//! use lockbox::ExclusiveBox;
//!
//! fn assert_send<S: Send>(_: &S) {}
//! let boxed = ExclusiveBox::new(1);
//! let guard = boxed.lock();
//! assert_send(&guard); // ERROR: guards are released on the acquiring thread
//! ```
//!
//! ```compile_fail
//! use lockbox::SharedBox;
//!
//! let boxed = SharedBox::new(1);
//! let mut guard = boxed.read();
//! *guard = 2; // ERROR: read guards are read-only
//! ```
//!
//! ```compile_fail
//! use lockbox::ExclusiveBox;
//!
//! fn assert_default<D: Default>() {}
//! assert_default::<ExclusiveBox<i32>>(); // ERROR: a box always needs a value
//! ```
//!
//! ```compile_fail
//! use lockbox::ExclusiveBox;
//!
//! fn assert_clone<C: Clone>(_: &C) {}
//! let boxed = ExclusiveBox::new(1);
//! assert_clone(&boxed); // ERROR: boxes are not Clone
//! ```
//!
//! # Features
//!
//! - `tracing-integration`: emit construction and contention events through
//!   `tracing`.
//! - `lock-metrics`: record acquisitions, contention, wait and hold time; read
//!   them with `snapshot()`.

pub mod construct;
pub mod sync;
mod tracing_compat;

#[cfg(test)]
mod test_utils;

pub use construct::{
    CloneAssigned, Construct, Copied, CopyAssigned, Emplace, InPlace, MoveAssigned, Moved,
    Strategy, TryConstruct, TryEmplace, TryInPlace,
};
pub use sync::{
    ExclusiveBox, ExclusiveGuard, LockMetricsSnapshot, ReadGuard, SharedBox, WriteGuard,
};
