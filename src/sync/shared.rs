//! Reader/writer box.
//!
//! [`SharedBox`] owns a value and a reader/writer lock. Any number of
//! [`ReadGuard`]s may coexist; a [`WriteGuard`] excludes every other guard.
//!
//! # Fairness
//!
//! Ordering between waiting readers and writers is `parking_lot`'s: a waiting
//! writer holds back new readers, so a thread that already owns a read guard
//! and asks for a second one can deadlock behind that writer. Take one read
//! guard per thread and pass references to it around instead.
//!
//! # Example
//!
//! ```
//! use lockbox::SharedBox;
//!
//! let config = SharedBox::new(vec!["a"]);
//! {
//!     let first = config.read();
//!     let second = config.read();
//!     assert_eq!(first.len(), second.len());
//! }
//! config.write().push("b");
//! assert_eq!(config.read().len(), 2);
//! ```

#![allow(unsafe_code)]

use parking_lot::RawRwLock;
use parking_lot::lock_api::RawRwLock as _;
use std::cell::UnsafeCell;
use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::construct::{Construct, Moved, TryConstruct};
use crate::sync::metrics::{HoldTimer, LockMetrics, LockMetricsSnapshot};
use crate::tracing_compat::trace;

/// A value shared by many readers or owned by one writer at a time.
///
/// The lock is not re-entrant in either mode. There is no poisoning; see the
/// crate docs for what a panic inside a critical section leaves behind.
pub struct SharedBox<T> {
    value: UnsafeCell<T>,
    lock: RawRwLock,
    metrics: LockMetrics,
}

// Safety: readers on several threads see `&T` at once (needs `Sync`); a
// writer may mutate from any thread (needs `Send`).
unsafe impl<T: Send + Sync> Sync for SharedBox<T> {}

impl<T> SharedBox<T> {
    /// Creates a box by moving `value` into it.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self::with(Moved(value))
    }

    /// Creates a box, initializing the value with the strategy `init` names.
    #[must_use]
    pub fn with<I: Construct<T>>(init: I) -> Self {
        let value = init.construct();
        trace!(strategy = I::STRATEGY.name(), "shared box constructed");
        Self::from_value(value)
    }

    /// Creates a box from a fallible constructor.
    ///
    /// # Errors
    ///
    /// Returns the constructor's error unchanged; no box is created.
    pub fn try_with<I: TryConstruct<T>>(init: I) -> Result<Self, I::Error> {
        let value = init.try_construct()?;
        trace!(strategy = I::STRATEGY.name(), "shared box constructed");
        Ok(Self::from_value(value))
    }

    fn from_value(value: T) -> Self {
        Self {
            value: UnsafeCell::new(value),
            lock: RawRwLock::INIT,
            metrics: LockMetrics::new(),
        }
    }

    /// Blocks until no writer holds the lock and returns a read guard.
    pub fn read(&self) -> ReadGuard<'_, T> {
        ReadGuard::acquire(&self.value, &self.lock, &self.metrics)
    }

    /// Blocks until no reader or writer holds the lock and returns a write
    /// guard.
    pub fn write(&self) -> WriteGuard<'_, T> {
        WriteGuard::acquire(&self.value, &self.lock, &self.metrics)
    }

    /// Returns true if any guard currently holds the lock.
    #[inline]
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }

    /// Returns true if a write guard currently holds the lock.
    #[inline]
    #[must_use]
    pub fn is_write_locked(&self) -> bool {
        self.lock.is_locked_exclusive()
    }

    /// Returns the lock metrics recorded so far.
    #[must_use]
    pub fn snapshot(&self) -> LockMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Zeroes the lock metrics.
    pub fn reset_metrics(&self) {
        self.metrics.reset();
    }
}

impl<T> From<T> for SharedBox<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T> fmt::Debug for SharedBox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedBox")
            .field("locked", &self.is_locked())
            .field("write_locked", &self.is_write_locked())
            .finish_non_exhaustive()
    }
}

/// Scoped shared, read-only access to the value of a [`SharedBox`].
#[must_use = "guard will be immediately released if not held"]
pub struct ReadGuard<'a, T> {
    value: &'a UnsafeCell<T>,
    lock: &'a RawRwLock,
    _timer: HoldTimer<'a>,
}

// Safety: only `&T` is ever handed out.
unsafe impl<T: Sync> Sync for ReadGuard<'_, T> {}

impl<'a, T> ReadGuard<'a, T> {
    pub(crate) fn acquire(
        value: &'a UnsafeCell<T>,
        lock: &'a RawRwLock,
        metrics: &'a LockMetrics,
    ) -> Self {
        let timer = metrics.acquire(|| lock.try_lock_shared(), || lock.lock_shared());
        Self {
            value,
            lock,
            _timer: timer,
        }
    }

    /// Returns the guarded value.
    ///
    /// An associated function so it never shadows a method of `T`.
    #[must_use]
    pub fn get(this: &Self) -> &T {
        this
    }
}

impl<T> Deref for ReadGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // Safety: the lock is held shared; no writer can exist.
        unsafe { &*self.value.get() }
    }
}

impl<T> Drop for ReadGuard<'_, T> {
    fn drop(&mut self) {
        // Safety: one shared hold taken in `acquire` on this thread.
        unsafe { self.lock.unlock_shared() };
    }
}

impl<T: fmt::Debug> fmt::Debug for ReadGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadGuard").field("data", &**self).finish()
    }
}

/// Scoped exclusive, mutable access to the value of a [`SharedBox`].
#[must_use = "guard will be immediately released if not held"]
pub struct WriteGuard<'a, T> {
    value: &'a UnsafeCell<T>,
    lock: &'a RawRwLock,
    _timer: HoldTimer<'a>,
}

// Safety: a shared write guard only hands out `&T`.
unsafe impl<T: Sync> Sync for WriteGuard<'_, T> {}

impl<'a, T> WriteGuard<'a, T> {
    pub(crate) fn acquire(
        value: &'a UnsafeCell<T>,
        lock: &'a RawRwLock,
        metrics: &'a LockMetrics,
    ) -> Self {
        let timer = metrics.acquire(|| lock.try_lock_exclusive(), || lock.lock_exclusive());
        Self {
            value,
            lock,
            _timer: timer,
        }
    }

    /// Returns the guarded value.
    ///
    /// An associated function so it never shadows a method of `T`.
    #[must_use]
    pub fn get(this: &Self) -> &T {
        this
    }

    /// Returns the guarded value mutably.
    #[must_use]
    pub fn get_mut(this: &mut Self) -> &mut T {
        this
    }
}

impl<T> Deref for WriteGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // Safety: the lock is held exclusively.
        unsafe { &*self.value.get() }
    }
}

impl<T> DerefMut for WriteGuard<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        // Safety: the lock is held exclusively and `&mut self` is unique.
        unsafe { &mut *self.value.get() }
    }
}

impl<T> Drop for WriteGuard<'_, T> {
    fn drop(&mut self) {
        // Safety: locked exclusively in `acquire` on this thread.
        unsafe { self.lock.unlock_exclusive() };
    }
}

impl<T: fmt::Debug> fmt::Debug for WriteGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteGuard").field("data", &**self).finish()
    }
}
