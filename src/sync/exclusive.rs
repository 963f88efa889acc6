//! Exclusive-access box.
//!
//! [`ExclusiveBox`] owns a value and a mutex. The only way to reach the value
//! is [`ExclusiveBox::lock`], which blocks until the mutex is free and returns
//! an [`ExclusiveGuard`]; dropping the guard unlocks.
//!
//! # Example
//!
//! ```
//! use lockbox::ExclusiveBox;
//!
//! let boxed = ExclusiveBox::new(5);
//! {
//!     let mut guard = boxed.lock();
//!     *guard = 10;
//! }
//! assert_eq!(*boxed.lock(), 10);
//! ```

#![allow(unsafe_code)]

use parking_lot::RawMutex;
use parking_lot::lock_api::RawMutex as _;
use std::cell::UnsafeCell;
use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::construct::{Construct, Moved, TryConstruct};
use crate::sync::metrics::{HoldTimer, LockMetrics, LockMetricsSnapshot};
use crate::tracing_compat::trace;

/// A value that can only be reached by one thread at a time.
///
/// The mutex is not re-entrant: calling [`lock`](Self::lock) while the same
/// thread already holds a guard deadlocks. There is no poisoning; see the
/// crate docs for what a panic inside a critical section leaves behind.
pub struct ExclusiveBox<T> {
    value: UnsafeCell<T>,
    lock: RawMutex,
    metrics: LockMetrics,
}

// Safety: the value is only reachable through a guard that holds `lock`.
unsafe impl<T: Send> Sync for ExclusiveBox<T> {}

impl<T> ExclusiveBox<T> {
    /// Creates a box by moving `value` into it.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self::with(Moved(value))
    }

    /// Creates a box, initializing the value with the strategy `init` names.
    #[must_use]
    pub fn with<I: Construct<T>>(init: I) -> Self {
        let value = init.construct();
        trace!(strategy = I::STRATEGY.name(), "exclusive box constructed");
        Self::from_value(value)
    }

    /// Creates a box from a fallible constructor.
    ///
    /// # Errors
    ///
    /// Returns the constructor's error unchanged; no box is created.
    pub fn try_with<I: TryConstruct<T>>(init: I) -> Result<Self, I::Error> {
        let value = init.try_construct()?;
        trace!(strategy = I::STRATEGY.name(), "exclusive box constructed");
        Ok(Self::from_value(value))
    }

    fn from_value(value: T) -> Self {
        Self {
            value: UnsafeCell::new(value),
            lock: RawMutex::INIT,
            metrics: LockMetrics::new(),
        }
    }

    /// Blocks until the mutex is free and returns a guard over the value.
    pub fn lock(&self) -> ExclusiveGuard<'_, T> {
        ExclusiveGuard::acquire(&self.value, &self.lock, &self.metrics)
    }

    /// Returns true if some guard currently holds the mutex.
    #[inline]
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
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

impl<T> From<T> for ExclusiveBox<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T> fmt::Debug for ExclusiveBox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExclusiveBox")
            .field("locked", &self.is_locked())
            .finish_non_exhaustive()
    }
}

/// Scoped exclusive access to the value of an [`ExclusiveBox`].
#[must_use = "guard will be immediately released if not held"]
pub struct ExclusiveGuard<'a, T> {
    value: &'a UnsafeCell<T>,
    lock: &'a RawMutex,
    _timer: HoldTimer<'a>,
}

// Safety: a shared guard only hands out `&T`.
unsafe impl<T: Sync> Sync for ExclusiveGuard<'_, T> {}

impl<'a, T> ExclusiveGuard<'a, T> {
    pub(crate) fn acquire(
        value: &'a UnsafeCell<T>,
        lock: &'a RawMutex,
        metrics: &'a LockMetrics,
    ) -> Self {
        let timer = metrics.acquire(|| lock.try_lock(), || lock.lock());
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

impl<T> Deref for ExclusiveGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // Safety: the mutex is held for the guard's lifetime.
        unsafe { &*self.value.get() }
    }
}

impl<T> DerefMut for ExclusiveGuard<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        // Safety: the mutex is held and `&mut self` is unique.
        unsafe { &mut *self.value.get() }
    }
}

impl<T> Drop for ExclusiveGuard<'_, T> {
    fn drop(&mut self) {
        // Safety: locked in `acquire` on this thread; guards are not `Send`.
        unsafe { self.lock.unlock() };
    }
}

impl<T: fmt::Debug> fmt::Debug for ExclusiveGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExclusiveGuard")
            .field("data", &**self)
            .finish()
    }
}
