//! Feature-gated contention metrics for boxes.
//!
//! With the `lock-metrics` feature every box carries atomic counters for
//! acquisitions, contended acquisitions, wait time and hold time. Without it
//! the slot is zero-sized and every call compiles away.
//!
//! ```
//! use lockbox::ExclusiveBox;
//!
//! let boxed = ExclusiveBox::new(0);
//! *boxed.lock() += 1;
//!
//! let snap = boxed.snapshot();
//! #[cfg(feature = "lock-metrics")]
//! assert_eq!(snap.acquisitions, 1);
//! #[cfg(not(feature = "lock-metrics"))]
//! assert_eq!(snap.acquisitions, 0);
//! ```

/// Point-in-time copy of a box's lock metrics.
///
/// All fields stay zero when the `lock-metrics` feature is disabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LockMetricsSnapshot {
    /// Successful acquisitions (read, write or exclusive).
    pub acquisitions: u64,
    /// Acquisitions that found the lock unavailable and had to block.
    pub contentions: u64,
    /// Cumulative nanoseconds spent waiting to acquire.
    pub wait_ns: u64,
    /// Cumulative nanoseconds guards were alive.
    pub hold_ns: u64,
    /// Longest single wait in nanoseconds.
    pub max_wait_ns: u64,
    /// Longest single hold in nanoseconds.
    pub max_hold_ns: u64,
}

// ── Feature-gated implementation ──────────────────────────────────────────

#[cfg(feature = "lock-metrics")]
mod inner {
    use super::LockMetricsSnapshot;
    use crate::tracing_compat::trace;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{Duration, Instant};

    /// Counters split across two cache lines: the first is written while
    /// acquiring, the second while releasing.
    #[derive(Debug)]
    #[repr(C)]
    pub(crate) struct LockMetrics {
        acquisitions: AtomicU64,
        contentions: AtomicU64,
        wait_ns: AtomicU64,
        max_wait_ns: AtomicU64,
        _pad: [u8; 32],
        hold_ns: AtomicU64,
        max_hold_ns: AtomicU64,
    }

    fn nanos(elapsed: Duration) -> u64 {
        u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX)
    }

    fn update_max(current: &AtomicU64, value: u64) {
        let mut old = current.load(Ordering::Relaxed);
        while value > old {
            match current.compare_exchange_weak(old, value, Ordering::Relaxed, Ordering::Relaxed) {
                Ok(_) => break,
                Err(actual) => old = actual,
            }
        }
    }

    impl LockMetrics {
        pub(crate) const fn new() -> Self {
            Self {
                acquisitions: AtomicU64::new(0),
                contentions: AtomicU64::new(0),
                wait_ns: AtomicU64::new(0),
                max_wait_ns: AtomicU64::new(0),
                _pad: [0; 32],
                hold_ns: AtomicU64::new(0),
                max_hold_ns: AtomicU64::new(0),
            }
        }

        /// Acquires through `probe` (non-blocking) and falls back to `block`
        /// when the probe fails. Returns the timer that records hold time.
        pub(crate) fn acquire(
            &self,
            probe: impl FnOnce() -> bool,
            block: impl FnOnce(),
        ) -> HoldTimer<'_> {
            let start = Instant::now();
            let contended = !probe();
            if contended {
                block();
            }
            let wait_ns = nanos(start.elapsed());

            self.acquisitions.fetch_add(1, Ordering::Relaxed);
            self.wait_ns.fetch_add(wait_ns, Ordering::Relaxed);
            update_max(&self.max_wait_ns, wait_ns);
            if contended {
                self.contentions.fetch_add(1, Ordering::Relaxed);
                trace!(wait_ns, "contended lock acquisition");
            }

            HoldTimer {
                acquired_at: Instant::now(),
                metrics: self,
            }
        }

        pub(crate) fn snapshot(&self) -> LockMetricsSnapshot {
            LockMetricsSnapshot {
                acquisitions: self.acquisitions.load(Ordering::Relaxed),
                contentions: self.contentions.load(Ordering::Relaxed),
                wait_ns: self.wait_ns.load(Ordering::Relaxed),
                hold_ns: self.hold_ns.load(Ordering::Relaxed),
                max_wait_ns: self.max_wait_ns.load(Ordering::Relaxed),
                max_hold_ns: self.max_hold_ns.load(Ordering::Relaxed),
            }
        }

        pub(crate) fn reset(&self) {
            self.acquisitions.store(0, Ordering::Relaxed);
            self.contentions.store(0, Ordering::Relaxed);
            self.wait_ns.store(0, Ordering::Relaxed);
            self.hold_ns.store(0, Ordering::Relaxed);
            self.max_wait_ns.store(0, Ordering::Relaxed);
            self.max_hold_ns.store(0, Ordering::Relaxed);
        }
    }

    /// Records hold time when dropped. Guard fields drop after the guard's
    /// own `Drop` has released the lock.
    #[derive(Debug)]
    pub(crate) struct HoldTimer<'a> {
        acquired_at: Instant,
        metrics: &'a LockMetrics,
    }

    impl Drop for HoldTimer<'_> {
        fn drop(&mut self) {
            let hold_ns = nanos(self.acquired_at.elapsed());
            self.metrics.hold_ns.fetch_add(hold_ns, Ordering::Relaxed);
            update_max(&self.metrics.max_hold_ns, hold_ns);
        }
    }
}

// ── No-op implementation (feature disabled) ───────────────────────────────

#[cfg(not(feature = "lock-metrics"))]
mod inner {
    use super::LockMetricsSnapshot;
    use std::marker::PhantomData;

    #[derive(Debug)]
    pub(crate) struct LockMetrics;

    impl LockMetrics {
        #[inline]
        pub(crate) const fn new() -> Self {
            Self
        }

        #[inline]
        pub(crate) fn acquire(
            &self,
            _probe: impl FnOnce() -> bool,
            block: impl FnOnce(),
        ) -> HoldTimer<'_> {
            block();
            HoldTimer(PhantomData)
        }

        #[inline]
        #[allow(clippy::unused_self)]
        pub(crate) fn snapshot(&self) -> LockMetricsSnapshot {
            LockMetricsSnapshot::default()
        }

        #[inline]
        pub(crate) fn reset(&self) {}
    }

    #[derive(Debug)]
    pub(crate) struct HoldTimer<'a>(PhantomData<&'a LockMetrics>);
}

pub(crate) use inner::{HoldTimer, LockMetrics};

#[cfg(test)]
#[allow(clippy::significant_drop_tightening)]
mod tests {
    use super::*;
    use crate::sync::{ExclusiveBox, SharedBox};
    #[cfg(feature = "lock-metrics")]
    use std::sync::Arc;
    #[cfg(feature = "lock-metrics")]
    use std::thread;
    #[cfg(feature = "lock-metrics")]
    use std::time::Duration;

    fn init_test(name: &str) {
        crate::test_utils::init_test_logging();
        crate::test_phase!(name);
    }

    #[test]
    fn snapshot_default_is_zero() {
        let snap = LockMetricsSnapshot::default();
        assert_eq!(snap.acquisitions, 0);
        assert_eq!(snap.contentions, 0);
        assert_eq!(snap.wait_ns, 0);
        assert_eq!(snap.hold_ns, 0);
        assert_eq!(snap.max_wait_ns, 0);
        assert_eq!(snap.max_hold_ns, 0);
        let dbg = format!("{snap:?}");
        assert!(dbg.contains("LockMetricsSnapshot"));
    }

    #[test]
    fn reset_leaves_zero_acquisitions() {
        init_test("reset_leaves_zero_acquisitions");
        let boxed = ExclusiveBox::new(0);
        {
            let _g = boxed.lock();
        }
        boxed.reset_metrics();
        let snap = boxed.snapshot();
        crate::assert_with_log!(
            snap.acquisitions == 0,
            "acquisitions after reset",
            0u64,
            snap.acquisitions
        );
        crate::test_complete!("reset_leaves_zero_acquisitions");
    }

    #[cfg(not(feature = "lock-metrics"))]
    #[test]
    fn disabled_metrics_stay_zero() {
        init_test("disabled_metrics_stay_zero");
        let boxed = SharedBox::new(1);
        drop(boxed.read());
        drop(boxed.write());
        let snap = boxed.snapshot();
        crate::assert_with_log!(
            snap == LockMetricsSnapshot::default(),
            "snapshot",
            LockMetricsSnapshot::default(),
            snap
        );
        crate::test_complete!("disabled_metrics_stay_zero");
    }

    #[cfg(feature = "lock-metrics")]
    #[test]
    fn counts_every_guard_kind() {
        init_test("counts_every_guard_kind");
        let exclusive = ExclusiveBox::new(0);
        for _ in 0..10 {
            let _g = exclusive.lock();
        }
        let shared = SharedBox::new(0);
        drop(shared.read());
        drop(shared.read());
        drop(shared.write());

        let exclusive_acquisitions = exclusive.snapshot().acquisitions;
        let shared_acquisitions = shared.snapshot().acquisitions;
        crate::assert_with_log!(
            exclusive_acquisitions == 10,
            "exclusive acquisitions",
            10u64,
            exclusive_acquisitions
        );
        crate::assert_with_log!(
            shared_acquisitions == 3,
            "shared acquisitions",
            3u64,
            shared_acquisitions
        );
        crate::test_complete!("counts_every_guard_kind");
    }

    #[cfg(feature = "lock-metrics")]
    #[test]
    fn records_hold_time() {
        init_test("records_hold_time");
        let boxed = ExclusiveBox::new(0);
        {
            let _g = boxed.lock();
            thread::sleep(Duration::from_millis(5));
        }
        let snap = boxed.snapshot();
        crate::assert_with_log!(
            snap.hold_ns >= 4_000_000,
            "hold_ns >= 4ms",
            true,
            snap.hold_ns >= 4_000_000
        );
        crate::assert_with_log!(
            snap.max_hold_ns >= 4_000_000,
            "max_hold_ns >= 4ms",
            true,
            snap.max_hold_ns >= 4_000_000
        );
        crate::test_complete!("records_hold_time");
    }

    #[cfg(feature = "lock-metrics")]
    #[test]
    fn records_contention() {
        init_test("records_contention");
        let boxed = Arc::new(SharedBox::new(0));
        let reader = boxed.read();

        let writer_box = Arc::clone(&boxed);
        let writer = thread::spawn(move || {
            *writer_box.write() += 1;
        });

        thread::sleep(Duration::from_millis(10));
        drop(reader);
        writer.join().expect("writer panicked");

        let snap = boxed.snapshot();
        crate::assert_with_log!(
            snap.contentions >= 1,
            "contentions >= 1",
            true,
            snap.contentions >= 1
        );
        crate::assert_with_log!(snap.wait_ns > 0, "wait_ns > 0", true, snap.wait_ns > 0);
        crate::test_complete!("records_contention");
    }

    #[cfg(feature = "lock-metrics")]
    #[test]
    fn hold_time_recorded_when_unwinding() {
        init_test("hold_time_recorded_when_unwinding");
        let boxed = Arc::new(ExclusiveBox::new(0_u32));
        let inner = Arc::clone(&boxed);

        let handle: thread::JoinHandle<()> = thread::spawn(move || {
            let _guard = inner.lock();
            thread::sleep(Duration::from_millis(5));
            std::panic::resume_unwind(Box::new("unwinding with guard held"));
        });
        let _ = handle.join();

        let snap = boxed.snapshot();
        crate::assert_with_log!(
            snap.hold_ns >= 4_000_000,
            "hold_ns recorded despite unwinding",
            true,
            snap.hold_ns >= 4_000_000
        );
        crate::test_complete!("hold_time_recorded_when_unwinding");
    }

    #[cfg(feature = "lock-metrics")]
    #[test]
    fn reset_clears_all_counters() {
        init_test("reset_clears_all_counters");
        let boxed = ExclusiveBox::new(0);
        drop(boxed.lock());
        let before = boxed.snapshot();
        crate::assert_with_log!(
            before.acquisitions == 1,
            "before reset",
            1u64,
            before.acquisitions
        );

        boxed.reset_metrics();
        let after = boxed.snapshot();
        crate::assert_with_log!(
            after == LockMetricsSnapshot::default(),
            "after reset",
            LockMetricsSnapshot::default(),
            after
        );
        crate::test_complete!("reset_clears_all_counters");
    }
}
