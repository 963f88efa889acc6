//! Lock boxes and their guards.
//!
//! # Primitives
//!
//! - [`ExclusiveBox`]: mutual exclusion, one [`ExclusiveGuard`] at a time
//! - [`SharedBox`]: many [`ReadGuard`]s or one [`WriteGuard`]
//!
//! # Guard discipline
//!
//! - Acquire: blocks the calling thread until the lock is available; no
//!   timeout, no try variant, no reentrancy
//! - Hold: the guard borrows the box, so the box cannot move or drop while
//!   the guard lives
//! - Release: `Drop`, on normal exit and while unwinding alike
//!
//! # Panics while holding
//!
//! The lock is always released; the value is not rolled back and nothing is
//! poisoned. The next holder sees whatever state the failed section left.

mod exclusive;
pub(crate) mod metrics;
mod shared;

pub use exclusive::{ExclusiveBox, ExclusiveGuard};
pub use metrics::LockMetricsSnapshot;
pub use shared::{ReadGuard, SharedBox, WriteGuard};
