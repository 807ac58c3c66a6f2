//! Statistics on how transactions behave, enabled with the `stats` feature.
//!
//! Each thread records into its own buffer. Buffers are merged into a global summary when the
//! thread exits, or when it calls [`thread_flush`]. Without the feature, recording compiles away
//! and the global summary stays empty.

pub use crate::internal::stats::{Event, Size, Stats};

/// Prints the global summary to stdout.
#[inline]
pub fn print_stats() {
    crate::internal::stats::print_stats()
}

/// Merges the current thread's statistics into the global summary.
#[inline]
pub fn thread_flush() {
    crate::internal::stats::thread_flush()
}

/// Returns a copy of the global summary.
///
/// Statistics still buffered by running threads are not included.
#[inline]
pub fn snapshot() -> Stats {
    crate::internal::stats::snapshot()
}
