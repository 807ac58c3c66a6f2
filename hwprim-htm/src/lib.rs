//! Raw hardware transactional memory.
//!
//! This crate exposes the smallest possible surface over Intel's restricted transactional memory
//! (RTM): beginning a transaction, committing it, explicitly aborting it and testing whether the
//! current thread is inside one. On every other target the same API exists, [`htm_supported`]
//! returns `false`, and attempting to begin a transaction panics.
//!
//! Higher level retry policies live in `hwprim`. Nothing in here retries.

#![warn(missing_debug_implementations)]
#![warn(unused_lifetimes)]
#![deny(rust_2018_idioms)]
#![deny(unused_must_use)]

use cfg_if::cfg_if;
use core::{
    fmt::{self, Debug, Formatter},
    mem,
};

cfg_if! {
    if #[cfg(target_arch = "x86_64")] {
        pub mod x86_64;
        use crate::x86_64 as imp;
    } else {
        mod unsupported;
        use crate::unsupported as imp;
    }
}

/// The status word produced when beginning a transaction.
///
/// Bit layout follows the `eax` contents after `xbegin`. [`BeginCode::STARTED`] means the
/// transaction is running; any other value is the reason the most recent transaction aborted.
#[repr(transparent)]
#[derive(PartialEq, Eq, Ord, PartialOrd, Copy, Clone, Hash)]
pub struct BeginCode(u32);

impl BeginCode {
    pub const STARTED: Self = BeginCode(!0);
    /// No reason bits set. The hardware gives no hint that a retry could succeed.
    pub const NO_HINT: Self = BeginCode(0);
    pub const EXPLICIT: Self = BeginCode(1 << 0);
    pub const RETRY: Self = BeginCode(1 << 1);
    pub const CONFLICT: Self = BeginCode(1 << 2);
    pub const CAPACITY: Self = BeginCode(1 << 3);
    pub const DEBUG: Self = BeginCode(1 << 4);
    pub const NESTED: Self = BeginCode(1 << 5);

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        BeginCode(raw)
    }

    /// An explicit abort carrying the 8 bit `code` passed to `xabort`.
    #[inline]
    pub const fn explicit(code: u8) -> Self {
        BeginCode(Self::EXPLICIT.0 | (code as u32) << 24)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_started(self) -> bool {
        self.0 == Self::STARTED.0
    }

    #[inline]
    pub const fn is_no_hint(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_explicit(self) -> bool {
        !self.is_started() && self.0 & Self::EXPLICIT.0 != 0
    }

    #[inline]
    pub const fn is_retry(self) -> bool {
        !self.is_started() && self.0 & Self::RETRY.0 != 0
    }

    #[inline]
    pub const fn is_conflict(self) -> bool {
        !self.is_started() && self.0 & Self::CONFLICT.0 != 0
    }

    #[inline]
    pub const fn is_capacity(self) -> bool {
        !self.is_started() && self.0 & Self::CAPACITY.0 != 0
    }

    #[inline]
    pub const fn is_debug(self) -> bool {
        !self.is_started() && self.0 & Self::DEBUG.0 != 0
    }

    #[inline]
    pub const fn is_nested(self) -> bool {
        !self.is_started() && self.0 & Self::NESTED.0 != 0
    }

    /// The code passed to `xabort`, if the transaction was explicitly aborted.
    #[inline]
    pub const fn abort_code(self) -> Option<u8> {
        if self.is_explicit() {
            Some((self.0 >> 24) as u8)
        } else {
            None
        }
    }
}

impl Debug for BeginCode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        if self.is_started() {
            return formatter.pad("BeginCode::STARTED");
        }
        formatter
            .debug_struct("BeginCode")
            .field("raw", &format_args!("{:#010x}", self.0))
            .field("explicit", &self.abort_code())
            .field("retry", &self.is_retry())
            .field("conflict", &self.is_conflict())
            .field("capacity", &self.is_capacity())
            .finish()
    }
}

/// A running hardware transaction.
///
/// Dropping a `HardwareTx` commits it.
#[derive(Debug)]
pub struct HardwareTx {
    _private: (),
}

impl Drop for HardwareTx {
    #[inline]
    fn drop(&mut self) {
        unsafe { imp::end() }
    }
}

impl HardwareTx {
    /// Starts a hardware transaction.
    ///
    /// If the transaction later aborts, every memory effect since this call is rolled back and
    /// execution resumes as though `begin` had returned `Err` with the abort status.
    ///
    /// # Safety
    ///
    /// The cpu must support RTM ([`htm_supported`]). Code run before the returned value is
    /// dropped must be able to be rolled back: no system calls, no I/O, no panics.
    #[inline(always)]
    pub unsafe fn begin() -> Result<Self, BeginCode> {
        let code = imp::begin();
        if nudge::likely(code.is_started()) {
            Ok(HardwareTx { _private: () })
        } else {
            Err(code)
        }
    }

    /// Commits the transaction. Equivalent to dropping it.
    #[inline]
    pub fn commit(self) {
        drop(self)
    }

    /// Aborts the transaction with the code [`HardwareTx::ABORT_CODE`], rolling back to the
    /// matching [`begin`](HardwareTx::begin).
    #[inline]
    pub fn abort(self) -> ! {
        mem::forget(self);
        unsafe { imp::abort() }
    }

    pub const ABORT_CODE: u8 = 0xff;
}

/// Returns whether the current thread is executing inside a hardware transaction.
#[inline]
pub fn in_transaction() -> bool {
    htm_supported() && unsafe { imp::test() }
}

/// Returns whether the running cpu supports hardware transactions.
#[inline]
pub fn htm_supported() -> bool {
    imp::htm_supported()
}

/// Reads the cpu timestamp counter, or a monotonic nanosecond clock where there is none.
#[inline]
pub fn timestamp() -> u64 {
    imp::timestamp()
}
