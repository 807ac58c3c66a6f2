//! Raw x86_64 restricted transactional memory instructions.

use crate::{BeginCode, HardwareTx};
use core::arch::asm;

#[inline(always)]
pub unsafe fn xbegin() -> u32 {
    let status: u32;
    // On abort the cpu writes the status to eax and resumes at the fallback label, which is the
    // instruction after xbegin. On start eax keeps the sentinel.
    asm!(
        "mov eax, 0xFFFFFFFF",
        "xbegin 2f",
        "2:",
        out("eax") status,
        options(nostack),
    );
    status
}

#[inline(always)]
pub unsafe fn xend() {
    asm!("xend", options(nostack));
}

#[inline(always)]
pub unsafe fn xabort() -> ! {
    asm!("xabort 0xff", options(nostack));
    core::hint::unreachable_unchecked()
}

#[inline(always)]
pub unsafe fn xtest() -> bool {
    let in_tx: u8;
    asm!(
        "xtest",
        "setnz {}",
        out(reg_byte) in_tx,
        options(nomem, nostack),
    );
    in_tx != 0
}

pub const _XBEGIN_STARTED: u32 = !0;
pub const _XABORT_EXPLICIT: u32 = 1 << 0;
pub const _XABORT_RETRY: u32 = 1 << 1;
pub const _XABORT_CONFLICT: u32 = 1 << 2;
pub const _XABORT_CAPACITY: u32 = 1 << 3;
pub const _XABORT_DEBUG: u32 = 1 << 4;
pub const _XABORT_NESTED: u32 = 1 << 5;

#[allow(non_snake_case)]
#[inline(always)]
pub const fn _XABORT_CODE(x: u32) -> u32 {
    (x >> 24) & 0xFF
}

const _: () = assert!(HardwareTx::ABORT_CODE == 0xff);
const _: () = assert!(BeginCode::STARTED.raw() == _XBEGIN_STARTED);
const _: () = assert!(BeginCode::CAPACITY.raw() == _XABORT_CAPACITY);

#[inline(always)]
pub(crate) unsafe fn begin() -> BeginCode {
    BeginCode::from_raw(xbegin())
}

#[inline(always)]
pub(crate) unsafe fn end() {
    xend()
}

#[inline(always)]
pub(crate) unsafe fn abort() -> ! {
    xabort()
}

#[inline(always)]
pub(crate) unsafe fn test() -> bool {
    xtest()
}

/// Structured extended feature flags, `ebx` bit 11.
const CPUID_RTM: u32 = 1 << 11;

#[inline]
#[allow(unused_unsafe)]
pub(crate) fn htm_supported() -> bool {
    use core::arch::x86_64::{__cpuid, __cpuid_count};

    let max_leaf = unsafe { __cpuid(0) }.eax;
    max_leaf >= 7 && unsafe { __cpuid_count(7, 0) }.ebx & CPUID_RTM != 0
}

#[inline]
#[allow(unused_unsafe)]
pub(crate) fn timestamp() -> u64 {
    unsafe { core::arch::x86_64::_rdtsc() }
}
