//! Cache prefetch hints.
//!
//! These never dereference their argument and have no observable effect other than timing. Any
//! pointer is accepted, including null and dangling ones.

use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(any(target_arch = "x86", target_arch = "x86_64"))] {
        #[cfg(target_arch = "x86")]
        use core::arch::x86 as arch;
        #[cfg(target_arch = "x86_64")]
        use core::arch::x86_64 as arch;

        #[inline(always)]
        fn read_l1(ptr: *const u8) {
            unsafe { arch::_mm_prefetch::<{ arch::_MM_HINT_T0 }>(ptr as *const i8) }
        }

        #[inline(always)]
        fn read_l2(ptr: *const u8) {
            unsafe { arch::_mm_prefetch::<{ arch::_MM_HINT_T1 }>(ptr as *const i8) }
        }

        #[inline(always)]
        fn write_l1(ptr: *const u8) {
            unsafe {
                core::arch::asm!(
                    "prefetchw byte ptr [{}]",
                    in(reg) ptr,
                    options(nostack, readonly, preserves_flags),
                )
            }
        }
    } else if #[cfg(target_arch = "aarch64")] {
        #[inline(always)]
        fn read_l1(ptr: *const u8) {
            unsafe {
                core::arch::asm!(
                    "prfm pldl1keep, [{}]",
                    in(reg) ptr,
                    options(nostack, readonly, preserves_flags),
                )
            }
        }

        #[inline(always)]
        fn read_l2(ptr: *const u8) {
            unsafe {
                core::arch::asm!(
                    "prfm plil2keep, [{}]",
                    in(reg) ptr,
                    options(nostack, readonly, preserves_flags),
                )
            }
        }

        #[inline(always)]
        fn write_l1(ptr: *const u8) {
            unsafe {
                core::arch::asm!(
                    "prfm pstl1keep, [{}]",
                    in(reg) ptr,
                    options(nostack, readonly, preserves_flags),
                )
            }
        }
    } else {
        #[inline(always)]
        fn read_l1(_: *const u8) {}

        #[inline(always)]
        fn read_l2(_: *const u8) {}

        #[inline(always)]
        fn write_l1(_: *const u8) {}
    }
}

/// Hints that `ptr` will be read soon, into the level 1 cache.
#[inline(always)]
pub fn prefetch_read<T>(ptr: *const T) {
    read_l1(ptr as *const u8)
}

/// Hints that `ptr` will be written soon, fetching the line in an exclusive state.
#[inline(always)]
pub fn prefetch_write<T>(ptr: *const T) {
    write_l1(ptr as *const u8)
}

/// Hints that code at `ptr` will run soon.
///
/// Targets the level 2 cache, which is shared between data and instructions on most cpus.
///
/// ```
/// fn hot() -> u32 {
///     7
/// }
///
/// hwprim::prefetch::prefetch_exec(hot as *const ());
/// assert_eq!(hot(), 7);
/// ```
#[inline(always)]
pub fn prefetch_exec(ptr: *const ()) {
    read_l2(ptr as *const u8)
}
