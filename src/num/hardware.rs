use crate::num::{DivError, Primitives};
use cfg_if::cfg_if;

/// The backend using native wide types and the target's rotate, multiply and divide
/// instructions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Hardware;

cfg_if! {
    if #[cfg(target_arch = "x86_64")] {
        /// `div`. The caller guarantees `divisor != 0` and `high < divisor`, otherwise this
        /// raises a divide error.
        #[inline(always)]
        unsafe fn divide(high: u64, low: u64, divisor: u64) -> (u64, u64) {
            let quotient: u64;
            let remainder: u64;
            core::arch::asm!(
                "div {divisor}",
                divisor = in(reg) divisor,
                inout("rax") low => quotient,
                inout("rdx") high => remainder,
                options(pure, nomem, nostack),
            );
            (quotient, remainder)
        }

        /// `idiv`. The caller guarantees `divisor != 0` and that the quotient fits in an `i64`.
        #[inline(always)]
        unsafe fn signed_divide(high: i64, low: i64, divisor: i64) -> (i64, i64) {
            let quotient: i64;
            let remainder: i64;
            core::arch::asm!(
                "idiv {divisor}",
                divisor = in(reg) divisor,
                inout("rax") low => quotient,
                inout("rdx") high => remainder,
                options(pure, nomem, nostack),
            );
            (quotient, remainder)
        }
    } else {
        #[inline(always)]
        unsafe fn divide(high: u64, low: u64, divisor: u64) -> (u64, u64) {
            let dividend = (high as u128) << 64 | low as u128;
            let divisor = divisor as u128;
            ((dividend / divisor) as u64, (dividend % divisor) as u64)
        }

        #[inline(always)]
        unsafe fn signed_divide(high: i64, low: i64, divisor: i64) -> (i64, i64) {
            let dividend = join_signed(high, low);
            let divisor = divisor as i128;
            ((dividend / divisor) as i64, (dividend % divisor) as i64)
        }
    }
}

#[inline]
fn join_signed(high: i64, low: i64) -> i128 {
    (high as i128) << 64 | (low as u64) as i128
}

/// Whether `dividend / divisor`, truncated toward zero, fits in an `i64`.
///
/// A negative quotient may reach a magnitude of 2^63, a positive one only 2^63 - 1. Neither
/// product below can overflow a `u128`.
#[inline]
fn signed_quotient_fits(dividend: i128, divisor: i64) -> bool {
    let bound = if (dividend < 0) != (divisor < 0) {
        (1u128 << 63) + 1
    } else {
        1u128 << 63
    };
    dividend.unsigned_abs() < bound * divisor.unsigned_abs() as u128
}

#[cold]
#[inline(never)]
#[track_caller]
fn division_failed(name: &str, error: DivError) -> ! {
    panic!("{}: {}", name, error)
}

impl Primitives for Hardware {
    #[inline]
    fn rol8(x: u8, n: u8) -> u8 {
        x.rotate_left(n as u32)
    }

    #[inline]
    fn ror8(x: u8, n: u8) -> u8 {
        x.rotate_right(n as u32)
    }

    #[inline]
    fn rol16(x: u16, n: u16) -> u16 {
        x.rotate_left(n as u32)
    }

    #[inline]
    fn ror16(x: u16, n: u16) -> u16 {
        x.rotate_right(n as u32)
    }

    #[inline]
    fn rol32(x: u32, n: u32) -> u32 {
        x.rotate_left(n)
    }

    #[inline]
    fn ror32(x: u32, n: u32) -> u32 {
        x.rotate_right(n)
    }

    #[inline]
    fn rol64(x: u64, n: u64) -> u64 {
        // rotate_left takes the amount modulo the width
        x.rotate_left((n % 64) as u32)
    }

    #[inline]
    fn ror64(x: u64, n: u64) -> u64 {
        x.rotate_right((n % 64) as u32)
    }

    #[inline]
    fn umulh64(a: u64, b: u64) -> u64 {
        ((a as u128 * b as u128) >> 64) as u64
    }

    #[inline]
    fn mulh64(a: i64, b: i64) -> i64 {
        ((a as i128 * b as i128) >> 64) as i64
    }

    #[inline]
    fn checked_udiv128(high: u64, low: u64, divisor: u64) -> Result<(u64, u64), DivError> {
        if divisor == 0 {
            Err(DivError::DivideByZero)
        } else if high >= divisor {
            Err(DivError::Overflow)
        } else {
            Ok(unsafe { divide(high, low, divisor) })
        }
    }

    #[inline]
    fn checked_div128(high: i64, low: i64, divisor: i64) -> Result<(i64, i64), DivError> {
        if divisor == 0 {
            return Err(DivError::DivideByZero);
        }
        if !signed_quotient_fits(join_signed(high, low), divisor) {
            return Err(DivError::Overflow);
        }
        Ok(unsafe { signed_divide(high, low, divisor) })
    }

    #[inline]
    fn udiv128(high: u64, low: u64, divisor: u64) -> (u64, u64) {
        match Self::checked_udiv128(high, low, divisor) {
            Ok(result) => result,
            Err(error) => division_failed("udiv128", error),
        }
    }

    #[inline]
    fn div128(high: i64, low: i64, divisor: i64) -> (i64, i64) {
        match Self::checked_div128(high, low, divisor) {
            Ok(result) => result,
            Err(error) => division_failed("div128", error),
        }
    }

    #[inline]
    fn ctz64(x: u64) -> u32 {
        x.trailing_zeros()
    }

    #[inline]
    fn clz64(x: u64) -> u32 {
        x.leading_zeros()
    }

    #[inline]
    fn ctz128(x: u128) -> u32 {
        let low = x as u64;
        if low != 0 {
            low.trailing_zeros()
        } else {
            ((x >> 64) as u64).trailing_zeros() + 64
        }
    }

    #[inline]
    fn clz128(x: u128) -> u32 {
        let high = (x >> 64) as u64;
        if high != 0 {
            high.leading_zeros()
        } else {
            (x as u64).leading_zeros() + 64
        }
    }
}
