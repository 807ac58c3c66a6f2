//! Bit rotation, wide multiplication and division, and zero counts.
//!
//! Every operation exists once per backend:
//!
//! * [`Hardware`], using native 128 bit types and the target's rotate, multiply and divide
//!   instructions.
//! * [`Portable`], using only 64 bit halves, shifts and masks. Its functions are also available
//!   as `const fn`s in [`portable`].
//!
//! Both backends produce identical results for every input. The free functions in this module
//! use [`Native`], picked for the compilation target. [`NumBackend`] selects a backend at runtime,
//! usually from [`Capabilities::numeric_backend`](crate::caps::Capabilities::numeric_backend).
//!
//! # Zero counts
//!
//! `ctz128(0)` and `clz128(0)` are both 128, and `ctz64(0)`/`clz64(0)` are both 64, on every
//! backend.
//!
//! # Examples
//!
//! ```
//! use hwprim::num;
//!
//! assert_eq!(num::rol8(0b1000_0001, 1), 0b0000_0011);
//! assert_eq!(num::umulh64(u64::MAX, 2), 1);
//!
//! let mut remainder = 0;
//! assert_eq!(num::udiv128(1, 5, 2, Some(&mut remainder)), (1 << 63) + 2);
//! assert_eq!(remainder, 1);
//!
//! assert_eq!(num::clz128(1), 127);
//! assert_eq!(num::ctz128(0), 128);
//! ```

mod hardware;
pub mod portable;

pub use self::{hardware::Hardware, portable::Portable};

use cfg_if::cfg_if;
use thiserror::Error;

/// Why a 128 by 64 bit division cannot produce a result.
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq, Hash)]
pub enum DivError {
    #[error("division by zero")]
    DivideByZero,

    #[error("quotient does not fit in 64 bits")]
    Overflow,
}

/// The numeric operations every backend implements.
///
/// Division takes the dividend as `(high, low)` halves and returns `(quotient, remainder)`.
pub trait Primitives {
    fn rol8(x: u8, n: u8) -> u8;
    fn ror8(x: u8, n: u8) -> u8;
    fn rol16(x: u16, n: u16) -> u16;
    fn ror16(x: u16, n: u16) -> u16;
    fn rol32(x: u32, n: u32) -> u32;
    fn ror32(x: u32, n: u32) -> u32;
    fn rol64(x: u64, n: u64) -> u64;
    fn ror64(x: u64, n: u64) -> u64;

    fn umulh64(a: u64, b: u64) -> u64;
    fn mulh64(a: i64, b: i64) -> i64;

    fn checked_udiv128(high: u64, low: u64, divisor: u64) -> Result<(u64, u64), DivError>;
    fn checked_div128(high: i64, low: i64, divisor: i64) -> Result<(i64, i64), DivError>;

    /// # Panics
    ///
    /// Panics if `divisor` is zero or the quotient does not fit in 64 bits.
    fn udiv128(high: u64, low: u64, divisor: u64) -> (u64, u64);

    /// # Panics
    ///
    /// Panics if `divisor` is zero or the quotient does not fit in 64 bits.
    fn div128(high: i64, low: i64, divisor: i64) -> (i64, i64);

    fn ctz64(x: u64) -> u32;
    fn clz64(x: u64) -> u32;
    fn ctz128(x: u128) -> u32;
    fn clz128(x: u128) -> u32;
}

cfg_if! {
    if #[cfg(any(
        target_arch = "x86",
        target_arch = "x86_64",
        target_arch = "aarch64",
        target_arch = "arm",
        target_arch = "powerpc64",
        target_arch = "riscv64"
    ))] {
        /// The backend for the compilation target.
        pub type Native = Hardware;
    } else {
        /// The backend for the compilation target.
        pub type Native = Portable;
    }
}

/// A backend chosen at runtime.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NumBackend {
    Hardware,
    Portable,
}

macro_rules! backend_dispatch {
    ($(fn $name:ident($($arg:ident: $t:ty),*) -> $ret:ty;)*) => {
        impl NumBackend {
            $(
                #[inline]
                pub fn $name(self, $($arg: $t),*) -> $ret {
                    match self {
                        NumBackend::Hardware => <Hardware as Primitives>::$name($($arg),*),
                        NumBackend::Portable => <Portable as Primitives>::$name($($arg),*),
                    }
                }
            )*
        }
    };
}

backend_dispatch! {
    fn rol8(x: u8, n: u8) -> u8;
    fn ror8(x: u8, n: u8) -> u8;
    fn rol16(x: u16, n: u16) -> u16;
    fn ror16(x: u16, n: u16) -> u16;
    fn rol32(x: u32, n: u32) -> u32;
    fn ror32(x: u32, n: u32) -> u32;
    fn rol64(x: u64, n: u64) -> u64;
    fn ror64(x: u64, n: u64) -> u64;
    fn umulh64(a: u64, b: u64) -> u64;
    fn mulh64(a: i64, b: i64) -> i64;
    fn checked_udiv128(high: u64, low: u64, divisor: u64) -> Result<(u64, u64), DivError>;
    fn checked_div128(high: i64, low: i64, divisor: i64) -> Result<(i64, i64), DivError>;
    fn udiv128(high: u64, low: u64, divisor: u64) -> (u64, u64);
    fn div128(high: i64, low: i64, divisor: i64) -> (i64, i64);
    fn ctz64(x: u64) -> u32;
    fn clz64(x: u64) -> u32;
    fn ctz128(x: u128) -> u32;
    fn clz128(x: u128) -> u32;
}

macro_rules! native {
    ($($(#[$attr:meta])* fn $name:ident($($arg:ident: $t:ty),*) -> $ret:ty;)*) => {$(
        $(#[$attr])*
        #[inline]
        pub fn $name($($arg: $t),*) -> $ret {
            <Native as Primitives>::$name($($arg),*)
        }
    )*};
}

native! {
    /// Rotates `x` left by `n` bits, `n` taken modulo 8.
    fn rol8(x: u8, n: u8) -> u8;
    /// Rotates `x` right by `n` bits, `n` taken modulo 8.
    fn ror8(x: u8, n: u8) -> u8;
    /// Rotates `x` left by `n` bits, `n` taken modulo 16.
    fn rol16(x: u16, n: u16) -> u16;
    /// Rotates `x` right by `n` bits, `n` taken modulo 16.
    fn ror16(x: u16, n: u16) -> u16;
    /// Rotates `x` left by `n` bits, `n` taken modulo 32.
    fn rol32(x: u32, n: u32) -> u32;
    /// Rotates `x` right by `n` bits, `n` taken modulo 32.
    fn ror32(x: u32, n: u32) -> u32;
    /// Rotates `x` left by `n` bits, `n` taken modulo 64.
    fn rol64(x: u64, n: u64) -> u64;
    /// Rotates `x` right by `n` bits, `n` taken modulo 64.
    fn ror64(x: u64, n: u64) -> u64;

    /// High 64 bits of the full product of `a` and `b`.
    fn umulh64(a: u64, b: u64) -> u64;
    /// High 64 bits of the full signed product of `a` and `b`.
    fn mulh64(a: i64, b: i64) -> i64;

    /// Divides `high:low` by `divisor`, returning `(quotient, remainder)`.
    fn checked_udiv128(high: u64, low: u64, divisor: u64) -> Result<(u64, u64), DivError>;
    /// Signed [`checked_udiv128`]. Truncates toward zero; the remainder has the sign of the
    /// dividend.
    fn checked_div128(high: i64, low: i64, divisor: i64) -> Result<(i64, i64), DivError>;

    /// Trailing zeros, 64 for zero.
    fn ctz64(x: u64) -> u32;
    /// Leading zeros, 64 for zero.
    fn clz64(x: u64) -> u32;
    /// Trailing zeros, 128 for zero.
    fn ctz128(x: u128) -> u32;
    /// Leading zeros, 128 for zero.
    fn clz128(x: u128) -> u32;
}

/// Divides the 128 bit value `high:low` by `divisor`, storing the remainder in `remainder` if
/// given.
///
/// # Panics
///
/// Panics if `divisor` is zero or the quotient does not fit in 64 bits. Validate with
/// [`checked_udiv128`] when the inputs are not known to be in range.
#[inline]
#[track_caller]
pub fn udiv128(high: u64, low: u64, divisor: u64, remainder: Option<&mut u64>) -> u64 {
    let (quotient, rem) = <Native as Primitives>::udiv128(high, low, divisor);
    if let Some(remainder) = remainder {
        *remainder = rem;
    }
    quotient
}

/// Signed [`udiv128`]. Truncates toward zero; the remainder has the sign of the dividend.
///
/// # Panics
///
/// Panics if `divisor` is zero or the quotient does not fit in 64 bits.
#[inline]
#[track_caller]
pub fn div128(high: i64, low: i64, divisor: i64, remainder: Option<&mut i64>) -> i64 {
    let (quotient, rem) = <Native as Primitives>::div128(high, low, divisor);
    if let Some(remainder) = remainder {
        *remainder = rem;
    }
    quotient
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_counts_at_zero() {
        for backend in [NumBackend::Hardware, NumBackend::Portable] {
            assert_eq!(backend.ctz64(0), 64);
            assert_eq!(backend.clz64(0), 64);
            assert_eq!(backend.ctz128(0), 128);
            assert_eq!(backend.clz128(0), 128);
        }
    }

    #[test]
    fn zero_counts_at_the_ends() {
        for backend in [NumBackend::Hardware, NumBackend::Portable] {
            assert_eq!(backend.ctz128(1), 0);
            assert_eq!(backend.ctz128(1 << 127), 127);
            assert_eq!(backend.clz128(1 << 127), 0);
            assert_eq!(backend.clz128(1), 127);
            assert_eq!(backend.ctz128(1 << 64), 64);
            assert_eq!(backend.clz128(1 << 63), 64);
        }
    }

    #[test]
    fn remainder_slot_is_optional() {
        assert_eq!(udiv128(0, 100, 7, None), 14);
        let mut remainder = -1;
        assert_eq!(div128(-1, -100, 7, Some(&mut remainder)), -14);
        assert_eq!(remainder, -2);
    }

    #[test]
    #[should_panic(expected = "division by zero")]
    fn divide_by_zero_is_fatal() {
        let _ = udiv128(0, 1, 0, None);
    }

    #[test]
    #[should_panic(expected = "quotient does not fit in 64 bits")]
    fn signed_overflow_is_fatal() {
        let _ = div128(0, i64::MIN, 1, None);
    }
}
