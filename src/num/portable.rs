//! Portable implementations, written with 64 bit halves and shifts only.
//!
//! Every function here is a `const fn`, so they can be used in constant evaluation. Results are
//! identical to the [`Hardware`](crate::num::Hardware) backend.

use crate::num::{DivError, Primitives};

const MASK32: u64 = 0xFFFF_FFFF;

macro_rules! rotate {
    ($($t:ty => $rol:ident, $ror:ident;)*) => {$(
        /// Rotates `x` left by `n` bits, `n` taken modulo the width.
        #[inline]
        pub const fn $rol(x: $t, n: $t) -> $t {
            let n = n % <$t>::BITS as $t;
            // shifting by the full width is an overflow
            if n == 0 {
                x
            } else {
                (x << n) | (x >> (<$t>::BITS as $t - n))
            }
        }

        /// Rotates `x` right by `n` bits, `n` taken modulo the width.
        #[inline]
        pub const fn $ror(x: $t, n: $t) -> $t {
            let n = n % <$t>::BITS as $t;
            if n == 0 {
                x
            } else {
                (x >> n) | (x << (<$t>::BITS as $t - n))
            }
        }
    )*};
}

rotate! {
    u8 => rol8, ror8;
    u16 => rol16, ror16;
    u32 => rol32, ror32;
    u64 => rol64, ror64;
}

/// Splits a 128 bit value into `(high, low)`.
#[inline]
pub const fn split(x: u128) -> (u64, u64) {
    ((x >> 64) as u64, x as u64)
}

#[inline]
pub const fn join(high: u64, low: u64) -> u128 {
    (high as u128) << 64 | low as u128
}

/// High 64 bits of the unsigned 128 bit product, from four 32x32 bit partial products.
#[inline]
pub const fn umulh64(a: u64, b: u64) -> u64 {
    let (a_lo, a_hi) = (a & MASK32, a >> 32);
    let (b_lo, b_hi) = (b & MASK32, b >> 32);

    let lo_lo = a_lo * b_lo;
    let lo_hi = a_lo * b_hi;
    let hi_lo = a_hi * b_lo;
    let hi_hi = a_hi * b_hi;

    // at most 3 * (2^32 - 1), no overflow
    let middle = (lo_lo >> 32) + (lo_hi & MASK32) + (hi_lo & MASK32);
    hi_hi + (lo_hi >> 32) + (hi_lo >> 32) + (middle >> 32)
}

/// High 64 bits of the signed 128 bit product.
#[inline]
pub const fn mulh64(a: i64, b: i64) -> i64 {
    // a two's complement operand reads as itself plus 2^64 when negative
    let mut high = umulh64(a as u64, b as u64);
    if a < 0 {
        high = high.wrapping_sub(b as u64);
    }
    if b < 0 {
        high = high.wrapping_sub(a as u64);
    }
    high as i64
}

/// Restoring division. Requires `high < divisor`.
const fn divide_halves(high: u64, low: u64, divisor: u64) -> (u64, u64) {
    let mut remainder = high;
    let mut quotient = 0u64;
    let mut i = 0;
    while i < 64 {
        let carry = remainder >> 63;
        remainder = (remainder << 1) | ((low >> (63 - i)) & 1);
        quotient <<= 1;
        if carry != 0 || remainder >= divisor {
            remainder = remainder.wrapping_sub(divisor);
            quotient |= 1;
        }
        i += 1;
    }
    (quotient, remainder)
}

/// Two's complement negation of a 128 bit value held as halves.
#[inline]
const fn negate(high: u64, low: u64) -> (u64, u64) {
    let low = (!low).wrapping_add(1);
    let high = (!high).wrapping_add((low == 0) as u64);
    (high, low)
}

/// Divides the 128 bit value `high:low` by `divisor`, returning `(quotient, remainder)`.
#[inline]
pub const fn checked_udiv128(high: u64, low: u64, divisor: u64) -> Result<(u64, u64), DivError> {
    if divisor == 0 {
        Err(DivError::DivideByZero)
    } else if high >= divisor {
        Err(DivError::Overflow)
    } else {
        Ok(divide_halves(high, low, divisor))
    }
}

/// Signed [`checked_udiv128`]. The quotient truncates toward zero and the remainder has the sign
/// of the dividend.
pub const fn checked_div128(high: i64, low: i64, divisor: i64) -> Result<(i64, i64), DivError> {
    if divisor == 0 {
        return Err(DivError::DivideByZero);
    }
    let negative = high < 0;
    let (mag_high, mag_low) = if negative {
        negate(high as u64, low as u64)
    } else {
        (high as u64, low as u64)
    };
    let magnitude = divisor.unsigned_abs();
    if mag_high >= magnitude {
        return Err(DivError::Overflow);
    }
    let (quotient, remainder) = divide_halves(mag_high, mag_low, magnitude);

    let quotient = if negative != (divisor < 0) {
        if quotient > 1 << 63 {
            return Err(DivError::Overflow);
        }
        (quotient as i64).wrapping_neg()
    } else {
        if quotient >= 1 << 63 {
            return Err(DivError::Overflow);
        }
        quotient as i64
    };
    // remainder < magnitude <= 2^63
    let remainder = if negative {
        (remainder as i64).wrapping_neg()
    } else {
        remainder as i64
    };
    Ok((quotient, remainder))
}

/// Like [`checked_udiv128`].
///
/// # Panics
///
/// Panics if `divisor` is zero or the quotient does not fit in 64 bits.
#[inline]
pub const fn udiv128(high: u64, low: u64, divisor: u64) -> (u64, u64) {
    match checked_udiv128(high, low, divisor) {
        Ok(result) => result,
        Err(DivError::DivideByZero) => panic!("udiv128: division by zero"),
        Err(DivError::Overflow) => panic!("udiv128: quotient does not fit in 64 bits"),
    }
}

/// Like [`checked_div128`].
///
/// # Panics
///
/// Panics if `divisor` is zero or the quotient does not fit in 64 bits.
#[inline]
pub const fn div128(high: i64, low: i64, divisor: i64) -> (i64, i64) {
    match checked_div128(high, low, divisor) {
        Ok(result) => result,
        Err(DivError::DivideByZero) => panic!("div128: division by zero"),
        Err(DivError::Overflow) => panic!("div128: quotient does not fit in 64 bits"),
    }
}

/// Trailing zeros by binary search. `ctz64(0) == 64`.
pub const fn ctz64(x: u64) -> u32 {
    if x == 0 {
        return 64;
    }
    let mut x = x;
    let mut n = 0;
    if x & 0xFFFF_FFFF == 0 {
        n += 32;
        x >>= 32;
    }
    if x & 0xFFFF == 0 {
        n += 16;
        x >>= 16;
    }
    if x & 0xFF == 0 {
        n += 8;
        x >>= 8;
    }
    if x & 0xF == 0 {
        n += 4;
        x >>= 4;
    }
    if x & 0x3 == 0 {
        n += 2;
        x >>= 2;
    }
    if x & 0x1 == 0 {
        n += 1;
    }
    n
}

/// Leading zeros by binary search. `clz64(0) == 64`.
pub const fn clz64(x: u64) -> u32 {
    if x == 0 {
        return 64;
    }
    let mut x = x;
    let mut n = 0;
    if x >> 32 == 0 {
        n += 32;
        x <<= 32;
    }
    if x >> 48 == 0 {
        n += 16;
        x <<= 16;
    }
    if x >> 56 == 0 {
        n += 8;
        x <<= 8;
    }
    if x >> 60 == 0 {
        n += 4;
        x <<= 4;
    }
    if x >> 62 == 0 {
        n += 2;
        x <<= 2;
    }
    if x >> 63 == 0 {
        n += 1;
    }
    n
}

/// `ctz128(0) == 128`.
#[inline]
pub const fn ctz128(x: u128) -> u32 {
    let (high, low) = split(x);
    if low != 0 {
        ctz64(low)
    } else {
        ctz64(high) + 64
    }
}

/// `clz128(0) == 128`.
#[inline]
pub const fn clz128(x: u128) -> u32 {
    let (high, low) = split(x);
    if high != 0 {
        clz64(high)
    } else {
        clz64(low) + 64
    }
}

/// The shift and mask backend.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Portable;

impl Primitives for Portable {
    #[inline]
    fn rol8(x: u8, n: u8) -> u8 {
        rol8(x, n)
    }

    #[inline]
    fn ror8(x: u8, n: u8) -> u8 {
        ror8(x, n)
    }

    #[inline]
    fn rol16(x: u16, n: u16) -> u16 {
        rol16(x, n)
    }

    #[inline]
    fn ror16(x: u16, n: u16) -> u16 {
        ror16(x, n)
    }

    #[inline]
    fn rol32(x: u32, n: u32) -> u32 {
        rol32(x, n)
    }

    #[inline]
    fn ror32(x: u32, n: u32) -> u32 {
        ror32(x, n)
    }

    #[inline]
    fn rol64(x: u64, n: u64) -> u64 {
        rol64(x, n)
    }

    #[inline]
    fn ror64(x: u64, n: u64) -> u64 {
        ror64(x, n)
    }

    #[inline]
    fn umulh64(a: u64, b: u64) -> u64 {
        umulh64(a, b)
    }

    #[inline]
    fn mulh64(a: i64, b: i64) -> i64 {
        mulh64(a, b)
    }

    #[inline]
    fn checked_udiv128(high: u64, low: u64, divisor: u64) -> Result<(u64, u64), DivError> {
        checked_udiv128(high, low, divisor)
    }

    #[inline]
    fn checked_div128(high: i64, low: i64, divisor: i64) -> Result<(i64, i64), DivError> {
        checked_div128(high, low, divisor)
    }

    #[inline]
    fn udiv128(high: u64, low: u64, divisor: u64) -> (u64, u64) {
        udiv128(high, low, divisor)
    }

    #[inline]
    fn div128(high: i64, low: i64, divisor: i64) -> (i64, i64) {
        div128(high, low, divisor)
    }

    #[inline]
    fn ctz64(x: u64) -> u32 {
        ctz64(x)
    }

    #[inline]
    fn clz64(x: u64) -> u32 {
        clz64(x)
    }

    #[inline]
    fn ctz128(x: u128) -> u32 {
        ctz128(x)
    }

    #[inline]
    fn clz128(x: u128) -> u32 {
        clz128(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROTATED: u32 = rol32(0x8000_0001, 1);
    const HIGH: u64 = umulh64(u64::MAX, u64::MAX);
    const ZEROS: u32 = ctz128(0);

    #[test]
    fn const_evaluable() {
        assert_eq!(ROTATED, 3);
        assert_eq!(HIGH, u64::MAX - 1);
        assert_eq!(ZEROS, 128);
    }

    #[test]
    fn rotate_by_width_is_identity() {
        assert_eq!(rol8(0xA5, 8), 0xA5);
        assert_eq!(ror16(0xBEEF, 16), 0xBEEF);
        assert_eq!(rol32(0xDEAD_BEEF, 32), 0xDEAD_BEEF);
        assert_eq!(ror64(0x0123_4567_89AB_CDEF, 64), 0x0123_4567_89AB_CDEF);
        assert_eq!(rol8(0x81, 9), 0x03);
    }

    #[test]
    fn signed_high_multiply() {
        assert_eq!(mulh64(-1, 1), -1);
        assert_eq!(mulh64(-1, -1), 0);
        assert_eq!(mulh64(i64::MIN, i64::MIN), 1 << 62);
        assert_eq!(mulh64(i64::MIN, i64::MAX), -(1 << 62));
        assert_eq!(mulh64(i64::MAX, 2), 0);
    }

    #[test]
    fn halves() {
        let x = 0x0123_4567_89AB_CDEF_FEDC_BA98_7654_3210u128;
        assert_eq!(split(x), (0x0123_4567_89AB_CDEF, 0xFEDC_BA98_7654_3210));
        assert_eq!(join(0x0123_4567_89AB_CDEF, 0xFEDC_BA98_7654_3210), x);
        assert_eq!(negate(0, 1), (u64::MAX, u64::MAX));
        assert_eq!(negate(0, 0), (0, 0));
    }

    #[test]
    fn signed_division_edges() {
        // -2^63 * 1 = i64::MIN fits, i64::MIN / -1 overflows
        assert_eq!(checked_div128(-1, i64::MIN, 1), Ok((i64::MIN, 0)));
        assert_eq!(checked_div128(-1, i64::MIN, -1), Err(DivError::Overflow));
        assert_eq!(checked_div128(-1, -7, 2), Ok((-3, -1)));
        assert_eq!(checked_div128(0, 7, -2), Ok((-3, 1)));
        assert_eq!(checked_div128(0, 1 << 62, 1), Ok((1 << 62, 0)));
        assert_eq!(checked_div128(0, i64::MIN, 1), Err(DivError::Overflow));
    }
}
