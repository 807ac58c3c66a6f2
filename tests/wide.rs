mod wide {
    use hwprim::num::{self, DivError, Hardware, NumBackend, Portable, Primitives};
    use proptest::prelude::*;

    const BACKENDS: [NumBackend; 2] = [NumBackend::Hardware, NumBackend::Portable];

    const EDGES_U64: [u64; 7] = [0, 1, 2, 0xFFFF_FFFF, 0x1_0000_0000, u64::MAX - 1, u64::MAX];
    const EDGES_I64: [i64; 9] = [0, 1, -1, 2, -2, i64::MAX, i64::MIN, i64::MIN + 1, i64::MAX - 1];

    fn join(high: u64, low: u64) -> u128 {
        (high as u128) << 64 | low as u128
    }

    fn join_signed(high: i64, low: i64) -> i128 {
        join(high as u64, low as u64) as i128
    }

    fn reference_div(high: i64, low: i64, divisor: i64) -> Result<(i64, i64), DivError> {
        if divisor == 0 {
            return Err(DivError::DivideByZero);
        }
        let dividend = join_signed(high, low);
        let quotient = dividend
            .checked_div(divisor as i128)
            .and_then(|quotient| i64::try_from(quotient).ok())
            .ok_or(DivError::Overflow)?;
        Ok((quotient, (dividend % divisor as i128) as i64))
    }

    /// A divisor and a high half below it, so the quotient always fits.
    fn in_range() -> impl Strategy<Value = (u64, u64, u64)> {
        (1u64.., any::<u64>(), any::<u64>()).prop_map(|(divisor, high, low)| (high % divisor, low, divisor))
    }

    proptest! {
        #[test]
        fn umulh64_matches_u128(a: u64, b: u64) {
            let expected = ((a as u128 * b as u128) >> 64) as u64;
            for backend in BACKENDS {
                prop_assert_eq!(backend.umulh64(a, b), expected);
            }
            prop_assert_eq!(num::umulh64(a, b), expected);
        }

        #[test]
        fn mulh64_matches_i128(a: i64, b: i64) {
            let expected = ((a as i128 * b as i128) >> 64) as i64;
            for backend in BACKENDS {
                prop_assert_eq!(backend.mulh64(a, b), expected);
            }
            prop_assert_eq!(num::mulh64(a, b), expected);
        }

        #[test]
        fn udiv128_identity((high, low, divisor) in in_range()) {
            let mut remainder = u64::MAX;
            let quotient = num::udiv128(high, low, divisor, Some(&mut remainder));
            prop_assert!(remainder < divisor);
            prop_assert_eq!(quotient as u128 * divisor as u128 + remainder as u128, join(high, low));
            prop_assert_eq!(num::udiv128(high, low, divisor, None), quotient);
            for backend in BACKENDS {
                prop_assert_eq!(backend.udiv128(high, low, divisor), (quotient, remainder));
            }
        }

        #[test]
        fn checked_udiv128_agrees(high: u64, low: u64, divisor: u64) {
            let expected = if divisor == 0 {
                Err(DivError::DivideByZero)
            } else if high >= divisor {
                Err(DivError::Overflow)
            } else {
                let dividend = join(high, low);
                Ok(((dividend / divisor as u128) as u64, (dividend % divisor as u128) as u64))
            };
            prop_assert_eq!(Hardware::checked_udiv128(high, low, divisor), expected);
            prop_assert_eq!(Portable::checked_udiv128(high, low, divisor), expected);
            prop_assert_eq!(num::checked_udiv128(high, low, divisor), expected);
        }

        #[test]
        fn div128_matches_i128(quotient: i64, divisor: i64, remainder: u64) {
            prop_assume!(divisor != 0);
            // build a dividend that is known to be in range, with a remainder of either sign
            let remainder = (remainder % divisor.unsigned_abs()) as i128;
            let product = quotient as i128 * divisor as i128;
            let remainder = if product < 0 { -remainder } else { remainder };
            let dividend = product + remainder;
            let (high, low) = ((dividend >> 64) as i64, dividend as i64);

            let expected = reference_div(high, low, divisor);
            prop_assert!(expected.is_ok());
            let mut rem = 0;
            let quotient = num::div128(high, low, divisor, Some(&mut rem));
            prop_assert_eq!(Ok((quotient, rem)), expected);
            for backend in BACKENDS {
                prop_assert_eq!(backend.checked_div128(high, low, divisor), expected);
            }
        }

        #[test]
        fn checked_div128_agrees(high: i64, low: i64, divisor: i64) {
            let expected = reference_div(high, low, divisor);
            prop_assert_eq!(Hardware::checked_div128(high, low, divisor), expected);
            prop_assert_eq!(Portable::checked_div128(high, low, divisor), expected);
        }
    }

    #[test]
    fn multiply_edges() {
        for a in EDGES_U64 {
            for b in EDGES_U64 {
                let expected = ((a as u128 * b as u128) >> 64) as u64;
                assert_eq!(Hardware::umulh64(a, b), expected, "umulh64({a:#x}, {b:#x})");
                assert_eq!(Portable::umulh64(a, b), expected, "umulh64({a:#x}, {b:#x})");
            }
        }
        for a in EDGES_I64 {
            for b in EDGES_I64 {
                let expected = ((a as i128 * b as i128) >> 64) as i64;
                assert_eq!(Hardware::mulh64(a, b), expected, "mulh64({a}, {b})");
                assert_eq!(Portable::mulh64(a, b), expected, "mulh64({a}, {b})");
            }
        }
        assert_eq!(num::umulh64(u64::MAX, u64::MAX), u64::MAX - 1);
        assert_eq!(num::mulh64(i64::MIN, i64::MIN), 1 << 62);
        assert_eq!(num::mulh64(-1, 1), -1);
    }

    #[test]
    fn divide_edges() {
        for high in EDGES_I64 {
            for low in EDGES_I64 {
                for divisor in EDGES_I64 {
                    let expected = reference_div(high, low, divisor);
                    assert_eq!(
                        Hardware::checked_div128(high, low, divisor),
                        expected,
                        "div128({high}, {low}, {divisor})"
                    );
                    assert_eq!(
                        Portable::checked_div128(high, low, divisor),
                        expected,
                        "div128({high}, {low}, {divisor})"
                    );
                }
            }
        }
    }

    #[test]
    fn signed_division_truncates() {
        let mut remainder = 0;
        assert_eq!(num::div128(-1, -7, 2, Some(&mut remainder)), -3);
        assert_eq!(remainder, -1);
        assert_eq!(num::div128(0, 7, -2, Some(&mut remainder)), -3);
        assert_eq!(remainder, 1);
        assert_eq!(num::div128(-1, i64::MIN, 2, None), -(1 << 62));
    }

    #[test]
    fn division_errors() {
        assert_eq!(num::checked_udiv128(0, 1, 0), Err(DivError::DivideByZero));
        assert_eq!(num::checked_udiv128(1, 0, 1), Err(DivError::Overflow));
        assert_eq!(num::checked_udiv128(u64::MAX, 0, u64::MAX), Err(DivError::Overflow));
        assert_eq!(num::checked_div128(0, 1, 0), Err(DivError::DivideByZero));
        // -2^63 / -1 = 2^63
        assert_eq!(num::checked_div128(-1, i64::MIN, -1), Err(DivError::Overflow));
        assert_eq!(num::checked_div128(-1, i64::MIN, 1), Ok((i64::MIN, 0)));
        assert_eq!(DivError::Overflow.to_string(), "quotient does not fit in 64 bits");
    }

    #[test]
    #[should_panic]
    fn udiv128_by_zero_panics() {
        let _ = num::udiv128(0, 1, 0, None);
    }

    #[test]
    #[should_panic]
    fn udiv128_overflow_panics() {
        let _ = num::udiv128(2, 0, 2, None);
    }

    #[test]
    #[should_panic]
    fn div128_overflow_panics() {
        let _ = num::div128(-1, i64::MIN, -1, None);
    }

    #[test]
    #[should_panic]
    fn portable_udiv128_overflow_panics() {
        let _ = Portable::udiv128(1, 0, 1);
    }
}
