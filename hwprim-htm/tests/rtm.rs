mod rtm {
    use hwprim_htm::{htm_supported, in_transaction, BeginCode, HardwareTx};

    const MAX_TRIES: usize = 10_000;

    #[test]
    fn outside_transaction() {
        assert!(!in_transaction());
    }

    #[test]
    fn commit() {
        if !htm_supported() {
            return;
        }
        let mut value = 0usize;
        let mut inside = false;
        for _ in 0..MAX_TRIES {
            match unsafe { HardwareTx::begin() } {
                Ok(htx) => {
                    value += 1;
                    inside = in_transaction();
                    htx.commit();
                    break;
                }
                Err(code) => assert!(!code.is_started()),
            }
        }
        assert_eq!(value, 1, "no transaction committed in {} tries", MAX_TRIES);
        assert!(inside);
        assert!(!in_transaction());
    }

    #[test]
    fn explicit_abort_rolls_back() {
        if !htm_supported() {
            return;
        }
        let mut value = 0usize;
        let mut last = BeginCode::NO_HINT;
        for _ in 0..MAX_TRIES {
            match unsafe { HardwareTx::begin() } {
                Ok(htx) => {
                    value = 42;
                    htx.abort()
                }
                Err(code) => {
                    last = code;
                    if code.is_explicit() {
                        break;
                    }
                }
            }
        }
        assert_eq!(value, 0);
        assert_eq!(last.abort_code(), Some(HardwareTx::ABORT_CODE));
    }
}
