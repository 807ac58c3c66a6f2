#![cfg(feature = "stats")]

mod stats {
    use hwprim::{backend::Simulated, config::HtmConfig, htm::BeginCode, stats, tx::TxHelper};

    #[test]
    fn records_outcomes() {
        let before = stats::snapshot();

        let backend = Simulated::new().with_hook(|attempt| {
            if attempt % 3 == 2 {
                None
            } else {
                Some(BeginCode::CONFLICT)
            }
        });
        let helper = TxHelper::with_backend(HtmConfig::new(true, 1_000), backend);
        assert!(helper.start_unit(|| ()));
        assert!(!TxHelper::with_backend(HtmConfig::DISABLED, Simulated::new()).start_unit(|| ()));
        stats::thread_flush();

        let after = stats::snapshot();
        assert!(after.tx_commits.count() > before.tx_commits.count());
        assert!(after.tx_disabled.count() > before.tx_disabled.count());
        assert!(after.tx_conflicts.total() >= before.tx_conflicts.total() + 2);
        assert!(after.tx_attempts.max() >= Some(3));
        assert!(after.calls() >= before.calls() + 2);
    }
}
