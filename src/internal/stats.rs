use lazy_static::lazy_static;
use parking_lot::Mutex;
use std::{
    cell::RefCell,
    fmt::{self, Debug, Formatter},
};

#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
struct MinMaxTotal {
    min:   u64,
    max:   u64,
    total: u64,
}

/// A recorded distribution of sizes.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Size {
    min_max_total: Option<MinMaxTotal>,
    count:         u64,
}

impl Debug for Size {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Size")
            .field("count", &self.count)
            .field("min", &self.min())
            .field("max", &self.max())
            .field("total", &self.total())
            .field("avg", &self.avg())
            .finish()
    }
}

impl Size {
    pub(crate) fn record(&mut self, size: u64) {
        self.count += 1;
        if let Some(min_max_total) = &mut self.min_max_total {
            min_max_total.min = min_max_total.min.min(size);
            min_max_total.max = min_max_total.max.max(size);
            min_max_total.total += size;
        } else {
            self.min_max_total = Some(MinMaxTotal {
                min:   size,
                max:   size,
                total: size,
            });
        }
    }

    fn merge(&mut self, rhs: &Self) {
        self.count += rhs.count;
        self.min_max_total = match (self.min_max_total, rhs.min_max_total) {
            (Some(a), Some(b)) => Some(MinMaxTotal {
                min:   a.min.min(b.min),
                max:   a.max.max(b.max),
                total: a.total + b.total,
            }),
            (a, b) => a.or(b),
        };
    }

    /// Number of recorded samples.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn min(&self) -> Option<u64> {
        self.min_max_total.map(|x| x.min)
    }

    pub fn max(&self) -> Option<u64> {
        self.min_max_total.map(|x| x.max)
    }

    /// Sum of all recorded samples.
    pub fn total(&self) -> u64 {
        self.min_max_total.unwrap_or_default().total
    }

    pub fn avg(&self) -> Option<f64> {
        self.min_max_total
            .map(|x| x.total as f64 / self.count as f64)
    }
}

/// A counted event.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct Event {
    count: u64,
}

impl Event {
    fn happened(&mut self) {
        self.count += 1
    }

    fn merge(&mut self, rhs: &Self) {
        self.count += rhs.count
    }

    /// Number of times the event happened.
    pub fn count(&self) -> u64 {
        self.count
    }
}

macro_rules! stats_func {
    ($(#[$attr:meta])* $name:ident: Event) => {
        #[inline]
        $(#[$attr])*
        pub(crate) fn $name() {
            if cfg!(feature = "stats") {
                let _ = THREAD_STAT.try_with(|stat| (stat.borrow_mut().0).$name.happened());
            }
        }
    };
    ($(#[$attr:meta])* $name:ident: Size) => {
        #[inline]
        $(#[$attr])*
        pub(crate) fn $name(size: usize) {
            if cfg!(feature = "stats") {
                let size = size as u64;
                let _ = THREAD_STAT.try_with(|stat| (stat.borrow_mut().0).$name.record(size));
            }
        }
    };
}

macro_rules! stats {
    ($($(#[$attr:meta])* $names:ident: $kinds:tt),* $(,)*) => {
        /// Transaction statistics, recorded when the `stats` feature is enabled.
        #[derive(Clone, Default, Debug, PartialEq, Eq)]
        pub struct Stats {
            $($(#[$attr])* pub $names: $kinds),*
        }

        impl Stats {
            fn merge(&mut self, rhs: &Self) {
                $(self.$names.merge(&rhs.$names));*
            }
        }

        $(stats_func!{$(#[$attr])* $names: $kinds})*
    };
}

stats! {
    /// Number of attempts (begins) per call to the transaction helper that ran at least once.
    tx_attempts:         Size,

    /// Number of conflict aborts per call to the transaction helper.
    ///
    /// A call that conflicts 10 times and then commits records a single value of 10.
    tx_conflicts:        Size,

    /// An attempt aborted because the transaction ran out of hardware buffer space.
    tx_capacity_aborts: Event,

    /// A call that committed.
    tx_commits:         Event,

    /// A call that stopped retrying because the hardware gave no retry hint.
    tx_explicit_aborts: Event,

    /// A call that stopped retrying because the cycle budget was exhausted.
    tx_budget_exhausted: Event,

    /// A call that did not attempt a transaction at all.
    tx_disabled:        Event,
}

impl Stats {
    /// Number of calls to the transaction helper, successful or not.
    pub fn calls(&self) -> u64 {
        self.tx_commits.count
            + self.tx_explicit_aborts.count
            + self.tx_budget_exhausted.count
            + self.tx_disabled.count
    }

    pub fn print_summary(&self) {
        println!("{:#?}", self);

        let calls = self.calls();
        println!(
            "{:>12}: {:>12} {:>11}: {:.4} {:>12}: {:.4}",
            "tx calls",
            calls,
            "commit rate",
            self.tx_commits.count as f64 / calls as f64,
            "attempt avg",
            self.tx_attempts.total() as f64 / calls as f64,
        );
        println!(
            "{:>12}: {:>12} {:>11}: {:.4} {:>12}: {:.4}",
            "conflicts",
            self.tx_conflicts.total(),
            "per call",
            self.tx_conflicts.total() as f64 / calls as f64,
            "capacity",
            self.tx_capacity_aborts.count as f64 / calls as f64,
        );
    }
}

#[derive(Default)]
struct ThreadStats(Stats);

impl ThreadStats {
    fn flush(&mut self) {
        GLOBAL.lock().merge(&self.0);
        self.0 = Stats::default();
    }
}

impl Drop for ThreadStats {
    fn drop(&mut self) {
        self.flush()
    }
}

thread_local! {
    static THREAD_STAT: RefCell<ThreadStats> = RefCell::default();
}

lazy_static! {
    static ref GLOBAL: Mutex<Stats> = Mutex::default();
}

pub fn thread_flush() {
    if cfg!(feature = "stats") {
        let _ = THREAD_STAT.try_with(|stat| stat.borrow_mut().flush());
    }
}

pub fn snapshot() -> Stats {
    GLOBAL.lock().clone()
}

pub fn print_stats() {
    if cfg!(feature = "stats") {
        GLOBAL.lock().print_summary();
    } else {
        println!("`hwprim/stats` feature is not enabled")
    }
}
