//! Running operations inside hardware transactions.
//!
//! [`TxHelper`] runs an operation inside a hardware transaction, retrying on aborts until the
//! operation commits, the hardware reports that retrying is pointless, or the cycle budget from
//! [`HtmConfig`] runs out. Failure is always a possibility, so every caller needs a
//! non-transactional fallback path.
//!
//! # Examples
//!
//! ```
//! use hwprim::tx;
//! use std::sync::atomic::{AtomicU64, Ordering::Relaxed};
//!
//! static A: AtomicU64 = AtomicU64::new(1);
//! static B: AtomicU64 = AtomicU64::new(2);
//!
//! // swap `A` and `B` atomically if a transaction commits, otherwise under some fallback lock
//! let swap = || {
//!     let a = A.load(Relaxed);
//!     A.store(B.load(Relaxed), Relaxed);
//!     B.store(a, Relaxed);
//! };
//! if !tx::global().start_unit(swap) {
//!     // fallback path
//!     swap();
//! }
//! assert_eq!((A.load(Relaxed), B.load(Relaxed)), (2, 1));
//! ```

use crate::{
    backend::{Hardware, TxBackend},
    config::HtmConfig,
    internal::stats,
};
use core::fmt::{self, Debug, Display, Formatter};
use hwprim_htm::BeginCode;
use lazy_static::lazy_static;
use tracing::{debug, trace, warn};

/// An error type indicating that the operation was not committed in a transaction.
///
/// The reason (disabled, budget exhausted, or an abort the hardware advised against retrying) is
/// deliberately not exposed. The operation may have been attempted, but none of its memory
/// effects are visible.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Error {
    _private: (),
}

impl Debug for Error {
    #[cold]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.pad("Error { .. }")
    }
}

impl Display for Error {
    #[cold]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.pad("the transaction did not commit")
    }
}

impl std::error::Error for Error {}

impl Error {
    pub(crate) const FAILED: Self = Error { _private: () };
}

/// The outcome of one transaction attempt.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    /// The operation ran and its effects became visible atomically.
    Committed,
    /// Another thread touched the same memory, or the hardware otherwise hinted that a retry
    /// may succeed.
    Conflict,
    /// The transaction touched more memory than the hardware can track.
    CapacityAbort,
    /// The hardware aborted without any reason bits set. Retrying is pointless.
    ExplicitAbort,
    /// No transaction was attempted.
    Disabled,
}

impl Status {
    /// Classifies the status word of an aborted transaction.
    ///
    /// ```
    /// use hwprim::{htm::BeginCode, tx::Status};
    ///
    /// assert_eq!(Status::from_abort(BeginCode::NO_HINT), Status::ExplicitAbort);
    /// assert_eq!(Status::from_abort(BeginCode::CAPACITY), Status::CapacityAbort);
    /// assert_eq!(Status::from_abort(BeginCode::CONFLICT), Status::Conflict);
    /// assert_eq!(Status::from_abort(BeginCode::explicit(3)), Status::Conflict);
    /// ```
    #[inline]
    pub fn from_abort(code: BeginCode) -> Self {
        debug_assert!(!code.is_started(), "classifying a running transaction");
        if code.is_no_hint() {
            Status::ExplicitAbort
        } else if code.is_capacity() {
            Status::CapacityAbort
        } else {
            Status::Conflict
        }
    }

    /// Returns whether another attempt may succeed.
    #[inline]
    pub fn is_retryable(self) -> bool {
        match self {
            Status::Conflict | Status::CapacityAbort => true,
            Status::Committed | Status::ExplicitAbort | Status::Disabled => false,
        }
    }
}

/// Book keeping for a single call to the helper.
struct Attempt {
    first:     u64,
    count:     usize,
    conflicts: usize,
    last:      Status,
}

impl Attempt {
    #[inline]
    fn new(first: u64) -> Self {
        Attempt {
            first,
            count: 0,
            conflicts: 0,
            last: Status::Disabled,
        }
    }

    #[inline]
    fn within(&self, now: u64, budget: u64) -> bool {
        now.wrapping_sub(self.first) <= budget
    }

    #[inline]
    fn aborted(&mut self, status: Status) {
        self.last = status;
        match status {
            Status::Conflict => self.conflicts += 1,
            Status::CapacityAbort => stats::tx_capacity_aborts(),
            _ => {}
        }
    }

    #[inline]
    fn committed(self) {
        stats::tx_attempts(self.count);
        stats::tx_conflicts(self.conflicts);
        stats::tx_commits();
    }

    #[cold]
    #[inline(never)]
    fn gave_up(self) {
        stats::tx_attempts(self.count);
        stats::tx_conflicts(self.conflicts);
        if self.last == Status::ExplicitAbort {
            stats::tx_explicit_aborts();
        } else {
            stats::tx_budget_exhausted();
        }
        trace!(
            attempts = self.count,
            conflicts = self.conflicts,
            last = ?self.last,
            "transaction abandoned"
        );
    }
}

/// Runs operations inside hardware transactions with bounded retry.
///
/// `TxHelper` is immutable once built, and can be shared between threads if its backend can.
///
/// # Operations
///
/// An aborted attempt rolls back every memory write of the operation, and the operation may run
/// many times before it commits. It must only touch plain memory: no I/O, no system calls, no
/// panics. Anything the operation wants to report should be returned.
#[derive(Debug)]
pub struct TxHelper<B = Hardware> {
    config:  HtmConfig,
    backend: B,
}

impl TxHelper<Hardware> {
    /// A helper using RTM, if the running cpu supports it.
    ///
    /// On cpus without RTM every call fails without running the operation, regardless of
    /// `config`.
    pub fn new(config: HtmConfig) -> Self {
        TxHelper::with_hardware(config, Hardware::detect())
    }

    fn with_hardware(config: HtmConfig, backend: Hardware) -> Self {
        if config.is_active() && !backend.is_available() {
            warn!("hardware transactions are enabled but not supported by this cpu");
        }
        TxHelper::with_backend(config, backend)
    }
}

impl<B: TxBackend> TxHelper<B> {
    #[inline]
    pub const fn with_backend(config: HtmConfig, backend: B) -> Self {
        TxHelper { config, backend }
    }

    #[inline]
    pub fn config(&self) -> HtmConfig {
        self.config
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns whether calls may attempt a transaction at all.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.config.is_active() && self.backend.is_available()
    }

    /// Runs `op` inside a transaction, returning its result if it committed.
    ///
    /// # Examples
    ///
    /// ```
    /// use hwprim::{backend::Simulated, config::HtmConfig, tx::TxHelper};
    ///
    /// let helper = TxHelper::with_backend(HtmConfig::default(), Simulated::new());
    /// assert_eq!(helper.try_start(|| "done"), Ok("done"));
    ///
    /// let disabled = TxHelper::with_backend(HtmConfig::DISABLED, Simulated::new());
    /// assert!(disabled.try_start(|| "done").is_err());
    /// ```
    #[inline]
    pub fn try_start<F, R>(&self, mut op: F) -> Result<R, Error>
    where
        F: FnMut() -> R,
    {
        if unlikely!(!self.is_enabled()) {
            stats::tx_disabled();
            return Err(Error::FAILED);
        }

        let budget = self.config.cycle_budget();
        let mut attempt = Attempt::new(self.backend.timestamp());
        let mut now = attempt.first;
        while attempt.within(now, budget) {
            attempt.count += 1;
            match self.backend.begin() {
                Ok(guard) => {
                    let result = op();
                    self.backend.commit(guard);
                    attempt.committed();
                    return Ok(result);
                }
                Err(code) => {
                    let status = Status::from_abort(code);
                    attempt.aborted(status);
                    if !status.is_retryable() {
                        break;
                    }
                }
            }
            now = self.backend.timestamp();
        }
        attempt.gave_up();
        Err(Error::FAILED)
    }

    /// Runs `op` inside a transaction.
    ///
    /// Returns `(true, result)` if it committed, and `(false, R::default())` otherwise.
    #[inline]
    pub fn start<F, R>(&self, op: F) -> (bool, R)
    where
        F: FnMut() -> R,
        R: Default,
    {
        match self.try_start(op) {
            Ok(result) => (true, result),
            Err(_) => (false, R::default()),
        }
    }

    /// Runs `op` inside a transaction, returning whether it committed.
    #[inline]
    pub fn start_unit<F>(&self, op: F) -> bool
    where
        F: FnMut(),
    {
        likely!(self.try_start(op).is_ok())
    }
}

lazy_static! {
    static ref GLOBAL: TxHelper = {
        let config = HtmConfig::from_env().unwrap_or_else(|error| {
            warn!(%error, "ignoring malformed transaction configuration");
            HtmConfig::default()
        });
        let helper = TxHelper::new(config);
        debug!(?config, enabled = helper.is_enabled(), "global transaction helper");
        helper
    };
}

/// The process wide helper, configured from the environment on first use.
///
/// See [`HtmConfig::from_env`].
#[inline]
pub fn global() -> &'static TxHelper {
    &GLOBAL
}

/// [`TxHelper::start`] on the [`global`] helper.
#[inline]
pub fn tx_start<F, R>(op: F) -> (bool, R)
where
    F: FnMut() -> R,
    R: Default,
{
    global().start(op)
}

/// [`TxHelper::start_unit`] on the [`global`] helper.
#[inline]
pub fn tx_start_unit<F>(op: F) -> bool
where
    F: FnMut(),
{
    global().start_unit(op)
}
