//! Backends that can run a transaction for [`TxHelper`](crate::tx::TxHelper).
//!
//! * [`Hardware`], Intel RTM through [`hwprim_htm`].
//! * [`NoTransaction`], never able to begin a transaction.
//! * [`Simulated`], a deterministic stand in for testing retry policies and conflicts.

mod simulated;

pub use self::simulated::{Simulated, SimulatedTx};

use crate::caps::Capabilities;
use hwprim_htm::{BeginCode, HardwareTx};

/// Something able to begin and commit transactions.
///
/// # Safety
///
/// When [`begin`](TxBackend::begin) returns `Err`, no memory effect of the attempt may remain
/// visible. When it returns `Ok`, everything done before the guard is passed to
/// [`commit`](TxBackend::commit) must become visible atomically, or be rolled back and reported
/// as an `Err` from the same `begin` call.
pub unsafe trait TxBackend {
    /// A running transaction.
    type Guard;

    /// Returns whether [`begin`](TxBackend::begin) may be called at all.
    fn is_available(&self) -> bool;

    fn begin(&self) -> Result<Self::Guard, BeginCode>;

    fn commit(&self, guard: Self::Guard);

    /// A monotonic tick count used to bound the time spent retrying.
    fn timestamp(&self) -> u64;
}

/// Hardware transactions using Intel RTM.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Hardware {
    available: bool,
}

impl Hardware {
    /// Uses RTM if the running cpu supports it.
    #[inline]
    pub fn detect() -> Self {
        Hardware {
            available: Capabilities::get().htm,
        }
    }

    /// A hardware backend that never begins a transaction.
    #[inline]
    pub const fn unavailable() -> Self {
        Hardware { available: false }
    }
}

unsafe impl TxBackend for Hardware {
    type Guard = HardwareTx;

    #[inline]
    fn is_available(&self) -> bool {
        self.available
    }

    #[inline(always)]
    fn begin(&self) -> Result<HardwareTx, BeginCode> {
        // xbegin raises #UD on cpus without RTM
        if unlikely!(!self.available) {
            return Err(BeginCode::NO_HINT);
        }
        unsafe { HardwareTx::begin() }
    }

    #[inline(always)]
    fn commit(&self, guard: HardwareTx) {
        guard.commit()
    }

    #[inline]
    fn timestamp(&self) -> u64 {
        hwprim_htm::timestamp()
    }
}

/// A backend for targets without transactional memory.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct NoTransaction;

unsafe impl TxBackend for NoTransaction {
    type Guard = ();

    #[inline]
    fn is_available(&self) -> bool {
        false
    }

    #[inline]
    fn begin(&self) -> Result<(), BeginCode> {
        Err(BeginCode::NO_HINT)
    }

    #[inline]
    fn commit(&self, _: ()) {}

    #[inline]
    fn timestamp(&self) -> u64 {
        0
    }
}
