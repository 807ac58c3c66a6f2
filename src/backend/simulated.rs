use crate::backend::TxBackend;
use crossbeam_utils::CachePadded;
use hwprim_htm::BeginCode;
use std::{
    fmt::{self, Debug, Formatter},
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
};

type AbortHook = dyn Fn(u64) -> Option<BeginCode> + Send + Sync;

#[derive(Debug, Default)]
struct ConflictDomain {
    owned: CachePadded<AtomicBool>,
}

/// A software stand in for hardware transactions.
///
/// All clones of a `Simulated` share one conflict domain. A transaction owns the whole domain
/// from `begin` until `commit`; a clone beginning while the domain is owned aborts with
/// [`BeginCode::CONFLICT`], just as a hardware transaction touching the same cache line would.
///
/// Attempts only ever abort at `begin`, so an operation is never partially applied. An optional
/// hook can inject aborts: it receives the attempt number of this instance (starting at zero) and
/// returns the abort status to report, or `None` to let the attempt proceed.
///
/// Timestamps are a logical clock ticking once per call, so a budget of `n` allows `n + 1`
/// attempts.
///
/// # Examples
///
/// ```
/// use hwprim::{backend::Simulated, config::HtmConfig, htm::BeginCode, tx::TxHelper};
///
/// let backend = Simulated::new().with_hook(|attempt| {
///     if attempt < 2 {
///         Some(BeginCode::CONFLICT)
///     } else {
///         None
///     }
/// });
/// let helper = TxHelper::with_backend(HtmConfig::new(true, 100), backend);
/// assert_eq!(helper.start(|| 7), (true, 7));
/// assert_eq!(helper.backend().attempts(), 3);
/// ```
pub struct Simulated {
    domain:   Arc<ConflictDomain>,
    hook:     Option<Arc<AbortHook>>,
    clock:    AtomicU64,
    attempts: AtomicU64,
    aborts:   AtomicU64,
    commits:  AtomicU64,
}

impl Debug for Simulated {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Simulated")
            .field("hook", &self.hook.is_some())
            .field("attempts", &self.attempts())
            .field("aborts", &self.aborts())
            .field("commits", &self.commits())
            .finish()
    }
}

impl Default for Simulated {
    fn default() -> Self {
        Simulated::new()
    }
}

/// Shares the conflict domain and the hook. Counters and the clock start over.
impl Clone for Simulated {
    fn clone(&self) -> Self {
        Simulated {
            domain:   Arc::clone(&self.domain),
            hook:     self.hook.clone(),
            clock:    AtomicU64::new(0),
            attempts: AtomicU64::new(0),
            aborts:   AtomicU64::new(0),
            commits:  AtomicU64::new(0),
        }
    }
}

impl Simulated {
    pub fn new() -> Self {
        Simulated {
            domain:   Arc::default(),
            hook:     None,
            clock:    AtomicU64::new(0),
            attempts: AtomicU64::new(0),
            aborts:   AtomicU64::new(0),
            commits:  AtomicU64::new(0),
        }
    }

    /// Injects aborts. See the type level documentation.
    pub fn with_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(u64) -> Option<BeginCode> + Send + Sync + 'static,
    {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Number of times `begin` was called.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Acquire)
    }

    /// Number of times `begin` aborted.
    pub fn aborts(&self) -> u64 {
        self.aborts.load(Ordering::Acquire)
    }

    /// Number of committed transactions.
    pub fn commits(&self) -> u64 {
        self.commits.load(Ordering::Acquire)
    }

    fn abort(&self, code: BeginCode) -> Result<SimulatedTx, BeginCode> {
        let _ = self.aborts.fetch_add(1, Ordering::AcqRel);
        Err(code)
    }
}

/// A running simulated transaction. Dropping it without committing releases the domain.
#[derive(Debug)]
pub struct SimulatedTx {
    domain: Arc<ConflictDomain>,
}

impl Drop for SimulatedTx {
    #[inline]
    fn drop(&mut self) {
        self.domain.owned.store(false, Ordering::Release)
    }
}

unsafe impl TxBackend for Simulated {
    type Guard = SimulatedTx;

    #[inline]
    fn is_available(&self) -> bool {
        true
    }

    fn begin(&self) -> Result<SimulatedTx, BeginCode> {
        let attempt = self.attempts.fetch_add(1, Ordering::AcqRel);
        if let Some(code) = self.hook.as_ref().and_then(|hook| hook(attempt)) {
            debug_assert!(!code.is_started(), "abort hook returned `STARTED`");
            return self.abort(code);
        }
        match self
            .domain
            .owned
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Relaxed)
        {
            Ok(_) => Ok(SimulatedTx {
                domain: Arc::clone(&self.domain),
            }),
            Err(_) => self.abort(BeginCode::from_raw(
                BeginCode::CONFLICT.raw() | BeginCode::RETRY.raw(),
            )),
        }
    }

    fn commit(&self, guard: SimulatedTx) {
        drop(guard);
        let _ = self.commits.fetch_add(1, Ordering::AcqRel);
    }

    #[inline]
    fn timestamp(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }
}
