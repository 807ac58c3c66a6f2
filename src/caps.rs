//! Runtime description of the cpu, used to pick backends once.

use crate::num::NumBackend;
use cfg_if::cfg_if;
use lazy_static::lazy_static;
use tracing::debug;

/// Optional instruction set extensions relevant to `hwprim`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Capabilities {
    /// Restricted transactional memory (`xbegin`/`xend`).
    pub htm:    bool,
    /// Native rotate and 64 by 64 bit multiply high instructions.
    pub rotate: bool,
}

lazy_static! {
    static ref DETECTED: Capabilities = {
        let caps = Capabilities::detect();
        debug!(?caps, "detected cpu capabilities");
        caps
    };
}

cfg_if! {
    if #[cfg(any(target_arch = "x86", target_arch = "x86_64"))] {
        fn query_cpu() -> Capabilities {
            Capabilities {
                htm:    hwprim_htm::htm_supported(),
                rotate: true,
            }
        }
    } else if #[cfg(any(
        target_arch = "aarch64",
        target_arch = "arm",
        target_arch = "powerpc64",
        target_arch = "riscv64"
    ))] {
        fn query_cpu() -> Capabilities {
            Capabilities {
                rotate: true,
                ..Capabilities::portable()
            }
        }
    } else {
        fn query_cpu() -> Capabilities {
            Capabilities::portable()
        }
    }
}

impl Capabilities {
    /// A cpu with none of the optional extensions.
    pub const fn portable() -> Self {
        Capabilities {
            htm:    false,
            rotate: false,
        }
    }

    /// Queries the running cpu.
    #[inline]
    pub fn detect() -> Self {
        query_cpu()
    }

    /// The capabilities of the running cpu, detected on first use.
    #[inline]
    pub fn get() -> Self {
        *DETECTED
    }

    /// The numeric backend to use on a cpu with these capabilities.
    #[inline]
    pub fn numeric_backend(&self) -> NumBackend {
        if self.rotate {
            NumBackend::Hardware
        } else {
            NumBackend::Portable
        }
    }
}
