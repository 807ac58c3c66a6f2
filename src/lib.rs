//! Hardware assisted primitives for interpreters and JITs.
//!
//! `hwprim` provides two independent families of low level operations:
//!
//! * [`tx`], a helper running an operation inside a hardware memory transaction (Intel RTM) with
//!   bounded retry, reporting failure when the caller should take a fallback path.
//! * [`num`], bit rotation, 128 bit multiply high and divide, and 128 bit zero counts, with a
//!   hardware backend and a portable backend that agree on every input.
//!
//! # Examples
//!
//! Running an operation inside a transaction, with a fallback:
//! ```
//! use hwprim::{config::HtmConfig, tx::TxHelper};
//! use std::sync::atomic::{AtomicUsize, Ordering::Relaxed};
//!
//! let helper = TxHelper::new(HtmConfig::default());
//! let counter = AtomicUsize::new(0);
//!
//! let (committed, previous) = helper.start(|| counter.fetch_add(1, Relaxed));
//! if !committed {
//!     // hardware transactions are unavailable, or kept aborting
//!     counter.fetch_add(1, Relaxed);
//! }
//! assert_eq!(counter.load(Relaxed), 1);
//! assert_eq!(previous, 0);
//! ```
//!
//! Numeric primitives:
//! ```
//! use hwprim::num;
//!
//! assert_eq!(num::ror32(1, 1), 1 << 31);
//! assert_eq!(num::mulh64(-2, i64::MAX), -1);
//! assert_eq!(num::ctz128(1 << 100), 100);
//! ```
//!
//! # Features
//!
//! * `stats` records transaction attempts and outcomes, see [`stats`].
//! * `nightly` forwards to the `nightly` features of dependencies.
//!
//! [`tx`]: tx/index.html
//! [`num`]: num/index.html
//! [`stats`]: stats/index.html

#![warn(macro_use_extern_crate)]
#![warn(missing_debug_implementations)]
#![warn(unused_lifetimes)]
#![cfg_attr(not(test), warn(unused_results))]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rust_2018_compatibility)]
#![deny(rust_2018_idioms)]
#![deny(unused_must_use)]

#[macro_use]
mod internal;

pub mod backend;
pub mod caps;
pub mod config;
pub mod num;
pub mod prefetch;
pub mod stats;
pub mod tx;

pub use tx::{tx_start, tx_start_unit};
#[doc(inline)]
pub use hwprim_htm as htm;
