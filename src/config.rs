//! Configuration of the transaction helper.
//!
//! [`HtmConfig`] is an immutable value. Build it once at startup and move it into a
//! [`TxHelper`](crate::tx::TxHelper); there is no way to change it afterwards.

use std::num::ParseIntError;
use thiserror::Error;

/// Environment variable enabling or disabling hardware transactions.
///
/// Accepts `0`, `1`, `true`, `false`, `on`, `off` and `auto`. `auto` is the same as enabled:
/// transactions are used if the cpu supports them.
pub const ENV_ENABLE: &str = "HWPRIM_HTM";

/// Environment variable holding the retry budget, in timestamp counter ticks.
pub const ENV_CYCLE_BUDGET: &str = "HWPRIM_HTM_CYCLE_BUDGET";

/// An error produced while reading [`HtmConfig`] from the environment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("`{var}` must be one of 0, 1, true, false, on, off or auto, found `{value}`")]
    InvalidFlag { var: &'static str, value: String },

    #[error("`{var}` must be a cycle count, found `{value}`")]
    InvalidBudget {
        var:    &'static str,
        value:  String,
        #[source]
        source: ParseIntError,
    },
}

/// Whether hardware transactions may be used, and how long a single call may keep retrying.
///
/// # Examples
///
/// ```
/// use hwprim::config::HtmConfig;
///
/// let config = HtmConfig::new(true, 10_000);
/// assert!(config.is_active());
/// assert!(!HtmConfig::DISABLED.is_active());
/// assert!(!HtmConfig::new(true, 0).is_active());
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct HtmConfig {
    enabled:      bool,
    cycle_budget: u64,
}

impl Default for HtmConfig {
    #[inline]
    fn default() -> Self {
        HtmConfig::new(true, Self::DEFAULT_CYCLE_BUDGET)
    }
}

impl HtmConfig {
    /// Roughly 800ns on a 3GHz timestamp counter.
    pub const DEFAULT_CYCLE_BUDGET: u64 = 2_400;

    /// Never attempts a transaction.
    pub const DISABLED: Self = HtmConfig {
        enabled:      false,
        cycle_budget: 0,
    };

    #[inline]
    pub const fn new(enabled: bool, cycle_budget: u64) -> Self {
        HtmConfig {
            enabled,
            cycle_budget,
        }
    }

    /// Converts a budget in nanoseconds to timestamp counter ticks, given the counter frequency.
    ///
    /// ```
    /// use hwprim::config::HtmConfig;
    ///
    /// let config = HtmConfig::from_nanos(true, 800, 3_000_000_000);
    /// assert_eq!(config.cycle_budget(), 2_400);
    /// ```
    #[inline]
    pub const fn from_nanos(enabled: bool, nanos: u64, tsc_hz: u64) -> Self {
        let cycles = nanos as u128 * tsc_hz as u128 / 1_000_000_000;
        let cycle_budget = if cycles > u64::MAX as u128 {
            u64::MAX
        } else {
            cycles as u64
        };
        HtmConfig::new(enabled, cycle_budget)
    }

    #[inline]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub const fn cycle_budget(&self) -> u64 {
        self.cycle_budget
    }

    /// Returns whether a transaction helper using this config will ever begin a transaction.
    ///
    /// A zero budget leaves no time for even a single attempt.
    #[inline]
    pub const fn is_active(&self) -> bool {
        self.enabled && self.cycle_budget != 0
    }

    /// Reads [`ENV_ENABLE`] and [`ENV_CYCLE_BUDGET`]. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|var| std::env::var(var).ok())
    }

    /// Like [`from_env`](HtmConfig::from_env), reading variables through `lookup`.
    ///
    /// ```
    /// use hwprim::config::{HtmConfig, ENV_CYCLE_BUDGET, ENV_ENABLE};
    ///
    /// let config = HtmConfig::from_vars(|var| match var {
    ///     ENV_ENABLE => Some("off".to_owned()),
    ///     ENV_CYCLE_BUDGET => Some("5000".to_owned()),
    ///     _ => None,
    /// })
    /// .unwrap();
    /// assert_eq!(config, HtmConfig::new(false, 5000));
    /// ```
    pub fn from_vars<F>(mut lookup: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut config = HtmConfig::default();
        if let Some(value) = lookup(ENV_ENABLE) {
            config.enabled = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "on" | "auto" => true,
                "0" | "false" | "off" => false,
                _ => {
                    return Err(ConfigError::InvalidFlag {
                        var: ENV_ENABLE,
                        value,
                    })
                }
            };
        }
        if let Some(value) = lookup(ENV_CYCLE_BUDGET) {
            config.cycle_budget = match value.trim().parse() {
                Ok(cycle_budget) => cycle_budget,
                Err(source) => {
                    return Err(ConfigError::InvalidBudget {
                        var: ENV_CYCLE_BUDGET,
                        value,
                        source,
                    })
                }
            };
        }
        Ok(config)
    }
}
