//! Logging macros gated on a module-level `ENABLE_LOGS` flag.
//!
//! A module opts in by defining the flag and importing the macros from the
//! crate root:
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//!
//! use crate::{log_debug, log_info, log_warn, log_error};
//!
//! log_info!("context switch {} -> {}", from, to);
//! ```
//! Flipping the flag to `false` silences the module without touching the
//! global `RUST_LOG` filter.

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::debug!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!($($arg)*);
        }
    };
}

/// Install the global logger. `RUST_LOG` still wins over `default_level`.
pub fn init(default_level: log::LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .try_init();
}
