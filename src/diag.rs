//! Logging helpers that honour `suppress_logs`.
//!
//! A suppressed scan still emits its events, one level down at `debug`.

/// `warn!`, or `debug!` when the first argument is true.
macro_rules! scan_warn {
    ($quiet:expr, $($arg:tt)+) => {
        if $quiet {
            tracing::debug!($($arg)+);
        } else {
            tracing::warn!($($arg)+);
        }
    };
}

/// `info!`, or `debug!` when the first argument is true.
macro_rules! scan_info {
    ($quiet:expr, $($arg:tt)+) => {
        if $quiet {
            tracing::debug!($($arg)+);
        } else {
            tracing::info!($($arg)+);
        }
    };
}

pub(crate) use {scan_info, scan_warn};
