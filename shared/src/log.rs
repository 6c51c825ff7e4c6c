//! Thin logging facade over `tracing`. Downstream crates call the
//! `shared::log_*!` macros and never import `tracing` themselves.

// Macros expand to absolute `$crate::tracing::…` paths, so the re-export in
// lib.rs is the only tracing surface downstream crates see.

/// Log at DEBUG level
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::tracing::debug!($($arg)*);
    };
}

/// Log at INFO level
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::tracing::info!($($arg)*);
    };
}

/// Log at WARN level
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::tracing::warn!($($arg)*);
    };
}

/// Log at ERROR level
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::tracing::error!($($arg)*);
    };
}
