//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - JSON-formatted file logs with daily or hourly rotation
//! - Configurable log levels, overridable through `RUST_LOG`
//! - Event macros shared by the prescription engine and the HTTP layer
//!
//! # Example
//!
//! ```no_run
//! use pharmacy::logging::init_logging;
//! use pharmacy::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a prescription status change
///
/// # Example
///
/// ```no_run
/// use pharmacy::log_prescription_transition;
///
/// log_prescription_transition!(42, "pending", "fulfilled");
/// ```
#[macro_export]
macro_rules! log_prescription_transition {
    ($prescription_id:expr, $from:expr, $to:expr) => {
        tracing::info!(
            prescription_id = $prescription_id,
            from = %$from,
            to = %$to,
            "Prescription status changed"
        );
    };
}

/// Log a refused prescription operation
///
/// # Example
///
/// ```no_run
/// use pharmacy::log_access_denied;
///
/// log_access_denied!("doctor", 42, "not the prescribing doctor");
/// ```
#[macro_export]
macro_rules! log_access_denied {
    ($role:expr, $prescription_id:expr, $reason:expr) => {
        tracing::warn!(
            role = %$role,
            prescription_id = $prescription_id,
            reason = $reason,
            "Prescription access denied"
        );
    };
}
