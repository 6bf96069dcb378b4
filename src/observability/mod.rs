//! Observability subsystem.
//!
//! Structured logging only: every subsystem emits `tracing` events with
//! key/value fields, and `logging.rs` installs the subscriber once at startup.
//! Request spans (with request ID) come from the HTTP middleware.

pub mod logging;

pub use logging::init_logging;
