//! Host/Referer policy subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     SourcePolicy[] (compiled in)
//!     → table.rs (index by source key, build aggregate allow-list)
//!     → Freeze as immutable PolicyTable, shared via Arc
//!
//! Per audio request:
//!     (source key?, target hostname)
//!     → table.rs (resolve allow-list / referer)
//!     → matcher.rs (label-aware domain match)
//! ```
//!
//! # Design Decisions
//! - Table is built once and never written, so concurrent reads need no locking
//! - Source order is significant: it is the referer fallback scan order
//! - No regex: a hostname matches a registered domain by label suffix only

pub mod matcher;
pub mod table;

pub use matcher::HostPattern;
pub use table::{PolicyTable, SourcePolicy};
