//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! ledger, faucet, bridge produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters via the metrics facade)
//! ```

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
