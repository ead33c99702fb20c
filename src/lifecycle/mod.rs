//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Guard (guard.rs):
//!     Installed first → any panic, any thread → fatal.rs
//!
//! Startup (startup.rs):
//!     Resolve config → Init logging → Validate → Resolve credentials → Serve
//!     any failure → fatal.rs
//!
//! Fatal (fatal.rs):
//!     stderr line + error event → exit(1)
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGTERM/SIGINT, /shutdown or idle timeout → stop accepting → drain → return
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, logging second, listener last
//! - Every failure is fatal; no degraded mode
//! - A fatal decision always ends the process, whatever is still pending

pub mod fatal;
pub mod guard;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use fatal::fatal_error;
pub use shutdown::Shutdown;
pub use startup::{run, BootstrapError, ProductionStages, Stage, Stages};
