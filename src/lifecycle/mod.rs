//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main):
//!     Load config → Load injection assets → Bind listener → Serve
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → shutdown.rs broadcast
//!
//! Shutdown (shutdown.rs):
//!     Broadcast received → stop accepting → exit 0
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal before traffic is accepted
//! - Shutdown is explicit plumbing (coordinator + listener task), not
//!   process-global handlers

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
