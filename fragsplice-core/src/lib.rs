//! Embeddable core library for fragsplice.
//!
//! Provides a clap-free entry point that build scripts or other host
//! processes can call directly instead of spawning the binary.
//!
//! # Port traits
//!
//! The only side effect outside the ledger and the host file is the
//! cosmetic formatting pass, abstracted behind
//! [`Formatter`](ports::Formatter). The [`adapters`] module provides a
//! command-backed implementation and a no-op one.
//!
//! # Entry points
//!
//! - [`Invocation::classify`](invocation::Invocation::classify): decide what a call means, once
//! - [`run`](pipeline::run): encode, record, or splice
//! - [`status`](pipeline::status) / [`reset`](pipeline::reset): inspect or clear a pending cycle

pub mod adapters;
pub mod invocation;
pub mod pipeline;
pub mod ports;
pub mod settings;

pub use invocation::Invocation;
pub use pipeline::{LedgerStatus, Outcome, SpliceSummary, reset, run, status};
pub use settings::RunSettings;

// Re-export so embedders don't need the leaf crates directly.
pub use fragsplice_edit::RewriteStats;
pub use fragsplice_types::{Dialect, FragspliceError, FragspliceResult, LedgerEntry};
