//! Shared types for the fragsplice workspace.
//!
//! # Design constraints
//! - `LedgerEntry` has an on-disk text form; keep it stable across releases.
//! - `InsertionPlan` is derived and never persisted.
//! - All crates report failures through [`FragspliceError`].

pub mod dialect;
pub mod entry;
pub mod error;
pub mod plan;

pub use dialect::Dialect;
pub use entry::{EntryParseError, FragmentRef, LedgerEntry};
pub use error::{FragspliceError, FragspliceResult};
pub use plan::InsertionPlan;

/// File naming shared by the ledger and the CLI.
pub mod naming {
    /// Suffix appended to the host file name to form the ledger file name.
    pub const LEDGER_SUFFIX: &str = ".fragsplice.ledger";
    /// Infix between the host file name and the fragment index.
    pub const FRAGMENT_INFIX: &str = ".fragsplice.";
    /// Extension of fragment files.
    pub const FRAGMENT_EXT: &str = "frag";
    /// Text written in the ledger for the terminal entry.
    pub const SENTINEL: &str = "end";
}
