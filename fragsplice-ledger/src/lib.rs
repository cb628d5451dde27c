//! The insertion ledger.
//!
//! Separate fragsplice processes never share memory; the only channel
//! between them is a small text file next to the host source, one
//! `<line> <fragment-or-end>` entry per line. [`Ledger`] owns that file and
//! the fragment files it references: entries are appended one invocation at
//! a time and the whole set is drained (and deleted) by the invocation that
//! performs the splice.
//!
//! There is no locking. The build is expected to invoke fragsplice
//! sequentially for a given host file.

mod store;

pub use store::Ledger;
