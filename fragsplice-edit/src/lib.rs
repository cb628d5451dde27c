//! Edit engine for fragsplice.
//!
//! Responsibilities:
//! - Turn drained ledger entries into [`InsertionPlan`](fragsplice_types::InsertionPlan)s.
//! - Stream a host file through those plans into a temporary file.
//! - Replace the host with the temporary file in one rename.

mod planner;
mod rewrite;
mod source;

pub use planner::plan;
pub use rewrite::{RewriteStats, StagedRewrite, rewrite, splice_lines, stage_rewrite};
pub use source::{DirFragmentSource, FragmentSource, MemoryFragmentSource};
