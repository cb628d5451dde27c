/// A concrete splice instruction derived from two consecutive ledger entries.
///
/// Lines are 1-based. `start_line ..= delete_to_line` is removed from the host
/// and `replacement` is written in its place. When
/// `delete_to_line + 1 == start_line` the range is empty and the plan is a
/// pure insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertionPlan {
    pub start_line: u64,
    pub delete_to_line: u64,
    pub replacement: Option<Vec<u8>>,
}

impl InsertionPlan {
    /// Number of host lines this plan removes.
    pub fn deleted_lines(&self) -> u64 {
        if self.delete_to_line < self.start_line {
            0
        } else {
            (self.delete_to_line - self.start_line).saturating_add(1)
        }
    }

    pub fn is_pure_insertion(&self) -> bool {
        self.deleted_lines() == 0
    }
}
