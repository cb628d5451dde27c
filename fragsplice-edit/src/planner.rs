use crate::source::FragmentSource;
use fragsplice_types::{FragmentRef, FragspliceError, FragspliceResult, InsertionPlan, LedgerEntry};
use tracing::debug;

/// Convert drained ledger entries into splice instructions.
///
/// Each fragment entry deletes everything from its own line up to the line
/// before the next entry (whatever a previous run generated there) and
/// inserts its fragment instead. A sentinel that is not the last entry only
/// closes the range before it.
pub fn plan(
    entries: &[LedgerEntry],
    fragments: &dyn FragmentSource,
) -> FragspliceResult<Vec<InsertionPlan>> {
    let Some(last) = entries.last() else {
        return Err(FragspliceError::protocol("ledger has no entries"));
    };
    if !last.is_end() {
        return Err(FragspliceError::protocol(format!(
            "ledger does not end with the `end` sentinel (last entry: `{last}`)"
        )));
    }

    if let Some(zero) = entries.iter().position(|e| e.line == 0) {
        return Err(FragspliceError::protocol(format!(
            "entry {} has line 0; host lines are numbered from 1",
            zero + 1
        )));
    }

    for (idx, pair) in entries.windows(2).enumerate() {
        if pair[1].line < pair[0].line {
            return Err(FragspliceError::protocol(format!(
                "line numbers decrease: entry {} (`{}`) follows entry {} (`{}`)",
                idx + 2,
                pair[1],
                idx + 1,
                pair[0]
            )));
        }
    }

    let mut plans = Vec::new();
    for pair in entries.windows(2) {
        let (current, next) = (&pair[0], &pair[1]);
        let FragmentRef::Path(name) = &current.fragment else {
            continue;
        };

        let bytes = fragments.load(name)?.ok_or_else(|| {
            FragspliceError::protocol(format!(
                "ledger references fragment `{name}` which no longer exists"
            ))
        })?;

        plans.push(InsertionPlan {
            start_line: current.line,
            delete_to_line: next.line - 1,
            replacement: Some(bytes),
        });
    }

    debug!(entries = entries.len(), plans = plans.len(), "planned splice");
    Ok(plans)
}
