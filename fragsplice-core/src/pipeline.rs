//! Encode / record / splice pipeline.

use crate::invocation::Invocation;
use crate::ports::Formatter;
use crate::settings::RunSettings;
use camino::{Utf8Path, Utf8PathBuf};
use fragsplice_edit::{DirFragmentSource, RewriteStats, plan, rewrite};
use fragsplice_ledger::Ledger;
use fragsplice_types::{FragspliceResult, LedgerEntry};
use serde::Serialize;
use tracing::{debug, info, warn};

/// What one invocation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A fragment was encoded and its insertion point recorded.
    Recorded(LedgerEntry),
    /// The sentinel was recorded; the splice happens on a later call.
    Deferred(LedgerEntry),
    /// The ledger was applied to the host and removed.
    Spliced(SpliceSummary),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpliceSummary {
    pub host: Utf8PathBuf,
    pub plans: usize,
    pub stats: RewriteStats,
    /// Whether the formatting pass succeeded.
    pub formatted: bool,
}

/// Carry out one classified invocation.
pub fn run(
    invocation: &Invocation,
    settings: &RunSettings,
    formatter: &dyn Formatter,
) -> FragspliceResult<Outcome> {
    let ledger = Ledger::for_host(invocation.host(), settings.work_dir.as_deref())?;

    match invocation {
        Invocation::Encoding { line, input, .. } => {
            let fragment = fragsplice_encode::encode(input, settings.dialect)?;
            let entry = ledger.record_fragment(*line, &fragment.text)?;
            info!(
                host = %ledger.host(),
                line,
                input = %input,
                ident = %fragment.ident,
                bytes = fragment.len,
                "recorded fragment"
            );
            Ok(Outcome::Recorded(entry))
        }
        Invocation::AwaitingMore { line, .. } => {
            let entry = ledger.record_end(*line)?;
            debug!(host = %ledger.host(), line, "recorded sentinel, splice deferred");
            Ok(Outcome::Deferred(entry))
        }
        Invocation::Finalizing { line, .. } => {
            if !ledger.ends_with_sentinel()? {
                ledger.record_end(*line)?;
            }
            let summary = splice(&ledger, formatter)?;
            Ok(Outcome::Spliced(summary))
        }
    }
}

fn splice(ledger: &Ledger, formatter: &dyn Formatter) -> FragspliceResult<SpliceSummary> {
    let host = ledger.host();
    let source = DirFragmentSource::new(ledger.dir());

    let (plans, stats) = ledger.drain(|entries| {
        let plans = plan(entries, &source)?;
        let stats = rewrite(host, &plans)?;
        Ok((plans.len(), stats))
    })?;

    let formatted = match formatter.format(host) {
        Ok(()) => true,
        Err(e) => {
            warn!(host = %host, "formatting skipped: {:#}", e);
            false
        }
    };

    info!(host = %host, plans, ?stats, formatted, "splice complete");
    Ok(SpliceSummary {
        host: host.to_path_buf(),
        plans,
        stats,
        formatted,
    })
}

/// Pending state for one host.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerStatus {
    pub host: Utf8PathBuf,
    pub ledger: Utf8PathBuf,
    pub entries: Vec<StatusEntry>,
    /// The ledger ends with the sentinel, so a final call will splice it.
    pub closed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusEntry {
    #[serde(flatten)]
    pub entry: LedgerEntry,
    /// For fragment entries, whether the fragment file still exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub present: Option<bool>,
}

/// Report the pending ledger for `host` without changing anything.
pub fn status(host: &Utf8Path, settings: &RunSettings) -> FragspliceResult<LedgerStatus> {
    let ledger = Ledger::for_host(host, settings.work_dir.as_deref())?;
    let entries = ledger.read_all()?;
    let closed = entries.last().is_some_and(LedgerEntry::is_end);

    let entries = entries
        .into_iter()
        .map(|entry| {
            let present = entry
                .fragment
                .as_path()
                .map(|name| ledger.resolve(name).exists());
            StatusEntry { entry, present }
        })
        .collect();

    Ok(LedgerStatus {
        host: host.to_path_buf(),
        ledger: ledger.path().to_path_buf(),
        entries,
        closed,
    })
}

/// Throw away a pending cycle for `host`. Returns the removed files.
pub fn reset(host: &Utf8Path, settings: &RunSettings) -> FragspliceResult<Vec<Utf8PathBuf>> {
    let ledger = Ledger::for_host(host, settings.work_dir.as_deref())?;
    let removed = ledger.clear()?;
    info!(host = %host, removed = removed.len(), "ledger reset");
    Ok(removed)
}
