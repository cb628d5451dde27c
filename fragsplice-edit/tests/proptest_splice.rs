//! Property-based tests for splice planning and rewriting.
//!
//! These tests verify key invariants:
//! - Deletion ranges: entry i always covers exactly `[L(i), L(i+1) - 1]`
//! - Line accounting: output lines = input - deleted + inserted
//! - Lines outside every deletion range survive in order

use fragsplice_edit::{MemoryFragmentSource, plan, splice_lines};
use fragsplice_types::LedgerEntry;
use proptest::prelude::*;

/// Non-decreasing 1-based line numbers; the last is the sentinel's line.
fn arb_lines() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(0u64..4, 2..8).prop_map(|steps| {
        let mut line = 1;
        steps
            .into_iter()
            .map(|s| {
                line += s;
                line
            })
            .collect()
    })
}

fn ledger_for(lines: &[u64]) -> (Vec<LedgerEntry>, MemoryFragmentSource) {
    let mut entries = Vec::new();
    let mut source = MemoryFragmentSource::new();
    for (i, &line) in lines.iter().enumerate() {
        if i + 1 == lines.len() {
            entries.push(LedgerEntry::end(line));
        } else {
            let name = format!("f{i}");
            source = source.with(name.clone(), format!("<gen {i}>\n").into_bytes());
            entries.push(LedgerEntry::fragment(line, name));
        }
    }
    (entries, source)
}

proptest! {
    #[test]
    fn deletion_range_spans_to_next_entry(lines in arb_lines()) {
        let (entries, source) = ledger_for(&lines);
        let plans = plan(&entries, &source).unwrap();

        prop_assert_eq!(plans.len(), lines.len() - 1);
        for (i, p) in plans.iter().enumerate() {
            prop_assert_eq!(p.start_line, lines[i]);
            prop_assert_eq!(p.delete_to_line, lines[i + 1] - 1);
            prop_assert!(p.start_line <= p.delete_to_line + 1);
        }
    }

    #[test]
    fn rewrite_accounts_for_every_line(lines in arb_lines(), host_len in 0usize..30) {
        let (entries, source) = ledger_for(&lines);
        let plans = plan(&entries, &source).unwrap();
        let host: String = (1..=host_len).map(|n| format!("h{n}\n")).collect();

        let mut out = Vec::new();
        let stats = splice_lines(host.as_bytes(), &mut out, &plans).unwrap();
        let out = String::from_utf8(out).unwrap();

        prop_assert_eq!(stats.lines_in, host_len as u64);
        prop_assert_eq!(stats.lines_copied + stats.lines_deleted, host_len as u64);
        prop_assert_eq!(
            out.lines().count() as u64,
            stats.lines_copied + stats.fragments_inserted
        );

        // Host lines outside all deletion ranges appear in their original order.
        let kept: Vec<String> = (1..=host_len as u64)
            .filter(|n| !plans.iter().any(|p| *n >= p.start_line && *n <= p.delete_to_line))
            .map(|n| format!("h{n}"))
            .collect();
        let surviving: Vec<String> = out
            .lines()
            .filter(|l| l.starts_with('h'))
            .map(str::to_string)
            .collect();
        prop_assert_eq!(surviving, kept);
    }

    #[test]
    fn splicing_twice_with_same_ledger_is_stable(host_len in 3usize..20) {
        // Simulates two builds: the second ledger brackets the fragment the
        // first one inserted, so the result must not grow.
        let host: String = (1..=host_len).map(|n| format!("h{n}\n")).collect();
        let (entries, source) = ledger_for(&[2, 2]);
        let plans = plan(&entries, &source).unwrap();
        let mut once = Vec::new();
        splice_lines(host.as_bytes(), &mut once, &plans).unwrap();

        let (entries, source) = ledger_for(&[2, 3]);
        let plans = plan(&entries, &source).unwrap();
        let mut twice = Vec::new();
        splice_lines(once.as_slice(), &mut twice, &plans).unwrap();

        prop_assert_eq!(once, twice);
    }
}
