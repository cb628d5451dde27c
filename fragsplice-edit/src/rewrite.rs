use camino::{Utf8Path, Utf8PathBuf};
use fragsplice_types::{FragspliceError, FragspliceResult, InsertionPlan};
use fs_err as fs;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Line counts for one rewrite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStats {
    pub lines_in: u64,
    pub lines_copied: u64,
    pub lines_deleted: u64,
    pub fragments_inserted: u64,
}

/// A fully written rewrite waiting to replace its host.
///
/// Dropping it without committing deletes the temporary file and leaves the
/// host as it was.
#[derive(Debug)]
pub struct StagedRewrite {
    host: Utf8PathBuf,
    temp: NamedTempFile,
    stats: RewriteStats,
}

impl StagedRewrite {
    pub fn host(&self) -> &Utf8Path {
        &self.host
    }

    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    pub fn stats(&self) -> RewriteStats {
        self.stats
    }

    /// Rename the staged file over the host.
    pub fn commit(self) -> FragspliceResult<RewriteStats> {
        let host = self.host.clone();
        self.commit_to(&host)
    }

    /// Rename the staged file over `target`.
    ///
    /// On failure `target` is untouched and the staged file is kept on disk;
    /// the error names where it was left.
    pub fn commit_to(self, target: &Utf8Path) -> FragspliceResult<RewriteStats> {
        let stats = self.stats;
        match self.temp.persist(target) {
            Ok(_) => {
                info!(host = %target, ?stats, "host rewritten");
                Ok(stats)
            }
            Err(err) => {
                let kept = match err.file.keep() {
                    Ok((_, path)) => path.display().to_string(),
                    Err(keep_err) => format!("<lost: {}>", keep_err.error),
                };
                Err(FragspliceError::io(
                    target,
                    io::Error::new(
                        err.error.kind(),
                        format!(
                            "rename failed: {}; rewritten content left at {}",
                            err.error, kept
                        ),
                    ),
                ))
            }
        }
    }
}

/// Rewrite `host` in place by applying `plans`.
pub fn rewrite(host: &Utf8Path, plans: &[InsertionPlan]) -> FragspliceResult<RewriteStats> {
    stage_rewrite(host, plans)?.commit()
}

/// Write the rewritten host into a temporary file in the host's directory.
pub fn stage_rewrite(host: &Utf8Path, plans: &[InsertionPlan]) -> FragspliceResult<StagedRewrite> {
    check_ordering(plans)?;

    let input = fs::File::open(host).map_err(|e| FragspliceError::io(host, e))?;
    let permissions = input
        .metadata()
        .map_err(|e| FragspliceError::io(host, e))?
        .permissions();

    let dir = host
        .parent()
        .filter(|p| !p.as_str().is_empty())
        .unwrap_or(Utf8Path::new("."));
    let prefix = format!(".{}.", host.file_name().unwrap_or("host"));
    let mut temp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| FragspliceError::io(dir, e))?;
    let temp_path = Utf8PathBuf::from(temp.path().to_string_lossy().to_string());

    let stats = {
        let mut out = BufWriter::new(temp.as_file_mut());
        let stats = splice_lines(BufReader::new(input), &mut out, plans)
            .map_err(|e| FragspliceError::io(&temp_path, e))?;
        out.flush().map_err(|e| FragspliceError::io(&temp_path, e))?;
        stats
    };
    temp.as_file()
        .sync_all()
        .map_err(|e| FragspliceError::io(&temp_path, e))?;
    fs::set_permissions(temp.path(), permissions)
        .map_err(|e| FragspliceError::io(&temp_path, e))?;

    debug!(host = %host, temp = %temp_path, ?stats, "staged rewrite");
    Ok(StagedRewrite {
        host: host.to_path_buf(),
        temp,
        stats,
    })
}

/// Stream `input` to `out`, applying `plans` in order.
///
/// Lines are numbered from 1 and copied byte-for-byte including their
/// original terminators. A replacement without a trailing newline gets one.
/// Plans that start past the end of the input insert at the end.
pub fn splice_lines<R: BufRead, W: Write>(
    mut input: R,
    mut out: W,
    plans: &[InsertionPlan],
) -> io::Result<RewriteStats> {
    let mut stats = RewriteStats::default();
    let mut buf = Vec::new();
    let mut consumed: u64 = 0;
    let mut at_line_start = true;

    for plan in plans {
        while consumed + 1 < plan.start_line {
            if !next_line(&mut input, &mut buf)? {
                break;
            }
            consumed += 1;
            stats.lines_copied += 1;
            out.write_all(&buf)?;
            at_line_start = buf.ends_with(b"\n");
        }

        while consumed < plan.delete_to_line {
            if !next_line(&mut input, &mut buf)? {
                break;
            }
            consumed += 1;
            stats.lines_deleted += 1;
        }

        if let Some(replacement) = &plan.replacement {
            if !at_line_start {
                out.write_all(b"\n")?;
            }
            out.write_all(replacement)?;
            if !replacement.is_empty() && !replacement.ends_with(b"\n") {
                out.write_all(b"\n")?;
            }
            at_line_start = true;
            stats.fragments_inserted += 1;
        }
    }

    while next_line(&mut input, &mut buf)? {
        consumed += 1;
        stats.lines_copied += 1;
        out.write_all(&buf)?;
    }

    stats.lines_in = consumed;
    Ok(stats)
}

fn next_line<R: BufRead>(input: &mut R, buf: &mut Vec<u8>) -> io::Result<bool> {
    buf.clear();
    Ok(input.read_until(b'\n', buf)? > 0)
}

fn check_ordering(plans: &[InsertionPlan]) -> FragspliceResult<()> {
    for plan in plans {
        if plan.start_line > plan.delete_to_line.saturating_add(1) {
            return Err(FragspliceError::protocol(format!(
                "plan at line {} ends before it starts (delete to {})",
                plan.start_line, plan.delete_to_line
            )));
        }
    }
    for pair in plans.windows(2) {
        if pair[1].start_line <= pair[0].delete_to_line {
            return Err(FragspliceError::protocol(format!(
                "plan at line {} overlaps the range {}..={}",
                pair[1].start_line, pair[0].start_line, pair[0].delete_to_line
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plan(start: u64, delete_to: u64, text: Option<&str>) -> InsertionPlan {
        InsertionPlan {
            start_line: start,
            delete_to_line: delete_to,
            replacement: text.map(|t| t.as_bytes().to_vec()),
        }
    }

    fn run(input: &str, plans: &[InsertionPlan]) -> (String, RewriteStats) {
        let mut out = Vec::new();
        let stats = splice_lines(input.as_bytes(), &mut out, plans).unwrap();
        (String::from_utf8(out).unwrap(), stats)
    }

    #[test]
    fn no_plans_copies_verbatim() {
        let input = "a\r\nb\n\nc";
        let (out, stats) = run(input, &[]);
        assert_eq!(out, input);
        assert_eq!(stats.lines_in, 4);
        assert_eq!(stats.lines_copied, 4);
    }

    #[test]
    fn replaces_range() {
        let (out, stats) = run("1\n2\n3\n4\n", &[plan(2, 3, Some("x\n"))]);
        assert_eq!(out, "1\nx\n4\n");
        assert_eq!(stats.lines_deleted, 2);
        assert_eq!(stats.fragments_inserted, 1);
    }

    #[test]
    fn pure_insertion_keeps_all_lines() {
        let (out, _) = run("1\n2\n", &[plan(2, 1, Some("x\n"))]);
        assert_eq!(out, "1\nx\n2\n");
    }

    #[test]
    fn replacement_without_newline_gets_one() {
        let (out, _) = run("1\n2\n", &[plan(2, 1, Some("x"))]);
        assert_eq!(out, "1\nx\n2\n");
    }

    #[test]
    fn insertion_past_end_appends() {
        let (out, _) = run("1\n2", &[plan(10, 9, Some("x\n"))]);
        assert_eq!(out, "1\n2\nx\n");
    }

    #[test]
    fn deletion_range_past_end_truncates() {
        let (out, stats) = run("1\n2\n3\n", &[plan(2, 20, Some("x\n"))]);
        assert_eq!(out, "1\nx\n");
        assert_eq!(stats.lines_deleted, 2);
    }

    #[test]
    fn plan_without_replacement_only_deletes() {
        let (out, _) = run("1\n2\n3\n", &[plan(2, 2, None)]);
        assert_eq!(out, "1\n3\n");
    }

    #[test]
    fn rejects_overlapping_plans() {
        let plans = vec![plan(2, 5, None), plan(4, 6, None)];
        assert!(matches!(
            check_ordering(&plans),
            Err(FragspliceError::Protocol { .. })
        ));
    }

    #[test]
    fn rejects_inverted_range() {
        assert!(check_ordering(&[plan(5, 2, None)]).is_err());
    }
}
