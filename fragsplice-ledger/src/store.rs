use camino::{Utf8Path, Utf8PathBuf};
use fragsplice_types::naming::{FRAGMENT_EXT, FRAGMENT_INFIX, LEDGER_SUFFIX};
use fragsplice_types::{FragmentRef, FragspliceError, FragspliceResult, LedgerEntry};
use fs_err as fs;
use glob::{Pattern, glob};
use sha2::{Digest, Sha256};
use std::io::{ErrorKind, Write};
use tracing::{debug, info};

/// Ledger for a single host file.
#[derive(Debug, Clone)]
pub struct Ledger {
    host: Utf8PathBuf,
    /// Prefix of the ledger and fragment file names.
    stem: String,
    dir: Utf8PathBuf,
    path: Utf8PathBuf,
}

impl Ledger {
    /// Bind a ledger to `host`. Ledger and fragment files live in `work_dir`,
    /// or next to the host when `work_dir` is `None`.
    ///
    /// A work dir is shared by every host, so there the file names also
    /// carry a digest of the host's full path; `a/mod.rs` and `b/mod.rs`
    /// never share a ledger.
    pub fn for_host(host: &Utf8Path, work_dir: Option<&Utf8Path>) -> FragspliceResult<Self> {
        let host_name = host
            .file_name()
            .ok_or_else(|| FragspliceError::protocol(format!("host path {} has no file name", host)))?
            .to_string();

        let (dir, stem) = match work_dir {
            Some(d) => (d.to_path_buf(), format!("{host_name}.{}", host_digest(host))),
            None => (
                host.parent()
                    .filter(|p| !p.as_str().is_empty())
                    .unwrap_or(Utf8Path::new("."))
                    .to_path_buf(),
                host_name,
            ),
        };
        let path = dir.join(format!("{stem}{LEDGER_SUFFIX}"));

        Ok(Self {
            host: host.to_path_buf(),
            stem,
            dir,
            path,
        })
    }

    pub fn host(&self) -> &Utf8Path {
        &self.host
    }

    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Absolute (or work-dir relative) location of a fragment named in an entry.
    pub fn resolve(&self, fragment: &str) -> Utf8PathBuf {
        let p = Utf8Path::new(fragment);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.dir.join(p)
        }
    }

    /// Append one entry, creating the ledger on first use.
    pub fn append(&self, entry: &LedgerEntry) -> FragspliceResult<()> {
        if let FragmentRef::Path(name) = &entry.fragment {
            match name.parse::<FragmentRef>() {
                Ok(FragmentRef::Path(_)) => {}
                Ok(FragmentRef::End) => {
                    return Err(self.format_error_at_tail(format!(
                        "fragment file may not be named `{name}`"
                    )));
                }
                Err(e) => return Err(self.format_error_at_tail(e.to_string())),
            }
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| FragspliceError::io(&self.path, e))?;
        file.write_all(format!("{entry}\n").as_bytes())
            .map_err(|e| FragspliceError::io(&self.path, e))?;

        debug!(ledger = %self.path, line = entry.line, fragment = %entry.fragment, "appended ledger entry");
        Ok(())
    }

    /// Read every entry in arrival order. A missing ledger reads as empty.
    pub fn read_all(&self) -> FragspliceResult<Vec<LedgerEntry>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(FragspliceError::io(&self.path, e)),
        };

        contents
            .lines()
            .enumerate()
            .map(|(idx, line)| {
                line.parse::<LedgerEntry>()
                    .map_err(|e| FragspliceError::Format {
                        path: self.path.clone(),
                        line: idx + 1,
                        message: e.to_string(),
                    })
            })
            .collect()
    }

    /// Whether the most recent entry is the `end` sentinel.
    pub fn ends_with_sentinel(&self) -> FragspliceResult<bool> {
        Ok(self.read_all()?.last().is_some_and(LedgerEntry::is_end))
    }

    /// Write `text` to a fresh fragment file and record it for `line`.
    pub fn record_fragment(&self, line: u64, text: &str) -> FragspliceResult<LedgerEntry> {
        let index = self.read_all()?.len();
        let name = format!("{}{FRAGMENT_INFIX}{index}.{FRAGMENT_EXT}", self.stem);
        let frag_path = self.resolve(&name);

        fs::write(&frag_path, text).map_err(|e| FragspliceError::io(&frag_path, e))?;

        let entry = LedgerEntry::fragment(line, name);
        self.append(&entry)?;
        Ok(entry)
    }

    /// Record the sentinel for `line`.
    pub fn record_end(&self, line: u64) -> FragspliceResult<LedgerEntry> {
        let entry = LedgerEntry::end(line);
        self.append(&entry)?;
        Ok(entry)
    }

    /// Hand every entry to `consume`. When it succeeds the ledger and every
    /// fragment it references are deleted; when it fails nothing is touched.
    pub fn drain<T>(
        &self,
        consume: impl FnOnce(&[LedgerEntry]) -> FragspliceResult<T>,
    ) -> FragspliceResult<T> {
        let entries = self.read_all()?;
        let out = consume(&entries)?;

        for name in entries.iter().filter_map(|e| e.fragment.as_path()) {
            remove_if_present(&self.resolve(name))?;
        }
        remove_if_present(&self.path)?;

        info!(ledger = %self.path, entries = entries.len(), "ledger drained");
        Ok(out)
    }

    /// Delete the ledger and any fragment files left for this host, including
    /// ones an interrupted cycle never recorded. Returns the removed paths.
    pub fn clear(&self) -> FragspliceResult<Vec<Utf8PathBuf>> {
        let mut removed = Vec::new();

        let pattern = format!(
            "{}/{}{FRAGMENT_INFIX}*.{FRAGMENT_EXT}",
            Pattern::escape(self.dir.as_str()),
            Pattern::escape(&self.stem)
        );
        let paths = glob(&pattern)
            .map_err(|e| FragspliceError::protocol(format!("bad fragment pattern {pattern}: {e}")))?;
        for entry in paths {
            let path = entry.map_err(|e| {
                let path = Utf8PathBuf::from(e.path().to_string_lossy().to_string());
                FragspliceError::io(path, e.into_error())
            })?;
            let path = Utf8PathBuf::from(path.to_string_lossy().to_string());
            if remove_if_present(&path)? {
                removed.push(path);
            }
        }

        if remove_if_present(&self.path)? {
            removed.push(self.path.clone());
        }

        removed.sort();
        debug!(ledger = %self.path, removed = removed.len(), "ledger cleared");
        Ok(removed)
    }

    fn format_error_at_tail(&self, message: String) -> FragspliceError {
        let line = self.read_all().map(|e| e.len()).unwrap_or(0) + 1;
        FragspliceError::Format {
            path: self.path.clone(),
            line,
            message,
        }
    }
}

/// Short digest of the host's canonical path. Falls back to the absolute
/// path when the host cannot be canonicalized (it does not exist yet).
fn host_digest(host: &Utf8Path) -> String {
    let key = match host.canonicalize_utf8() {
        Ok(p) => p.into_string(),
        Err(_) => std::path::absolute(host)
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|_| host.to_string()),
    };
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(12);
    digest
}

fn remove_if_present(path: &Utf8Path) -> FragspliceResult<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(FragspliceError::io(path, e)),
    }
}
