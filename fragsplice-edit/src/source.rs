use camino::{Utf8Path, Utf8PathBuf};
use fragsplice_types::{FragspliceError, FragspliceResult};
use fs_err as fs;
use std::collections::BTreeMap;
use std::io::ErrorKind;

/// Read access to fragment files named by ledger entries.
///
/// The planner only goes through this trait so it can be exercised without a
/// filesystem.
pub trait FragmentSource {
    /// Contents of `name`, or `None` when the fragment does not exist.
    fn load(&self, name: &str) -> FragspliceResult<Option<Vec<u8>>>;
}

/// Fragments stored as files in one directory.
#[derive(Debug, Clone)]
pub struct DirFragmentSource {
    dir: Utf8PathBuf,
}

impl DirFragmentSource {
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn abs(&self, name: &str) -> Utf8PathBuf {
        let p = Utf8Path::new(name);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.dir.join(p)
        }
    }
}

impl FragmentSource for DirFragmentSource {
    fn load(&self, name: &str) -> FragspliceResult<Option<Vec<u8>>> {
        let path = self.abs(name);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FragspliceError::io(path, e)),
        }
    }
}

/// In-memory fragments for embedding and testing.
#[derive(Debug, Clone, Default)]
pub struct MemoryFragmentSource {
    fragments: BTreeMap<String, Vec<u8>>,
}

impl MemoryFragmentSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.fragments.insert(name.into(), contents.into());
        self
    }
}

impl FragmentSource for MemoryFragmentSource {
    fn load(&self, name: &str) -> FragspliceResult<Option<Vec<u8>>> {
        Ok(self.fragments.get(name).cloned())
    }
}
