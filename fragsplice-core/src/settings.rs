//! Clap-free settings for the pipeline.

use camino::Utf8PathBuf;
use fragsplice_types::Dialect;

/// Settings shared by every invocation.
#[derive(Debug, Clone, Default)]
pub struct RunSettings {
    /// Where the ledger and fragment files live. `None` means next to the host.
    pub work_dir: Option<Utf8PathBuf>,

    /// Declaration syntax for encoded fragments.
    pub dialect: Dialect,
}
