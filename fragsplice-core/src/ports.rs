//! Port traits abstracting side effects away from the pipeline.

use camino::Utf8Path;

/// Cosmetic source formatting applied to a host file after it is rewritten.
///
/// Failures are reported but never abort a splice.
pub trait Formatter {
    fn format(&self, path: &Utf8Path) -> anyhow::Result<()>;
}
