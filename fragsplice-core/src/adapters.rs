//! Default port implementations.

use crate::ports::Formatter;
use anyhow::Context;
use camino::Utf8Path;
use std::process::Command;
use tracing::debug;

/// Runs an external formatter as `<program> <args...> <path>`.
#[derive(Debug, Clone)]
pub struct CommandFormatter {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandFormatter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from a full command line such as `["rustfmt", "--edition", "2021"]`.
    /// Returns `None` for an empty command.
    pub fn from_command(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }
}

impl Formatter for CommandFormatter {
    fn format(&self, path: &Utf8Path) -> anyhow::Result<()> {
        debug!(program = %self.program, args = ?self.args, path = %path, "running formatter");
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(path.as_str())
            .status()
            .with_context(|| format!("spawn formatter {}", self.program))?;
        if !status.success() {
            anyhow::bail!("formatter {} exited with {} on {}", self.program, status, path);
        }
        Ok(())
    }
}

/// Leaves files as written.
#[derive(Debug, Clone, Default)]
pub struct NoopFormatter;

impl Formatter for NoopFormatter {
    fn format(&self, _path: &Utf8Path) -> anyhow::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_command_splits_program_and_args() {
        let cmd = vec!["rustfmt".to_string(), "--edition".to_string(), "2021".to_string()];
        let f = CommandFormatter::from_command(&cmd).unwrap();
        assert_eq!(f.program, "rustfmt");
        assert_eq!(f.args, vec!["--edition", "2021"]);
    }

    #[test]
    fn from_empty_command_is_none() {
        assert!(CommandFormatter::from_command(&[]).is_none());
    }

    #[test]
    fn missing_program_is_an_error() {
        let f = CommandFormatter::new("fragsplice-no-such-formatter", vec![]);
        let err = f.format(Utf8Path::new("x.rs")).unwrap_err();
        assert!(err.to_string().contains("spawn formatter"));
    }

    #[cfg(unix)]
    #[test]
    fn failing_program_is_an_error() {
        let f = CommandFormatter::new("false", vec![]);
        assert!(f.format(Utf8Path::new("x.rs")).is_err());
    }

    #[test]
    fn noop_always_succeeds() {
        assert!(NoopFormatter.format(Utf8Path::new("x.rs")).is_ok());
    }
}
