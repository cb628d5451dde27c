//! What a single fragsplice process has been asked to do.

use camino::{Utf8Path, Utf8PathBuf};
use fragsplice_types::{FragspliceError, FragspliceResult};

/// The role of one invocation within a build cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Encode `input` and record it for insertion before `line` of `host`.
    Encoding {
        host: Utf8PathBuf,
        line: u64,
        input: Utf8PathBuf,
    },
    /// No content for `line`; record the sentinel and leave the splice to a
    /// later call.
    AwaitingMore { host: Utf8PathBuf, line: u64 },
    /// Last call for `host`: close the ledger if needed and splice.
    Finalizing { host: Utf8PathBuf, line: u64 },
}

impl Invocation {
    /// Classify a call from its raw inputs.
    ///
    /// Returns `Ok(None)` when there is nothing to do: no input file and not
    /// both of the target file and line.
    pub fn classify(
        input: Option<&Utf8Path>,
        target_file: Option<&Utf8Path>,
        target_line: Option<u64>,
        final_call: bool,
    ) -> FragspliceResult<Option<Self>> {
        let target = target_file.zip(target_line);

        match (input, target) {
            (Some(input), Some((host, line))) => Ok(Some(Invocation::Encoding {
                host: host.to_path_buf(),
                line,
                input: input.to_path_buf(),
            })),
            (Some(input), None) => Err(FragspliceError::protocol(format!(
                "cannot record {input}: both a target file and a target line are required"
            ))),
            (None, Some((host, line))) if final_call => Ok(Some(Invocation::Finalizing {
                host: host.to_path_buf(),
                line,
            })),
            (None, Some((host, line))) => Ok(Some(Invocation::AwaitingMore {
                host: host.to_path_buf(),
                line,
            })),
            (None, None) => Ok(None),
        }
    }

    pub fn host(&self) -> &Utf8Path {
        match self {
            Invocation::Encoding { host, .. }
            | Invocation::AwaitingMore { host, .. }
            | Invocation::Finalizing { host, .. } => host,
        }
    }

    pub fn line(&self) -> u64 {
        match self {
            Invocation::Encoding { line, .. }
            | Invocation::AwaitingMore { line, .. }
            | Invocation::Finalizing { line, .. } => *line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Option<&Utf8Path> {
        Some(Utf8Path::new(s))
    }

    #[test]
    fn input_with_target_is_encoding() {
        let inv = Invocation::classify(p("logo.png"), p("src/main.rs"), Some(12), false)
            .unwrap()
            .unwrap();
        assert_eq!(
            inv,
            Invocation::Encoding {
                host: "src/main.rs".into(),
                line: 12,
                input: "logo.png".into(),
            }
        );
    }

    #[test]
    fn final_flag_does_not_override_encoding() {
        let inv = Invocation::classify(p("a"), p("h.rs"), Some(1), true)
            .unwrap()
            .unwrap();
        assert!(matches!(inv, Invocation::Encoding { .. }));
    }

    #[test]
    fn target_without_input_awaits_more() {
        let inv = Invocation::classify(None, p("h.rs"), Some(8), false)
            .unwrap()
            .unwrap();
        assert_eq!(
            inv,
            Invocation::AwaitingMore {
                host: "h.rs".into(),
                line: 8
            }
        );
        assert_eq!(inv.line(), 8);
        assert_eq!(inv.host(), Utf8Path::new("h.rs"));
    }

    #[test]
    fn final_call_finalizes() {
        let inv = Invocation::classify(None, p("h.rs"), Some(8), true)
            .unwrap()
            .unwrap();
        assert!(matches!(inv, Invocation::Finalizing { line: 8, .. }));
    }

    #[test]
    fn nothing_supplied_is_noop() {
        assert_eq!(Invocation::classify(None, None, None, false).unwrap(), None);
        assert_eq!(Invocation::classify(None, p("h.rs"), None, true).unwrap(), None);
        assert_eq!(Invocation::classify(None, None, Some(3), false).unwrap(), None);
    }

    #[test]
    fn input_without_target_is_protocol_error() {
        let err = Invocation::classify(p("a.bin"), None, Some(3), false).unwrap_err();
        assert!(matches!(err, FragspliceError::Protocol { .. }));
    }
}
