//! Error types shared across fragsplice crates.
//!
//! Every variant is fatal: the current invocation aborts and the build sees
//! a non-zero exit. The variants distinguish:
//! - I/O failures (open, read, write, rename)
//! - malformed ledger text
//! - ledger protocol violations (missing sentinel, decreasing lines, vanished fragments)

use camino::Utf8PathBuf;
use thiserror::Error;

/// The top-level error type for fragsplice operations.
#[derive(Debug, Error)]
pub enum FragspliceError {
    /// A file could not be opened, read, written or renamed.
    #[error("io error on {path}")]
    Io {
        /// The file the operation was acting on.
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A ledger line could not be parsed back into an entry.
    #[error("malformed ledger {path} at line {line}: {message}")]
    Format {
        /// The ledger file.
        path: Utf8PathBuf,
        /// 1-based line within the ledger.
        line: usize,
        message: String,
    },

    /// The ledger's contents break the insertion protocol.
    #[error("protocol error: {message}")]
    Protocol { message: String },
}

impl FragspliceError {
    pub fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        FragspliceError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        FragspliceError::Protocol {
            message: message.into(),
        }
    }

    /// Returns the recommended process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        1
    }
}

/// Result type alias using FragspliceError.
pub type FragspliceResult<T> = Result<T, FragspliceError>;
