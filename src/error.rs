//! Unified error taxonomy and process exit codes.
//!
//! The per-module error types (`repair::RepairError`, `verify::VerificationError`, ...)
//! describe failures in terms their own driver understands. [`Par2Error`] is the
//! top-level classification that the CLI binaries map to an exit code: every
//! variant here corresponds 1:1 to a row of the exit-code table.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error classification, used by the `par2` binaries to decide the
/// process exit code.
#[derive(Debug, Error)]
pub enum Par2Error {
    /// Non-recoverable I/O failure: bubbles straight to exit code 6.
    #[error("I/O error during {op} on {path}: {cause}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        cause: std::io::Error,
    },

    /// A packet failed to parse at a given offset. Never fatal by itself: the
    /// packet codec advances one byte and keeps scanning.
    #[error("format error in {path} at offset {offset}: {reason}")]
    Format {
        path: PathBuf,
        offset: u64,
        reason: String,
    },

    /// A packet's body hash didn't match its header MD5. The packet is
    /// dropped and loading continues.
    #[error("integrity error in {path}: {packet_kind} packet hash mismatch (expected {expected}, got {actual})")]
    Integrity {
        path: PathBuf,
        packet_kind: &'static str,
        expected: String,
        actual: String,
    },

    /// No Main packet was found, or no file description exists for any
    /// recoverable file. Exit code 4.
    #[error("insufficient critical data: {0}")]
    InsufficientMetadata(String),

    /// The RS matrix elimination hit an all-zero pivot column. Exit code 7.
    #[error("matrix is singular: {0}")]
    MatrixSingular(String),

    /// More distinct input columns were required than the field admits
    /// (`> 32768`, since `gcd(_, 65535)` has at most that many solutions in
    /// range). Exit code 7.
    #[error("matrix overflow: {0}")]
    MatrixOverflow(String),

    /// Fewer recovery blocks are available than source blocks are missing.
    /// Exit code 2.
    #[error("repair is not possible: {missing} blocks missing, {available} recovery blocks available")]
    RepairImpossible { missing: usize, available: usize },

    /// Repair ran and wrote output files, but a post-repair verification
    /// pass still failed. Exit code 5. Partial outputs are deleted by the
    /// caller before this error propagates.
    #[error("repair completed but verification still fails for {0}")]
    RepairFailed(String),

    /// Allocation failed or a configured memory limit could not be honored.
    /// Exit code 8.
    #[error("out of memory: {0}")]
    OutOfMemory(String),

    /// Malformed CLI invocation. Exit code 3.
    #[error("invalid command line: {0}")]
    InvalidCommandLine(String),
}

impl Par2Error {
    /// Maps this error to the process exit code defined by the CLI spec.
    pub fn exit_code(&self) -> i32 {
        match self {
            Par2Error::InvalidCommandLine(_) => 3,
            Par2Error::InsufficientMetadata(_) => 4,
            Par2Error::RepairImpossible { .. } => 2,
            Par2Error::RepairFailed(_) => 5,
            Par2Error::Io { .. } => 6,
            Par2Error::MatrixSingular(_) | Par2Error::MatrixOverflow(_) => 7,
            Par2Error::OutOfMemory(_) => 8,
            // Format/Integrity errors are handled locally (packet dropped,
            // scan continues) and should never reach the top level in normal
            // operation; if one does escape, treat it as an I/O-class fault.
            Par2Error::Format { .. } | Par2Error::Integrity { .. } => 6,
        }
    }
}

impl From<crate::repair::RepairError> for Par2Error {
    fn from(e: crate::repair::RepairError) -> Self {
        use crate::repair::RepairError as RE;
        match e {
            RE::InsufficientRecovery { missing, available } => {
                Par2Error::RepairImpossible { missing, available }
            }
            RE::Io(cause) => Par2Error::Io {
                op: "repair",
                path: PathBuf::new(),
                cause,
            },
            RE::VerificationFailed(_) | RE::Md5MismatchAfterRepair { .. } => {
                Par2Error::RepairFailed(e.to_string())
            }
            other => Par2Error::RepairFailed(other.to_string()),
        }
    }
}

/// Result alias for code working in terms of the top-level error taxonomy.
pub type Result<T> = std::result::Result<T, Par2Error>;
