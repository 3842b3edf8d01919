//! Structured error handling and exit codes.

use serde::Serialize;

/// Process exit codes.
///
/// - 0: Success
/// - 1: General error (bad root, unwritable quarantine, bad config)
/// - 2: No duplicates found
/// - 3: Partial success (unreadable files, failed moves or failed renames)
/// - 130: Interrupted by Ctrl+C
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    NoDuplicates = 2,
    PartialSuccess = 3,
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Machine-readable code prefix (`TT000` ...).
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "TT000",
            Self::GeneralError => "TT001",
            Self::NoDuplicates => "TT002",
            Self::PartialSuccess => "TT003",
            Self::Interrupted => "TT130",
        }
    }
}

/// Structured error information for `--json-errors`.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "TT001")
    pub code: String,
    pub exit_code: i32,
    /// Human-readable message, including the cause chain.
    pub message: String,
    pub interrupted: bool,
}

impl StructuredError {
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{:#}", err),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
