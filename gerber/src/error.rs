use thiserror::Error;

/// The one fallible surface in the library: everything else the parser
/// and renderer see is absorbed into best-effort nodes or silently
/// skipped drawing instead of erroring.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GerberError {
    #[error("expected exactly one command, found {0}")]
    ExpectedSingleCommand(usize),

    #[error("aperture code must be >= 10, got {0}")]
    ApertureCodeTooLow(i32),
}
