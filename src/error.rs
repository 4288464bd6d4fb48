//! Error types for the docmark library.

use std::io;
use thiserror::Error;

/// Result type alias for docmark operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while converting a document.
///
/// Content never produces an error: malformed lines, degenerate table grids
/// and empty input all degrade to best-effort Markdown. Errors come from
/// configuration and from the collaborators that supply text and geometry.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not recognized as a PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version header is malformed.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// The text or geometry collaborator failed.
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    /// A configured pattern is not a valid regular expression.
    #[error("Invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A document profile could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error during rendering (JSON serialization).
    #[error("Rendering error: {0}")]
    Render(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::ExtractionFailed(err.to_string()),
        }
    }
}

impl From<pdf_extract::OutputError> for Error {
    fn from(err: pdf_extract::OutputError) -> Self {
        Error::ExtractionFailed(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}

/// Compile a regular expression, reporting the offending pattern on failure.
pub(crate) fn compile(pattern: &str) -> Result<regex::Regex> {
    regex::Regex::new(pattern).map_err(|source| Error::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::ExtractionFailed("no content stream".to_string());
        assert_eq!(err.to_string(), "Extraction failed: no content stream");

        let err = Error::UnsupportedVersion("x.y".to_string());
        assert_eq!(err.to_string(), "Unsupported PDF version: x.y");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_compile_reports_pattern() {
        let err = compile("(unclosed").unwrap_err();
        match err {
            Error::InvalidPattern { pattern, .. } => assert_eq!(pattern, "(unclosed"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(compile(r"^\d+$").is_ok());
    }

    #[test]
    fn test_json_error_is_config() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, Error::Config(_)));
    }
}
