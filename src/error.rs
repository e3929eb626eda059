//! Error types for lessonmerge.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for lessonmerge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for lessonmerge.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not a ZIP package at all.
    #[error("Not a DOCX package: {0}")]
    NotAPackage(String),

    /// ZIP archive decode or encode error.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// The main markup part is not well-formed XML.
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// Required part or element is missing.
    #[error("Missing required component: {0}")]
    MissingComponent(String),

    /// Text encoding error.
    #[error("Text encoding error: {0}")]
    Encoding(String),

    /// Well-formed markup this crate cannot safely write into.
    #[error("Unsupported document markup: {0}")]
    UnsupportedMarkup(String),

    /// A caller-supplied option value was rejected.
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// The text-generation collaborator failed.
    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),
}

impl Error {
    /// Returns how a caller should recover from this error.
    pub fn remediation(&self) -> Remediation {
        match self {
            Error::Generation(e) if e.is_transient() => Remediation::Retry,
            Error::Generation(GenerationError::RetriesExhausted { .. }) => Remediation::Retry,
            Error::Generation(_) => Remediation::CorrectInput,
            Error::InvalidOption(_) => Remediation::CorrectInput,
            Error::NotAPackage(_)
            | Error::MissingComponent(_)
            | Error::XmlParse(_)
            | Error::UnsupportedMarkup(_) => Remediation::PlainTextExport,
            Error::Io(_) | Error::ZipArchive(_) | Error::Encoding(_) => Remediation::PlainTextExport,
        }
    }
}

/// Recovery path suggested for a terminal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remediation {
    /// Try the same request again later.
    Retry,
    /// Hand the raw text to the user instead of a document.
    PlainTextExport,
    /// Ask the user to fix credentials, quota or input.
    CorrectInput,
}

/// Failure reported by the text-generation collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// Server busy or overloaded; worth retrying.
    #[error("model overloaded: {0}")]
    Overloaded(String),

    /// Rejected API key or permission.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The request itself was rejected.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// Rate limit or quota reached.
    #[error("quota exhausted: {0}")]
    QuotaExhausted(String),

    /// The call succeeded but returned no text.
    #[error("empty response from model")]
    EmptyResponse,

    /// All retry attempts hit transient failures.
    #[error("gave up after {attempts} attempts ({delay:?} apart): {last}")]
    RetriesExhausted {
        attempts: u32,
        delay: Duration,
        last: String,
    },

    /// Anything not recognized above.
    #[error("{0}")]
    Other(String),
}

impl GenerationError {
    /// Returns true for failures a retry may resolve.
    pub fn is_transient(&self) -> bool {
        matches!(self, GenerationError::Overloaded(_))
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Self {
        Error::Encoding(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Error::Encoding(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_errors_fall_back_to_text() {
        let err = Error::MissingComponent("word/document.xml".into());
        assert_eq!(err.remediation(), Remediation::PlainTextExport);

        let err = Error::ZipArchive("invalid Zip archive".into());
        assert_eq!(err.remediation(), Remediation::PlainTextExport);

        let err = Error::UnsupportedMarkup("body prefix 'x'".into());
        assert_eq!(err.remediation(), Remediation::PlainTextExport);
    }

    #[test]
    fn test_invalid_option_needs_correction() {
        let err = Error::InvalidOption("highlight color".into());
        assert_eq!(err.remediation(), Remediation::CorrectInput);
    }

    #[test]
    fn test_generation_errors_classified() {
        let busy = Error::from(GenerationError::Overloaded("503".into()));
        assert_eq!(busy.remediation(), Remediation::Retry);

        let key = Error::from(GenerationError::InvalidCredentials("API key not valid".into()));
        assert_eq!(key.remediation(), Remediation::CorrectInput);
    }
}
