#![forbid(unsafe_code)]

/// Errors produced by cardsig.
///
/// `MalformedInput` and `CapabilityUnavailable` are the two outcomes of a
/// failed canonicalization; the first is a problem with the data, the second
/// with the build. Use [`Error::is_environment_fault`] to tell them apart.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed XML input: {0}")]
    MalformedInput(String),

    #[error("canonicalization unavailable: {0}")]
    CapabilityUnavailable(String),

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("transform error: {0}")]
    Transform(String),

    #[error("missing required element: {0}")]
    MissingElement(String),

    #[error("missing required attribute: {0}")]
    MissingAttribute(String),

    #[error("invalid URI reference: {0}")]
    InvalidUri(String),

    #[error("base64 decode error: {0}")]
    Base64(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True when the error comes from the deployment rather than the input.
    ///
    /// Such errors affect every call, so callers should alert operators
    /// instead of rejecting the document at hand.
    pub fn is_environment_fault(&self) -> bool {
        matches!(self, Error::CapabilityUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
