use thiserror::Error;

/// Errors produced while computing, parsing or validating a [`crate::Checksum`].
#[derive(Debug, Error)]
pub enum Error {
    /// The checksum text was not well-formed (wrong field count, non-numeric version/type, or an
    /// undecodable digest).
    #[error("invalid checksum string: {0}")]
    Invalid(String),

    /// The numeric type id has no known [`crate::ChecksumType`] mapping.
    #[error("unsupported checksum type id: {0}")]
    UnsupportedType(u32),

    /// Reading the underlying file or stream failed.
    #[error("failed to read checksum input: {0}")]
    Io(#[source] std::io::Error),
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Invalid(a), Self::Invalid(b)) => a == b,
            (Self::UnsupportedType(a), Self::UnsupportedType(b)) => a == b,
            (Self::Io(a), Self::Io(b)) => a.kind() == b.kind(),
            _ => false,
        }
    }
}
