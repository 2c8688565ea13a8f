use std::fmt;

/// Errors raised by a [`MediaStore`](super::MediaStore).
#[derive(Debug)]
pub enum StorageError {
    /// No stored file carries the requested name.
    NotFound(String),
    /// An I/O error occurred.
    Io(std::io::Error),
    /// The requested name is not a flat file name inside the store.
    InvalidName(String),
    /// The file exceeds the configured size limit.
    SizeLimitExceeded { actual: u64, limit: u64 },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(name) => write!(f, "media file not found: {name}"),
            Self::Io(err) => write!(f, "storage IO error: {err}"),
            Self::InvalidName(msg) => write!(f, "invalid media file name: {msg}"),
            Self::SizeLimitExceeded { actual, limit } => {
                write!(f, "media file exceeds size limit ({actual} > {limit} bytes)")
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
