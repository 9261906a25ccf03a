use thiserror::Error;

pub use color_eyre::eyre;

#[derive(Debug, Error)]
pub enum Error {
    /// Any operation on a response writer after Empty or Complete succeeded
    #[error("closed writer")]
    ClosedWriter,

    /// Empty was requested after rows were already sent
    #[error("data has already been written")]
    DataWritten,

    #[error("Column count mismatch: expected {expected} values, got {actual}")]
    ColumnCountMismatch { expected: usize, actual: usize },

    /// A message can describe at most `i16::MAX` fields
    #[error("Too many columns: {0}")]
    TooManyColumns(usize),

    #[error("Format count mismatch: {formats} format codes for {columns} columns")]
    FormatCountMismatch { formats: usize, columns: usize },

    #[error("Invalid format code: {0}")]
    InvalidFormatCode(i16),

    #[error("Message too large: {size} bytes exceeds the limit of {max}")]
    MessageTooLarge { size: usize, max: usize },

    #[error("Invalid message")]
    InvalidMessage,

    #[error("Unexpected end of message")]
    UnexpectedEof,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Library bug: {0}")]
    LibraryBug(#[from] eyre::Report),
}

impl From<std::convert::Infallible> for Error {
    fn from(err: std::convert::Infallible) -> Self {
        match err {}
    }
}

impl From<simdutf8::basic::Utf8Error> for Error {
    fn from(_: simdutf8::basic::Utf8Error) -> Self {
        Error::InvalidMessage
    }
}

pub type Result<T> = std::result::Result<T, Error>;
