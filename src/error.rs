use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Encoding refused: the codec frames have no representation for
    /// zero-length input.
    #[error("input is empty")]
    EmptyInput,

    /// Decoder ran out of input mid-token.
    #[error("truncated stream: {0}")]
    TruncatedStream(&'static str),

    /// Structural violation: unknown tag, bad magic, inconsistent lengths.
    #[error("corrupt frame: {0}")]
    CorruptFrame(String),

    /// Huffman tree serialisation inconsistent, or the bit stream descended
    /// into a missing child.
    #[error("corrupt Huffman tree: {0}")]
    CorruptTree(&'static str),

    /// LZ77 match distance exceeds the bytes decoded so far.
    #[error("back-reference distance {distance} exceeds available output {available}")]
    BadReference { distance: u16, available: usize },

    /// Requested codec name is not in the registry.
    #[error("unsupported codec: {0}")]
    Unsupported(String),
}

impl Error {
    /// Stable machine-readable kind, independent of the message text.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EmptyInput => ErrorKind::EmptyInput,
            Error::TruncatedStream(_) => ErrorKind::TruncatedStream,
            Error::CorruptFrame(_) => ErrorKind::CorruptFrame,
            Error::CorruptTree(_) => ErrorKind::CorruptTree,
            Error::BadReference { .. } => ErrorKind::BadReference,
            Error::Unsupported(_) => ErrorKind::Unsupported,
        }
    }
}

/// Error kind without payload, for callers that branch on failure class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    EmptyInput,
    TruncatedStream,
    CorruptFrame,
    CorruptTree,
    BadReference,
    Unsupported,
}

pub type Result<T> = std::result::Result<T, Error>;
