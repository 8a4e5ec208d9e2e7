use std::path::PathBuf;

/// Broad failure classes callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad magic bytes or misaligned file size.
    Format,
    /// Malformed card or disallowed duplicate keyword.
    Parse,
    /// Stream ended before a header or data block could be resolved.
    Io,
    /// Source file does not exist.
    NotFound,
}

#[derive(Debug, thiserror::Error)]
pub enum FitsError {
    #[error("Invalid FITS format: {0}")]
    InvalidFormat(String),

    #[error("Header parsing error: {0}")]
    HeaderParse(String),

    #[error("Keyword '{0}' appears more than once")]
    DuplicateKeyword(String),

    #[error("Keyword {keyword} not found")]
    KeywordNotFound { keyword: String },

    #[error("Invalid keyword value: {keyword} = {value}")]
    InvalidKeywordValue { keyword: String, value: String },

    #[error("Unexpected end of stream: {0}")]
    UnexpectedEof(String),

    #[error("Header block at byte {0} is all blank")]
    BlankHeaderBlock(u64),

    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("HDU not found: {0}")]
    HduNotFound(usize),

    #[error("Unsupported column format '{format}' in column {column}")]
    UnsupportedColumnFormat { column: usize, format: String },

    #[error("Column '{0}' not found")]
    ColumnNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FitsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidFormat(_)
            | Self::KeywordNotFound { .. }
            | Self::HduNotFound(_)
            | Self::UnsupportedColumnFormat { .. }
            | Self::ColumnNotFound(_) => ErrorKind::Format,
            Self::HeaderParse(_)
            | Self::DuplicateKeyword(_)
            | Self::InvalidKeywordValue { .. } => ErrorKind::Parse,
            Self::UnexpectedEof(_) | Self::BlankHeaderBlock(_) | Self::Io(_) => ErrorKind::Io,
            Self::NotFound(_) => ErrorKind::NotFound,
        }
    }
}

pub type Result<T> = std::result::Result<T, FitsError>;
