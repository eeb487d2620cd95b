use thiserror::Error;

/// Failures raised while turning a byte stream into [`Token`](crate::token::Token)s.
///
/// Does not derive `Clone`/`PartialEq`/`Eq`: [`LexError::Io`] carries a [`std::io::Error`],
/// which implements none of them.
#[derive(Debug, Error)]
pub enum LexError {
    #[error("invalid byte 0x{byte:02x} at offset {offset}")]
    InvalidByte { offset: u64, byte: u8 },

    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString { offset: u64 },

    #[error("bad escape sequence at offset {offset}")]
    BadEscape { offset: u64 },

    #[error("`stream` keyword at offset {offset} is not followed by LF or CRLF")]
    BadStreamKeyword { offset: u64 },

    #[error("numeric token at offset {offset} is neither a valid integer nor a valid decimal")]
    BadNumber { offset: u64 },

    #[error("I/O failure while reading the byte source: {0}")]
    Io(#[from] std::io::Error),
}

impl LexError {
    /// Byte offset where the error was detected. `0` for [`LexError::Io`], which has none.
    pub fn offset(&self) -> u64 {
        match *self {
            LexError::InvalidByte { offset, .. }
            | LexError::UnterminatedString { offset }
            | LexError::BadEscape { offset }
            | LexError::BadStreamKeyword { offset }
            | LexError::BadNumber { offset } => offset,
            LexError::Io(_) => 0,
        }
    }
}

/// Failures raised while assembling tokens into [`PdfObject`](crate::object::PdfObject)s.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("closing token at offset {offset} does not match the open container")]
    ContextMismatch { offset: u64 },

    #[error("closing token at offset {offset} has no matching open container")]
    StackUnderflow { offset: u64 },

    #[error("`stream` at offset {offset} has no preceding dictionary")]
    MissingStreamDictionary { offset: u64 },

    #[error("unexpected token at offset {offset}")]
    UnexpectedToken { offset: u64 },

    #[error("object or generation number at offset {offset} does not fit its representable range")]
    IdentifierOverflow { offset: u64 },

    #[error("expected {expected} but found {found} while parsing the indirect object")]
    TypeMismatch { expected: &'static str, found: &'static str },

    #[error(
        "indirect object identifier mismatch: expected {expected_number} {expected_generation} R, found {found_number} {found_generation} R"
    )]
    IdentifierMismatch {
        expected_number: u32,
        expected_generation: u16,
        found_number: u32,
        found_generation: u16,
    },

    #[error("no object parsed before end of input")]
    NoObjectParsed,

    #[error("container stack depth exceeded the configured cap of {cap}")]
    StackDepthExceeded { cap: usize },
}

/// The union of everything that can go wrong while tokenising or parsing.
///
/// Does not derive `Clone`/`PartialEq`/`Eq`: [`Error::Io`] and [`LexError::Io`] carry a
/// [`std::io::Error`], which implements none of them.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("I/O failure while reading the token source: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
