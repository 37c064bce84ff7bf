//! Custom error types for GDLG decoding and encoding.

use thiserror::Error;

use super::models::GDLG_MAGIC;

/// The primary error type for all GDLG operations.
#[derive(Debug, Error)]
pub enum GdlgError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    /// The file does not start with the "GDLG" signature.
    #[error("Bad magic: expected \"GDLG\" ({:#010x}), got {found:#010x}", GDLG_MAGIC)]
    BadMagic { found: u32 },

    /// A structural pointer resolved past the end of the buffer.
    #[error("Offset out of bounds while reading {context}: {offset:#x} (buffer length {len:#x})")]
    OffsetOutOfBounds {
        context: &'static str,
        offset: u64,
        len: u64,
    },

    /// A title or line referenced a text-pool index past the entry count.
    #[error("Text index {index} out of range ({count} pool entries)")]
    IndexOutOfRange { index: u32, count: u32 },

    /// An expected marker was not found while parsing marked-up text.
    #[error("Malformed markup at line {line}: expected {expected}")]
    MalformedMarkup { line: usize, expected: &'static str },

    /// The rebuilt text pool no longer fits the 16-bit entry-count field.
    #[error("Too many text entries for the format: {count} (limit {})", u16::MAX)]
    EntryLimitExceeded { count: usize },
}

/// A convenience `Result` type alias using the crate's `GdlgError` type.
pub type Result<T> = std::result::Result<T, GdlgError>;
