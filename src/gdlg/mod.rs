//! Core GDLG codec module
//!
//! # File structure
//!
//! ```text
//! ┌──────────────────────┐
//! │  Header (0x20)       │ ← header::parse()
//! ├──────────────────────┤
//! │  Page-pointer table  │ ← pages::parse()
//! ├──────────────────────┤
//! │  Text-pointer table  │ ← header::read_text_pool()
//! ├──────────────────────┤
//! │  Page data           │   pages, each followed inline by its
//! │  (interleaved)       │   table-pointer array, tables, line-pointer
//! │                      │   arrays, and line entries
//! ├──────────────────────┤
//! │  Text data           │   obfuscated Shift-JIS strings, pool order
//! └──────────────────────┘
//! ```
//!
//! Every structural pointer is a byte offset relative to its enclosing
//! block's start (file for the two top tables, page for table pointers,
//! table for line pointers). Decoding walks this graph recursively;
//! re-encoding rewrites it with reserve-then-backpatch offset fixups so the
//! output is byte-exact modulo text edits.

pub mod codec;
pub mod error;
pub mod markup;
pub mod models;

mod encoder;
mod header;
mod pages;
mod utils;

use std::fs;
use std::io::Cursor;
use std::path::Path;

use log::info;

pub use error::{GdlgError, Result};
pub use markup::{PageMarkup, TableMarkup};
pub use models::{GdlgDocument, GdlgHeader, LineEntry, LineTable, Page, TextEntry, TextPool};
pub use utils::align_up;

impl GdlgDocument {
    /// Decode a GDLG file from an in-memory byte buffer.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The buffer does not start with the "GDLG" signature
    /// - A structural pointer resolves past the end of the buffer
    /// - A title or line references a text index past the entry count
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let len = bytes.len() as u64;
        let mut reader = Cursor::new(bytes);

        let header = header::parse(&mut reader)?;
        let pool = header::read_text_pool(&mut reader, &header, len)?;
        let pages = pages::parse(&mut reader, &header, len)?;

        Ok(Self {
            header,
            pool,
            pages,
        })
    }

    /// Read and decode a GDLG file from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening GDLG file: {}", path.display());
        let bytes = fs::read(path)?;
        Self::parse(&bytes)
    }

    /// Render this document as human-editable marked-up text.
    pub fn to_markup(&self) -> Result<String> {
        markup::serialize(self)
    }
}

/// Decode a GDLG byte buffer straight to marked-up text.
pub fn unpack(bytes: &[u8]) -> Result<String> {
    GdlgDocument::parse(bytes)?.to_markup()
}

/// Re-encode edited marked-up text against the original GDLG bytes.
///
/// The original file supplies the structural skeleton and the
/// reserved/unknown fields that are carried through verbatim; the markup
/// supplies all text content.
pub fn repack(original: &[u8], markup_text: &str) -> Result<Vec<u8>> {
    let reference = GdlgDocument::parse(original)?;
    let blocks = markup::parse(markup_text)?;
    encoder::repack(&reference, &blocks)
}
