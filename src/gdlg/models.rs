//! Data structures representing GDLG format components

use super::error::{GdlgError, Result};

/// File signature, the ASCII bytes `"GDLG"` read as a little-endian u32.
pub const GDLG_MAGIC: u32 = 0x474C_4447;

/// Reserved bytes between a page's three leading fields and its
/// table-pointer array.
pub const PAGE_RESERVED_SIZE: usize = 0x14;

/// Reserved bytes inside a line-table header, carried through verbatim.
pub const LINE_TABLE_RESERVED_SIZE: usize = 0x1C;

/// Reserved padding written after each line entry's text index.
pub const LINE_ENTRY_RESERVED_SIZE: usize = 0xC;

/// Parsed GDLG file header.
///
/// All four offsets are absolute file positions. The two reserved blocks
/// are opaque and carried through re-encoding unchanged.
#[derive(Debug, Clone)]
pub struct GdlgHeader {
    pub reserved: [u8; 4],
    pub page_count: u16,
    pub text_entry_count: u16,
    pub page_table_offset: u32,
    pub page_data_offset: u32,
    pub text_table_offset: u32,
    pub text_data_offset: u32,
    pub reserved_tail: [u8; 4],
}

/// One obfuscated string in the text pool.
///
/// `pointer` is the stored offset relative to `textDataOffset`; `raw` holds
/// the obfuscated bytes as found on disk (terminator excluded).
#[derive(Debug, Clone)]
pub struct TextEntry {
    pub pointer: u32,
    pub raw: Vec<u8>,
    pub text: String,
}

/// The flat, shared store of all text strings, referenced by index from
/// page titles and line entries.
#[derive(Debug, Clone, Default)]
pub struct TextPool {
    pub entries: Vec<TextEntry>,
}

impl TextPool {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry, rejecting indices past the entry count.
    pub fn get(&self, index: u32) -> Result<&TextEntry> {
        self.entries
            .get(index as usize)
            .ok_or(GdlgError::IndexOutOfRange {
                index,
                count: self.entries.len() as u32,
            })
    }
}

/// A top-level dialogue unit: a title plus one or more line tables.
#[derive(Debug, Clone)]
pub struct Page {
    /// Stored offset relative to `pageDataOffset`.
    pub pointer: u32,
    /// Index of the title string in the text pool.
    pub title_index: u32,
    pub table_count: u32,
    /// Stored offset of the table-pointer array, relative to the page start.
    pub table_offset: u32,
    pub tables: Vec<LineTable>,
}

/// An ordered group of dialogue lines within a page.
#[derive(Debug, Clone)]
pub struct LineTable {
    /// Stored offset relative to the owning page's start.
    pub pointer: u32,
    pub magic: u16,
    pub line_count: u16,
    /// Opaque header bytes, carried through re-encoding unchanged.
    pub reserved: [u8; LINE_TABLE_RESERVED_SIZE],
    pub lines: Vec<LineEntry>,
}

/// A single dialogue line: an index into the text pool.
#[derive(Debug, Clone)]
pub struct LineEntry {
    /// Stored offset relative to the owning table's start.
    pub pointer: u32,
    pub text_index: u32,
}

/// A fully decoded GDLG file.
#[derive(Debug, Clone)]
pub struct GdlgDocument {
    pub header: GdlgHeader,
    pub pool: TextPool,
    pub pages: Vec<Page>,
}
