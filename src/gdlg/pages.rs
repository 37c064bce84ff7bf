//! Page, line-table, and line-entry decoding
//!
//! The page region interleaves pointer arrays with the structures they
//! point to, so every pointer chase saves the cursor, seeks, reads, and
//! restores before the enclosing loop continues. Each nesting level has its
//! own offset base: page pointers are relative to `pageDataOffset`, table
//! pointers to the owning page's start, line pointers to the owning table's
//! start. The base is carried explicitly rather than derived from the
//! current file position.

use std::io::{Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, info};

use super::error::{GdlgError, Result};
use super::models::{GdlgHeader, LineEntry, LineTable, Page, LINE_TABLE_RESERVED_SIZE};
use super::utils::seek_checked;

/// Decode all pages in page-table order.
pub fn parse<R: Read + Seek>(reader: &mut R, header: &GdlgHeader, len: u64) -> Result<Vec<Page>> {
    info!("Reading {} pages", header.page_count);

    seek_checked(reader, header.page_table_offset as u64, len, "page table")?;
    let mut pages = Vec::with_capacity(header.page_count as usize);
    for i in 0..header.page_count {
        let pointer = reader.read_u32::<LittleEndian>()?;
        let next_page = reader.stream_position()?;

        let page_start = header.page_data_offset as u64 + pointer as u64;
        let page = parse_page(reader, header, page_start, len)?;
        debug!(
            "Page {}: title index {}, {} tables",
            i, page.title_index, page.table_count
        );
        pages.push(Page { pointer, ..page });

        reader.seek(SeekFrom::Start(next_page))?;
    }
    Ok(pages)
}

/// Decode one page record and its line tables. `page_start` is the base for
/// every table pointer inside this page.
fn parse_page<R: Read + Seek>(
    reader: &mut R,
    header: &GdlgHeader,
    page_start: u64,
    len: u64,
) -> Result<Page> {
    seek_checked(reader, page_start, len, "page record")?;
    let title_index = reader.read_u32::<LittleEndian>()?;
    check_text_index(title_index, header)?;
    let table_count = reader.read_u32::<LittleEndian>()?;
    let table_offset = reader.read_u32::<LittleEndian>()?;

    seek_checked(
        reader,
        page_start + table_offset as u64,
        len,
        "table-pointer array",
    )?;
    let mut tables = Vec::with_capacity(table_count as usize);
    for _ in 0..table_count {
        let table_pointer = reader.read_u32::<LittleEndian>()?;
        let next_table = reader.stream_position()?;

        let table_start = page_start + table_pointer as u64;
        tables.push(parse_table(reader, header, table_start, table_pointer, len)?);

        reader.seek(SeekFrom::Start(next_table))?;
    }

    Ok(Page {
        pointer: 0,
        title_index,
        table_count,
        table_offset,
        tables,
    })
}

/// Decode one line table. `table_start` is the base for every line pointer
/// inside this table.
fn parse_table<R: Read + Seek>(
    reader: &mut R,
    header: &GdlgHeader,
    table_start: u64,
    table_pointer: u32,
    len: u64,
) -> Result<LineTable> {
    seek_checked(reader, table_start, len, "line table")?;
    let magic = reader.read_u16::<LittleEndian>()?;
    let line_count = reader.read_u16::<LittleEndian>()?;
    let mut reserved = [0u8; LINE_TABLE_RESERVED_SIZE];
    reader.read_exact(&mut reserved)?;

    let mut lines = Vec::with_capacity(line_count as usize);
    for _ in 0..line_count {
        let line_pointer = reader.read_u32::<LittleEndian>()?;
        let next_line = reader.stream_position()?;

        seek_checked(reader, table_start + line_pointer as u64, len, "line entry")?;
        let text_index = reader.read_u32::<LittleEndian>()?;
        check_text_index(text_index, header)?;
        lines.push(LineEntry {
            pointer: line_pointer,
            text_index,
        });

        reader.seek(SeekFrom::Start(next_line))?;
    }

    Ok(LineTable {
        pointer: table_pointer,
        magic,
        line_count,
        reserved,
        lines,
    })
}

fn check_text_index(index: u32, header: &GdlgHeader) -> Result<()> {
    if index >= header.text_entry_count as u32 {
        return Err(GdlgError::IndexOutOfRange {
            index,
            count: header.text_entry_count as u32,
        });
    }
    Ok(())
}
