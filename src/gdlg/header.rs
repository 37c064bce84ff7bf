//! GDLG header parsing and text-pool scanning

use std::io::{Read, Seek};

use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, info};

use super::codec;
use super::error::{GdlgError, Result};
use super::models::{GdlgHeader, TextEntry, TextPool, GDLG_MAGIC};
use super::utils::seek_checked;

/// Parse the GDLG file header.
///
/// Header structure (32 bytes, all integers little-endian):
/// - 4 bytes: Magic ("GDLG")
/// - 4 bytes: Reserved
/// - 2 bytes: Page count
/// - 2 bytes: Text entry count
/// - 4 bytes: Page-table offset
/// - 4 bytes: Page-data offset
/// - 4 bytes: Text-table offset
/// - 4 bytes: Text-data offset
/// - 4 bytes: Reserved
///
/// The reader is expected to be positioned at the start of the file.
pub fn parse<R: Read + Seek>(reader: &mut R) -> Result<GdlgHeader> {
    info!("Parsing GDLG header");

    let magic = reader.read_u32::<LittleEndian>()?;
    if magic != GDLG_MAGIC {
        return Err(GdlgError::BadMagic { found: magic });
    }

    let mut reserved = [0u8; 4];
    reader.read_exact(&mut reserved)?;

    let page_count = reader.read_u16::<LittleEndian>()?;
    let text_entry_count = reader.read_u16::<LittleEndian>()?;
    let page_table_offset = reader.read_u32::<LittleEndian>()?;
    let page_data_offset = reader.read_u32::<LittleEndian>()?;
    let text_table_offset = reader.read_u32::<LittleEndian>()?;
    let text_data_offset = reader.read_u32::<LittleEndian>()?;

    let mut reserved_tail = [0u8; 4];
    reader.read_exact(&mut reserved_tail)?;

    info!(
        "Header parsed: pages={}, text entries={}, page table={:#x}, page data={:#x}, text table={:#x}, text data={:#x}",
        page_count, text_entry_count, page_table_offset, page_data_offset, text_table_offset, text_data_offset
    );

    Ok(GdlgHeader {
        reserved,
        page_count,
        text_entry_count,
        page_table_offset,
        page_data_offset,
        text_table_offset,
        text_data_offset,
        reserved_tail,
    })
}

/// Read the text pool: pointer table, then one sequential scan of the
/// string data.
///
/// The stored pointers (relative to `textDataOffset`) are kept for the
/// in-memory model but are not used to locate strings: entries are laid out
/// contiguously in pool order, so the scan simply walks forward collecting
/// bytes until a terminator. Both 0x00 and a literal 0x8D terminate an
/// entry (the terminator is consumed and excluded); a non-terminator byte
/// in the last file position is dropped.
pub fn read_text_pool<R: Read + Seek>(
    reader: &mut R,
    header: &GdlgHeader,
    len: u64,
) -> Result<TextPool> {
    info!("Reading text pool ({} entries)", header.text_entry_count);

    seek_checked(reader, header.text_table_offset as u64, len, "text table")?;
    let mut pointers = Vec::with_capacity(header.text_entry_count as usize);
    for _ in 0..header.text_entry_count {
        pointers.push(reader.read_u32::<LittleEndian>()?);
    }

    seek_checked(reader, header.text_data_offset as u64, len, "text data")?;
    let mut entries = Vec::with_capacity(pointers.len());
    for pointer in pointers {
        let mut raw = Vec::new();
        let mut b = reader.read_u8()?;
        while b != 0 && reader.stream_position()? < len {
            if b == codec::XOR_MASK {
                break;
            }
            raw.push(b);
            b = reader.read_u8()?;
        }
        let text = codec::decode(&raw);
        debug!("Text entry {}: {} raw bytes", entries.len(), raw.len());
        entries.push(TextEntry { pointer, raw, text });
    }

    Ok(TextPool { entries })
}
