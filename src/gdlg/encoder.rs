//! GDLG re-encoding (repacking)
//!
//! The writer emits the file regions in a fixed order — header,
//! page-pointer table, text-pointer table, page data, text data — and
//! writes every structural pointer as a forward patch: placeholder bytes
//! are reserved where a pointer array belongs, the pointed-to structures
//! are written in order, and each slot is filled in once the structure's
//! actual position is known. Offset bases mirror the decoder exactly: page
//! pointers are relative to `pageDataOffset`, table pointers to the page
//! start, line pointers to the table start, text pointers to
//! `textDataOffset`.

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use log::{debug, info};

use super::codec;
use super::error::{GdlgError, Result};
use super::markup::PageMarkup;
use super::models::{
    GdlgDocument, LineEntry, Page, GDLG_MAGIC, LINE_ENTRY_RESERVED_SIZE, PAGE_RESERVED_SIZE,
};
use super::utils::align_up;

/// Re-encode a document from edited markup blocks.
///
/// The reference document supplies the structural skeleton (page order,
/// table counts, table magic values, reserved byte blocks); the markup
/// supplies all text. Text-pool indices are reassigned sequentially in
/// markup encounter order — each page's title first, then its tables'
/// lines — so every reference to the pool points at the rebuilt positions.
pub fn repack(reference: &GdlgDocument, edits: &[PageMarkup]) -> Result<Vec<u8>> {
    let (pages, pool_texts) = rebuild(reference, edits)?;
    write(reference, &pages, &pool_texts)
}

/// Apply markup blocks to a copy of the reference skeleton, producing the
/// updated pages and the new text pool in traversal order.
fn rebuild(reference: &GdlgDocument, edits: &[PageMarkup]) -> Result<(Vec<Page>, Vec<String>)> {
    let mut pages = reference.pages.clone();
    let mut covered = vec![false; pages.len()];
    let mut pool_texts: Vec<String> = Vec::new();

    for block in edits {
        let page = pages
            .get_mut(block.page_index)
            .ok_or(GdlgError::MalformedMarkup {
                line: block.line,
                expected: "#PAGE= index within the reference page count",
            })?;
        if covered[block.page_index] {
            return Err(GdlgError::MalformedMarkup {
                line: block.line,
                expected: "each #PAGE= index at most once",
            });
        }
        covered[block.page_index] = true;

        page.title_index = pool_texts.len() as u32;
        pool_texts.push(block.title.clone());

        // Some files interleave an unreferenced "NON" entry directly after a
        // page's title; the markup never shows it, so it is restored from
        // the reference pool to keep subsequent indices stable.
        if let Some(next) = reference.pool.entries.get(block.title_index as usize + 1) {
            if next.text == "NON" {
                pool_texts.push("NON".to_string());
            }
        }

        if block.tables.len() != page.tables.len() {
            return Err(GdlgError::MalformedMarkup {
                line: block.line,
                expected: "one /*INDEX= block per line table",
            });
        }
        for tm in &block.tables {
            let table =
                page.tables
                    .get_mut(tm.table_index)
                    .ok_or(GdlgError::MalformedMarkup {
                        line: tm.line,
                        expected: "/*INDEX= value within the page's table count",
                    })?;
            if tm.lines.len() > u16::MAX as usize {
                return Err(GdlgError::EntryLimitExceeded {
                    count: tm.lines.len(),
                });
            }
            table.line_count = tm.lines.len() as u16;
            table.lines = tm
                .lines
                .iter()
                .map(|text| {
                    let text_index = pool_texts.len() as u32;
                    pool_texts.push(text.clone());
                    LineEntry {
                        pointer: 0,
                        text_index,
                    }
                })
                .collect();
        }
    }

    if let Some(missing) = covered.iter().position(|c| !c) {
        debug!("Markup covers no block for page {}", missing);
        return Err(GdlgError::MalformedMarkup {
            line: 0,
            expected: "a #PAGE= block for every reference page",
        });
    }
    if pool_texts.len() > u16::MAX as usize {
        return Err(GdlgError::EntryLimitExceeded {
            count: pool_texts.len(),
        });
    }

    Ok((pages, pool_texts))
}

/// Serialize the rebuilt document to bytes.
fn write(reference: &GdlgDocument, pages: &[Page], pool_texts: &[String]) -> Result<Vec<u8>> {
    info!(
        "Repacking {} pages, {} text entries",
        pages.len(),
        pool_texts.len()
    );
    let header = &reference.header;
    let mut buf: Vec<u8> = Vec::new();

    // Header; the four region offsets are reserved and patched at the end.
    buf.write_u32::<LittleEndian>(GDLG_MAGIC)?;
    buf.extend_from_slice(&header.reserved);
    buf.write_u16::<LittleEndian>(header.page_count)?;
    buf.write_u16::<LittleEndian>(pool_texts.len() as u16)?;
    let header_offsets_pos = buf.len();
    buf.resize(buf.len() + 16, 0);
    buf.extend_from_slice(&header.reserved_tail);

    // Page-pointer table, padded to 0x20.
    let page_table_offset = buf.len();
    buf.resize(buf.len() + align_up(pages.len() * 4, 0x20), 0);

    // Text-pointer table, padded to 0x10.
    let text_table_offset = buf.len();
    buf.resize(buf.len() + align_up(pool_texts.len() * 4, 0x10), 0);

    // Page data region.
    let page_data_offset = buf.len();
    for (i, page) in pages.iter().enumerate() {
        let page_start = buf.len();
        patch_u32(
            &mut buf,
            page_table_offset + i * 4,
            (page_start - page_data_offset) as u32,
        );

        buf.write_u32::<LittleEndian>(page.title_index)?;
        buf.write_u32::<LittleEndian>(page.tables.len() as u32)?;
        let table_offset_pos = buf.len();
        buf.resize(buf.len() + 4 + PAGE_RESERVED_SIZE, 0);

        // Table-pointer array, relative to the page start.
        let table_array_pos = buf.len();
        patch_u32(&mut buf, table_offset_pos, (table_array_pos - page_start) as u32);
        buf.resize(buf.len() + align_up(page.tables.len() * 4, 0x10), 0);

        for (x, table) in page.tables.iter().enumerate() {
            let table_start = buf.len();
            patch_u32(
                &mut buf,
                table_array_pos + x * 4,
                (table_start - page_start) as u32,
            );

            buf.write_u16::<LittleEndian>(table.magic)?;
            buf.write_u16::<LittleEndian>(table.lines.len() as u16)?;
            buf.extend_from_slice(&table.reserved);

            // Line-pointer array, relative to the table start.
            let line_array_pos = buf.len();
            buf.resize(buf.len() + align_up(table.lines.len() * 4, 0x10), 0);

            for (y, line) in table.lines.iter().enumerate() {
                let line_start = buf.len();
                patch_u32(
                    &mut buf,
                    line_array_pos + y * 4,
                    (line_start - table_start) as u32,
                );
                buf.write_u32::<LittleEndian>(line.text_index)?;
                buf.resize(buf.len() + LINE_ENTRY_RESERVED_SIZE, 0);
            }
        }
        debug!(
            "Page {} written: {} bytes",
            i,
            buf.len() - page_start
        );
    }

    // Text data region, entries in pool order.
    let text_data_offset = buf.len();
    for (i, text) in pool_texts.iter().enumerate() {
        let entry_start = buf.len();
        patch_u32(
            &mut buf,
            text_table_offset + i * 4,
            (entry_start - text_data_offset) as u32,
        );
        buf.extend_from_slice(&codec::encode(text));
    }

    // Final buffer length padded to 0x10.
    buf.resize(align_up(buf.len(), 0x10), 0);

    patch_u32(&mut buf, header_offsets_pos, page_table_offset as u32);
    patch_u32(&mut buf, header_offsets_pos + 4, page_data_offset as u32);
    patch_u32(&mut buf, header_offsets_pos + 8, text_table_offset as u32);
    patch_u32(&mut buf, header_offsets_pos + 12, text_data_offset as u32);

    info!("Repacked buffer: {} bytes", buf.len());
    Ok(buf)
}

/// Fill a previously reserved pointer slot.
fn patch_u32(buf: &mut [u8], pos: usize, value: u32) {
    LittleEndian::write_u32(&mut buf[pos..pos + 4], value);
}
