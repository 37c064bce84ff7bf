//! RMHG/RSL archive container (the outer bundle holding GDLG files)
//!
//! Unlike GDLG, this format has no nested pointers: a 20-byte header, a
//! flat entry table of absolute offset/size pairs, the entry data (each
//! blob padded to a 0x20 boundary), and an optional trailer blob running to
//! end-of-file. Entry names are synthesized from the table position and the
//! blob's own leading magic.

use std::io::Cursor;

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use log::{debug, info};
use thiserror::Error;

/// File signature, the ASCII bytes `"RMHG"` read as a little-endian u32.
pub const RSL_MAGIC: u32 = 0x4748_4D52;

/// Per-entry record size in the entry table.
pub const ENTRY_RECORD_SIZE: usize = 0x20;

/// Reserved bytes per entry record, carried through repacking unchanged.
pub const ENTRY_RESERVED_SIZE: usize = 0x18;

/// The primary error type for RSL archive operations.
#[derive(Debug, Error)]
pub enum RslError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    /// The file does not start with the "RMHG" signature.
    #[error("Bad magic: expected \"RMHG\" ({:#010x}), got {found:#010x}", RSL_MAGIC)]
    BadMagic { found: u32 },

    /// An entry or trailer offset resolved past the end of the buffer.
    #[error("Offset out of bounds while reading {context}: {offset:#x} (buffer length {len:#x})")]
    OffsetOutOfBounds {
        context: &'static str,
        offset: u64,
        len: u64,
    },
}

/// A convenience `Result` type alias using the crate's `RslError` type.
pub type Result<T> = std::result::Result<T, RslError>;

/// One archived blob.
#[derive(Debug, Clone)]
pub struct RslEntry {
    /// Absolute file offset of the data as stored in the entry table.
    pub offset: u32,
    /// Stored (unpadded) data length.
    pub size: u32,
    /// Opaque entry-table bytes, carried through repacking unchanged.
    pub reserved: [u8; ENTRY_RESERVED_SIZE],
    pub data: Vec<u8>,
    /// Synthesized name: table index plus an extension derived from the
    /// blob's leading magic ("GDLG" → .GDLG, "RMHG" → .RSL).
    pub name: String,
}

/// A decoded RSL archive, ready for entry replacement and repacking.
#[derive(Debug, Clone)]
pub struct RslArchive {
    /// Original bytes up to the entry table, copied verbatim on repack.
    prefix: Vec<u8>,
    entry_table_offset: u32,
    trailer_offset: u32,
    pub entries: Vec<RslEntry>,
    pub trailer: Vec<u8>,
}

impl RslArchive {
    /// Decode an RSL archive from an in-memory byte buffer.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let len = bytes.len() as u64;
        let mut reader = Cursor::new(bytes);

        let magic = reader.read_u32::<LittleEndian>()?;
        if magic != RSL_MAGIC {
            return Err(RslError::BadMagic { found: magic });
        }
        let count = reader.read_u32::<LittleEndian>()?;
        let entry_table_offset = reader.read_u32::<LittleEndian>()?;
        let _reserved = reader.read_u32::<LittleEndian>()?;
        let trailer_offset = reader.read_u32::<LittleEndian>()?;

        info!(
            "RSL header: {} entries, table at {:#x}, trailer at {:#x}",
            count, entry_table_offset, trailer_offset
        );

        let table_end = entry_table_offset as u64 + count as u64 * ENTRY_RECORD_SIZE as u64;
        if entry_table_offset as u64 > len || table_end > len {
            return Err(RslError::OffsetOutOfBounds {
                context: "entry table",
                offset: table_end,
                len,
            });
        }
        let prefix = bytes[..entry_table_offset as usize].to_vec();

        let mut entries = Vec::with_capacity(count as usize);
        for i in 0..count {
            let record_start = entry_table_offset as usize + i as usize * ENTRY_RECORD_SIZE;
            let record = &bytes[record_start..record_start + ENTRY_RECORD_SIZE];
            let offset = LittleEndian::read_u32(&record[0..4]);
            let size = LittleEndian::read_u32(&record[4..8]);
            let mut reserved = [0u8; ENTRY_RESERVED_SIZE];
            reserved.copy_from_slice(&record[8..8 + ENTRY_RESERVED_SIZE]);

            let data_end = offset as u64 + size as u64;
            if data_end > len {
                return Err(RslError::OffsetOutOfBounds {
                    context: "entry data",
                    offset: data_end,
                    len,
                });
            }
            let data = bytes[offset as usize..data_end as usize].to_vec();
            let name = format!("{}{}", i, extension_for(&data));
            debug!("Entry {}: {} bytes at {:#x}", name, size, offset);

            entries.push(RslEntry {
                offset,
                size,
                reserved,
                data,
                name,
            });
        }

        let trailer = if trailer_offset > 0 {
            if trailer_offset as u64 > len {
                return Err(RslError::OffsetOutOfBounds {
                    context: "trailer",
                    offset: trailer_offset as u64,
                    len,
                });
            }
            bytes[trailer_offset as usize..].to_vec()
        } else {
            Vec::new()
        };

        Ok(Self {
            prefix,
            entry_table_offset,
            trailer_offset,
            entries,
            trailer,
        })
    }

    /// Serialize the archive back to bytes.
    ///
    /// The pre-table prefix is copied verbatim; entry data (possibly
    /// replaced through the public `entries` field) is appended in table
    /// order, each blob padded to a 0x20 boundary, with offset and unpadded
    /// size backpatched into the reserved table slots. A non-zero trailer
    /// offset is recomputed and patched at its fixed header position.
    pub fn repack(&self) -> Vec<u8> {
        info!("Repacking RSL archive: {} entries", self.entries.len());
        let mut buf = self.prefix.clone();
        buf.resize(buf.len() + self.entries.len() * ENTRY_RECORD_SIZE, 0);

        for (i, entry) in self.entries.iter().enumerate() {
            let data_offset = buf.len();
            buf.extend_from_slice(&entry.data);
            let padded = data_offset + entry.data.len().next_multiple_of(0x20);
            buf.resize(padded, 0);

            let record_start = self.entry_table_offset as usize + i * ENTRY_RECORD_SIZE;
            LittleEndian::write_u32(&mut buf[record_start..record_start + 4], data_offset as u32);
            LittleEndian::write_u32(
                &mut buf[record_start + 4..record_start + 8],
                entry.data.len() as u32,
            );
            buf[record_start + 8..record_start + ENTRY_RECORD_SIZE]
                .copy_from_slice(&entry.reserved);
        }

        if self.trailer_offset > 0 {
            let trailer_offset = buf.len() as u32;
            buf.extend_from_slice(&self.trailer);
            LittleEndian::write_u32(&mut buf[0x10..0x14], trailer_offset);
        }

        buf
    }
}

fn extension_for(data: &[u8]) -> &'static str {
    match data.get(..4) {
        Some(b"GDLG") => ".GDLG",
        Some(b"RMHG") => ".RSL",
        _ => "",
    }
}
