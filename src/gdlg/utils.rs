//! Low-level offset and alignment helpers

use std::io::{Seek, SeekFrom};

use super::error::{GdlgError, Result};

/// Round `len` up to the next multiple of `align`.
///
/// Structural pointer arrays pad their byte length to a 0x10 boundary
/// (0x20 for the page-pointer table); padding bytes are zero.
pub fn align_up(len: usize, align: usize) -> usize {
    len.next_multiple_of(align)
}

/// Seek to an absolute offset after validating it against the buffer length.
///
/// Every structural pointer chase goes through this so that a corrupt
/// offset fails with the offending position and a context label instead of
/// a bare I/O error.
pub fn seek_checked<R: Seek>(
    reader: &mut R,
    offset: u64,
    len: u64,
    context: &'static str,
) -> Result<()> {
    if offset > len {
        return Err(GdlgError::OffsetOutOfBounds {
            context,
            offset,
            len,
        });
    }
    reader.seek(SeekFrom::Start(offset))?;
    Ok(())
}
