//! # gdlg-tools
//!
//! Decoder and re-encoder for the GDLG dialogue-script container format,
//! plus the RMHG/RSL archive that bundles GDLG files.
//!
//! Decoding turns a GDLG binary into human-editable marked-up text;
//! re-encoding turns edited text back into a binary that is byte-exact
//! modulo the text changes, recomputing every relative offset and
//! alignment pad so the game engine still loads the file.
//!
//! ## Example
//!
//! ```no_run
//! use std::fs;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let original = fs::read("dialogue.gdlg")?;
//!
//! // Decode to editable text
//! let text = gdlg_tools::unpack(&original)?;
//! fs::write("dialogue.txt", &text)?;
//!
//! // … edit the text …
//!
//! // Re-encode against the original for the structural skeleton
//! let edited = fs::read_to_string("dialogue.txt")?;
//! let rebuilt = gdlg_tools::repack(&original, &edited)?;
//! fs::write("dialogue-new.GDLG", rebuilt)?;
//! # Ok(())
//! # }
//! ```

pub mod gdlg;
pub mod rsl;

// Re-export the main types for convenience
pub use gdlg::{repack, unpack, GdlgDocument, GdlgError};
pub use rsl::{RslArchive, RslEntry, RslError};
