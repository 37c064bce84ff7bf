//! Obfuscated text codec (XOR mask + Shift-JIS)

use encoding_rs::SHIFT_JIS;
use log::trace;

/// Every byte of on-disk text is XORed with this mask.
///
/// The same value doubles as a string terminator in the raw stream: after
/// masking, the appended 0x00 terminator is stored as 0x8D. A literal 0x00
/// in the raw stream (a pre-mask 0x8D byte) terminates scanning too; this
/// ambiguity is a quirk of the format and is preserved as observed.
pub const XOR_MASK: u8 = 0x8D;

/// Decode an obfuscated byte string (terminator already stripped).
///
/// Unmasks each byte, then interprets the result as Shift-JIS.
pub fn decode(raw: &[u8]) -> String {
    trace!("Decoding {} obfuscated bytes", raw.len());
    let unmasked: Vec<u8> = raw.iter().map(|b| b ^ XOR_MASK).collect();
    let (text, _, _) = SHIFT_JIS.decode(&unmasked);
    text.into_owned()
}

/// Encode a string to its on-disk form.
///
/// Encodes as Shift-JIS, appends a single 0x00 terminator, then masks every
/// byte (terminator included), so the stored terminator byte is 0x8D.
pub fn encode(text: &str) -> Vec<u8> {
    trace!("Encoding {} chars to obfuscated bytes", text.len());
    let (bytes, _, _) = SHIFT_JIS.encode(text);
    let mut out: Vec<u8> = bytes.iter().map(|b| b ^ XOR_MASK).collect();
    out.push(0x00 ^ XOR_MASK);
    out
}
