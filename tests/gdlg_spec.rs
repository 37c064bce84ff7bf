use std::fs;

use gdlg_tools::gdlg::{self, align_up, codec, GdlgDocument, GdlgError};

/// XOR-mask a string's ASCII bytes and append the masked terminator,
/// mirroring the on-disk form independently of the crate's codec.
fn obfuscate(s: &str) -> Vec<u8> {
    s.bytes().map(|b| b ^ 0x8D).chain([0x8D]).collect()
}

fn put_u16(buf: &mut [u8], pos: usize, v: u16) {
    buf[pos..pos + 2].copy_from_slice(&v.to_le_bytes());
}

fn put_u32(buf: &mut [u8], pos: usize, v: u32) {
    buf[pos..pos + 4].copy_from_slice(&v.to_le_bytes());
}

/// The one-page scenario: one page (title entry 0), one line table with a
/// single line referencing text entry 1. All offsets laid out by hand:
///
/// ```text
/// 0x00  header                       0x70  table-pointer array [0x30]
/// 0x20  page-pointer table [0]       0x80  line table (magic 0x1234)
/// 0x40  text-pointer table [0, 6]    0xA0  line-pointer array [0x30]
/// 0x50  page record                  0xB0  line entry (index 1)
///                                    0xC0  text data, padded to 0xD0
/// ```
fn one_page_fixture() -> Vec<u8> {
    let mut f = vec![0u8; 0xC0];
    f[0..4].copy_from_slice(b"GDLG");
    f[4..8].copy_from_slice(&[1, 2, 3, 4]);
    put_u16(&mut f, 0x08, 1); // page count
    put_u16(&mut f, 0x0A, 2); // text entry count
    put_u32(&mut f, 0x0C, 0x20); // page table
    put_u32(&mut f, 0x10, 0x50); // page data
    put_u32(&mut f, 0x14, 0x40); // text table
    put_u32(&mut f, 0x18, 0xC0); // text data

    // page-pointer table: page 0 at pageDataOffset + 0
    put_u32(&mut f, 0x20, 0);
    // text-pointer table
    put_u32(&mut f, 0x40, 0);
    put_u32(&mut f, 0x44, 6);
    // page record: title entry 0, one table at page start + 0x20
    put_u32(&mut f, 0x50, 0);
    put_u32(&mut f, 0x54, 1);
    put_u32(&mut f, 0x58, 0x20);
    // table-pointer array: table 0 at page start + 0x30
    put_u32(&mut f, 0x70, 0x30);
    // line table header
    put_u16(&mut f, 0x80, 0x1234);
    put_u16(&mut f, 0x82, 1);
    // line-pointer array: line 0 at table start + 0x30
    put_u32(&mut f, 0xA0, 0x30);
    // line entry: text entry 1
    put_u32(&mut f, 0xB0, 1);

    f.extend(obfuscate("Title"));
    f.extend(obfuscate("Hello"));
    f.resize(0xD0, 0);
    f
}

const ONE_PAGE_MARKUP: &str = "#PAGE=0\n#TITLE=Title\n#TITLE_INDEX=0\n\n/*INDEX=0\nHello\n*/\n\n#END\n\n";

/// Variant with a hidden "NON" entry between the title and the dialogue
/// line, as some real files carry: pool = [Title, NON, Hello], line
/// references entry 2. The markup never shows the NON entry.
fn non_entry_fixture() -> Vec<u8> {
    let mut f = one_page_fixture();
    put_u16(&mut f, 0x0A, 3);
    put_u32(&mut f, 0x44, 6); // NON
    put_u32(&mut f, 0x48, 10); // Hello
    put_u32(&mut f, 0xB0, 2); // line references entry 2
    f.truncate(0xC0);
    f.extend(obfuscate("Title"));
    f.extend(obfuscate("NON"));
    f.extend(obfuscate("Hello"));
    assert_eq!(f.len(), 0xD0, "fixture layout drifted");
    f
}

#[test]
fn one_page_scenario_decodes() {
    let doc = GdlgDocument::parse(&one_page_fixture()).expect("decode");

    assert_eq!(doc.header.page_count, 1);
    assert_eq!(doc.header.text_entry_count, 2);
    assert_eq!(doc.header.page_table_offset, 0x20);
    assert_eq!(doc.header.page_data_offset, 0x50);
    assert_eq!(doc.header.text_table_offset, 0x40);
    assert_eq!(doc.header.text_data_offset, 0xC0);
    assert_eq!(doc.header.reserved, [1, 2, 3, 4]);

    assert_eq!(doc.pool.len(), 2);
    assert_eq!(doc.pool.entries[0].text, "Title");
    assert_eq!(doc.pool.entries[1].text, "Hello");
    assert_eq!(doc.pool.entries[1].pointer, 6);

    assert_eq!(doc.pages.len(), 1);
    let page = &doc.pages[0];
    assert_eq!(page.title_index, 0);
    assert_eq!(page.tables.len(), 1);
    let table = &page.tables[0];
    assert_eq!(table.magic, 0x1234);
    assert_eq!(table.lines.len(), 1);
    assert_eq!(table.lines[0].text_index, 1);
}

#[test]
fn one_page_markup_output() {
    let text = gdlg::unpack(&one_page_fixture()).expect("unpack");
    assert_eq!(text, ONE_PAGE_MARKUP);
}

#[test]
fn unedited_roundtrip_is_byte_identical() {
    let original = one_page_fixture();
    let markup = gdlg::unpack(&original).expect("unpack");
    let rebuilt = gdlg::repack(&original, &markup).expect("repack");
    assert_eq!(rebuilt, original, "unedited re-encode must reproduce the file");
}

#[test]
fn non_entry_roundtrip_is_byte_identical() {
    let original = non_entry_fixture();
    let markup = gdlg::unpack(&original).expect("unpack");
    assert!(
        !markup.contains("NON"),
        "hidden entry must not appear in markup"
    );
    let rebuilt = gdlg::repack(&original, &markup).expect("repack");
    assert_eq!(rebuilt, original, "NON entry must be restored in place");
}

#[test]
fn edited_text_reaches_the_pool() {
    let original = one_page_fixture();
    let markup = gdlg::unpack(&original).expect("unpack");
    let edited = markup.replace("Hello", "Goodbye");

    let rebuilt = gdlg::repack(&original, &edited).expect("repack");
    let doc = GdlgDocument::parse(&rebuilt).expect("decode rebuilt");
    assert_eq!(doc.pool.entries[1].text, "Goodbye");
    assert_eq!(doc.pool.entries[0].text, "Title");
    assert_eq!(doc.pages[0].tables[0].lines[0].text_index, 1);
}

#[test]
fn added_line_renumbers_pool_in_traversal_order() {
    let original = one_page_fixture();
    let markup = gdlg::unpack(&original).expect("unpack");
    let edited = markup.replace("Hello\n*/", "Hello\nWorld\n*/");

    let rebuilt = gdlg::repack(&original, &edited).expect("repack");
    let doc = GdlgDocument::parse(&rebuilt).expect("decode rebuilt");

    assert_eq!(doc.header.text_entry_count, 3);
    let texts: Vec<&str> = doc.pool.entries.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, ["Title", "Hello", "World"]);

    let table = &doc.pages[0].tables[0];
    assert_eq!(table.line_count, 2);
    let indices: Vec<u32> = table.lines.iter().map(|l| l.text_index).collect();
    assert_eq!(indices, [1, 2]);
}

#[test]
fn empty_text_entry_roundtrips() {
    let mut original = one_page_fixture();
    // Replace "Hello" with an empty entry: a single masked terminator byte.
    original.truncate(0xC0);
    original.extend(obfuscate("Title"));
    original.extend(obfuscate(""));
    original.resize(0xD0, 0);

    let doc = GdlgDocument::parse(&original).expect("decode");
    assert_eq!(doc.pool.entries[1].text, "");
    assert!(doc.pool.entries[1].raw.is_empty());

    let markup = gdlg::unpack(&original).expect("unpack");
    let rebuilt = gdlg::repack(&original, &markup).expect("repack");
    assert_eq!(rebuilt, original);
}

#[test]
fn bad_magic_is_rejected() {
    let mut bytes = one_page_fixture();
    bytes[0..4].copy_from_slice(b"XXXX");
    let err = GdlgDocument::parse(&bytes).unwrap_err();
    assert!(matches!(err, GdlgError::BadMagic { .. }), "got {:?}", err);
}

#[test]
fn out_of_bounds_pointer_is_rejected() {
    let mut bytes = one_page_fixture();
    put_u32(&mut bytes, 0x20, 0xFFFF); // page 0 pointer far past EOF
    let err = GdlgDocument::parse(&bytes).unwrap_err();
    assert!(
        matches!(err, GdlgError::OffsetOutOfBounds { .. }),
        "got {:?}",
        err
    );
}

#[test]
fn text_index_out_of_range_is_rejected() {
    let mut bytes = one_page_fixture();
    put_u32(&mut bytes, 0xB0, 7); // line entry references a missing text
    let err = GdlgDocument::parse(&bytes).unwrap_err();
    assert!(
        matches!(err, GdlgError::IndexOutOfRange { index: 7, count: 2 }),
        "got {:?}",
        err
    );
}

#[test]
fn missing_end_marker_fails() {
    let original = one_page_fixture();
    let truncated = ONE_PAGE_MARKUP.replace("#END\n\n", "");
    let err = gdlg::repack(&original, &truncated).unwrap_err();
    assert!(
        matches!(err, GdlgError::MalformedMarkup { expected: "#END", .. }),
        "got {:?}",
        err
    );
}

#[test]
fn missing_table_close_fails() {
    let original = one_page_fixture();
    let truncated = ONE_PAGE_MARKUP.replace("*/\n\n", "");
    let err = gdlg::repack(&original, &truncated).unwrap_err();
    assert!(
        matches!(err, GdlgError::MalformedMarkup { expected: "*/", .. }),
        "got {:?}",
        err
    );
}

#[test]
fn missing_table_block_fails() {
    let original = one_page_fixture();
    let gutted = ONE_PAGE_MARKUP.replace("/*INDEX=0\nHello\n*/\n\n", "");
    let err = gdlg::repack(&original, &gutted).unwrap_err();
    assert!(matches!(err, GdlgError::MalformedMarkup { .. }), "got {:?}", err);
}

#[test]
fn markup_parsing_skips_junk_between_markers() {
    let original = one_page_fixture();
    let noisy = format!("; tool banner\n\n{}", ONE_PAGE_MARKUP);
    let rebuilt = gdlg::repack(&original, &noisy).expect("repack");
    assert_eq!(rebuilt, original);
}

#[test]
fn codec_roundtrips_shift_jis_text() {
    for text in ["Hello", "こんにちは", "館内アナウンス", ""] {
        let encoded = codec::encode(text);
        assert_eq!(
            *encoded.last().expect("terminator"),
            0x8D,
            "masked terminator byte"
        );
        let decoded = codec::decode(&encoded[..encoded.len() - 1]);
        assert_eq!(decoded, text);
    }
}

#[test]
fn empty_string_encodes_to_terminator_only() {
    assert_eq!(codec::encode(""), [0x8D]);
}

#[test]
fn pointer_array_padding_is_smallest_sufficient_multiple() {
    for (len, align, expected) in [
        (0usize, 0x10usize, 0usize),
        (4, 0x10, 0x10),
        (0x10, 0x10, 0x10),
        (0x11, 0x10, 0x20),
        (4, 0x20, 0x20),
        (0x20, 0x20, 0x20),
        (0x24, 0x20, 0x40),
    ] {
        assert_eq!(align_up(len, align), expected, "align_up({len:#x}, {align:#x})");
    }
}

#[test]
fn open_matches_in_memory_parse() {
    let fixture = one_page_fixture();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("sample.gdlg");
    fs::write(&path, &fixture).expect("write fixture");

    let from_disk = GdlgDocument::open(&path).expect("open");
    let from_memory = GdlgDocument::parse(&fixture).expect("parse");
    assert_eq!(from_disk.pool.len(), from_memory.pool.len());
    assert_eq!(
        from_disk.to_markup().expect("markup"),
        from_memory.to_markup().expect("markup")
    );
}
