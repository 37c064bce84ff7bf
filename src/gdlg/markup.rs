//! Marked-up text serialization and parsing
//!
//! The editable form is a flat UTF-8 file using block markers:
//!
//! ```text
//! #PAGE=<n>
//! #TITLE=<text>
//! #TITLE_INDEX=<n>
//!
//! /*INDEX=<n>
//! <one line of dialogue per line>
//! */
//!
//! #END
//! ```
//!
//! Parsing is marker-driven line scanning, not positional: junk lines
//! between markers are skipped, and a missing expected marker is a fatal
//! [`GdlgError::MalformedMarkup`] carrying the line number.

use log::{debug, info};

use super::error::{GdlgError, Result};
use super::models::GdlgDocument;

/// One page block parsed from marked-up text.
#[derive(Debug, Clone)]
pub struct PageMarkup {
    /// Line number of the `#PAGE=` marker, for error reporting.
    pub line: usize,
    pub page_index: usize,
    pub title: String,
    /// The title's text-pool index in the *original* file, as printed by the
    /// serializer. Used to locate the hidden "NON" entry during re-encode.
    pub title_index: u32,
    pub tables: Vec<TableMarkup>,
}

/// One line-table block parsed from marked-up text.
#[derive(Debug, Clone)]
pub struct TableMarkup {
    /// Line number of the `/*INDEX=` marker, for error reporting.
    pub line: usize,
    pub table_index: usize,
    pub lines: Vec<String>,
}

/// Render a decoded document as marked-up text.
pub fn serialize(doc: &GdlgDocument) -> Result<String> {
    info!("Serializing {} pages to marked-up text", doc.pages.len());

    let mut out = String::new();
    for (i, page) in doc.pages.iter().enumerate() {
        out.push_str(&format!("#PAGE={}\n", i));
        out.push_str(&format!("#TITLE={}\n", doc.pool.get(page.title_index)?.text));
        out.push_str(&format!("#TITLE_INDEX={}\n\n", page.title_index));
        for (x, table) in page.tables.iter().enumerate() {
            out.push_str(&format!("/*INDEX={}\n", x));
            for line in &table.lines {
                out.push_str(&doc.pool.get(line.text_index)?.text);
                out.push('\n');
            }
            out.push_str("*/\n\n");
        }
        out.push_str("#END\n\n");
    }
    Ok(out)
}

/// Parse marked-up text back into page blocks.
///
/// Dialogue lines inside a table block are taken verbatim (blank lines
/// included); titles are trimmed, matching the serializer's `#TITLE=` form.
pub fn parse(text: &str) -> Result<Vec<PageMarkup>> {
    let last_line = text.lines().count();
    let mut pages = Vec::new();
    // 1-based line numbers for error reporting
    let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l));

    loop {
        // Scan for the next page block; plain end-of-input here is success.
        let (page_no, page_line) = match lines.find(|(_, l)| l.starts_with("#PAGE=")) {
            Some(found) => found,
            None => break,
        };
        let page_index = parse_number(page_line, page_no, "numeric value after #PAGE=")?;

        let (_, title_line) = lines
            .find(|(_, l)| l.starts_with("#TITLE="))
            .ok_or(GdlgError::MalformedMarkup {
                line: last_line,
                expected: "#TITLE=",
            })?;
        let title = marker_value(title_line).trim().to_string();

        let (index_no, index_line) = lines
            .find(|(_, l)| l.starts_with("#TITLE_INDEX="))
            .ok_or(GdlgError::MalformedMarkup {
                line: last_line,
                expected: "#TITLE_INDEX=",
            })?;
        let title_index =
            parse_number(index_line, index_no, "numeric value after #TITLE_INDEX=")? as u32;

        let mut tables = Vec::new();
        loop {
            // The next marker is either a table block or the end of the page.
            let (line_no, marker) = lines
                .find(|(_, l)| l.starts_with("/*INDEX=") || l.starts_with("#END"))
                .ok_or(GdlgError::MalformedMarkup {
                    line: last_line,
                    expected: "#END",
                })?;
            if marker.starts_with("#END") {
                break;
            }

            let table_index = parse_number(marker, line_no, "numeric value after /*INDEX=")?;
            let mut table_lines = Vec::new();
            let mut closed = false;
            for (_, l) in lines.by_ref() {
                if l.starts_with("*/") {
                    closed = true;
                    break;
                }
                table_lines.push(l.to_string());
            }
            if !closed {
                return Err(GdlgError::MalformedMarkup {
                    line: last_line,
                    expected: "*/",
                });
            }
            tables.push(TableMarkup {
                line: line_no,
                table_index,
                lines: table_lines,
            });
        }

        debug!(
            "Parsed page block {}: {} tables, title {:?}",
            page_index,
            tables.len(),
            title
        );
        pages.push(PageMarkup {
            line: page_no,
            page_index,
            title,
            title_index,
            tables,
        });
    }

    Ok(pages)
}

/// Everything after the first `=` on a marker line.
fn marker_value(line: &str) -> &str {
    line.splitn(2, '=').nth(1).unwrap_or("")
}

fn parse_number(line: &str, line_no: usize, expected: &'static str) -> Result<usize> {
    marker_value(line)
        .trim()
        .parse()
        .map_err(|_| GdlgError::MalformedMarkup {
            line: line_no,
            expected,
        })
}
