//! Trace table reader and writer.
//!
//! The solver writes comma-separated text with a header row. Parent lists are
//! themselves comma-separated, so those cells arrive quoted:
//!
//! ```text
//! CellIndex,Result,GenerationDepth,DifficultyLevel,SourceHints,TriggerCells
//! 10,SAFE,1,1,"1,2",5
//! ```
//!
//! Reading is structural only. Field values stay strings here; typing them is
//! the normalizer's job.

use std::io::{Read, Write};

use hashbrown::HashMap;

use crate::{Error, Result};

/// One data row: header name → cell text. Fields missing from a short row
/// are absent rather than empty.
pub type RawRecord = HashMap<String, String>;

/// A parsed table, rows in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub header: Vec<String>,
    pub records: Vec<RawRecord>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ============================================================================
// Reading
// ============================================================================

/// Read a whole table from `reader`.
///
/// Fails only when there is no header row or a quoted field never closes.
pub fn read_table<R: Read>(mut reader: R) -> Result<Table> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse_table(&text)
}

/// Parse table text already in memory.
pub fn parse_table(text: &str) -> Result<Table> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut rows = split_rows(text)?.into_iter();

    let header: Vec<String> = match rows.next() {
        Some((_, cells)) => cells.into_iter().map(|c| c.trim().to_string()).collect(),
        None => {
            return Err(Error::Table { line: 1, message: "missing header row".into() });
        }
    };

    let records = rows
        .map(|(line, cells)| {
            if cells.len() > header.len() {
                tracing::debug!(line, cells = cells.len(), columns = header.len(), "surplus cells ignored");
            }
            header
                .iter()
                .cloned()
                .zip(cells)
                .collect::<RawRecord>()
        })
        .collect();

    Ok(Table { header, records })
}

/// Split text into rows of cells, tracking the line each row starts on.
/// Blank lines are dropped.
fn split_rows(text: &str) -> Result<Vec<(usize, Vec<String>)>> {
    let mut rows = Vec::new();
    let mut cells: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut row_line = 1;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => cells.push(std::mem::take(&mut field)),
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                cells.push(std::mem::take(&mut field));
                push_row(&mut rows, row_line, std::mem::take(&mut cells));
                line += 1;
                row_line = line;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(Error::Table {
            line: row_line,
            message: "unterminated quoted field".into(),
        });
    }
    if !field.is_empty() || !cells.is_empty() {
        cells.push(field);
        push_row(&mut rows, row_line, cells);
    }

    Ok(rows)
}

fn push_row(rows: &mut Vec<(usize, Vec<String>)>, line: usize, cells: Vec<String>) {
    let blank = cells.len() == 1 && cells[0].trim().is_empty();
    if !blank {
        rows.push((line, cells));
    }
}

// ============================================================================
// Writing
// ============================================================================

/// Write `records` under `header`. Fields a record lacks are written empty.
pub fn write_table<W: Write>(writer: &mut W, header: &[String], records: &[RawRecord]) -> Result<()> {
    let head: Vec<String> = header.iter().map(|h| escape_field(h)).collect();
    writeln!(writer, "{}", head.join(","))?;

    for record in records {
        let cells: Vec<String> = header
            .iter()
            .map(|h| escape_field(record.get(h).map(String::as_str).unwrap_or("")))
            .collect();
        writeln!(writer, "{}", cells.join(","))?;
    }
    Ok(())
}

fn escape_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_lists() {
        let table = parse_table("CellIndex,SourceHints,TriggerCells\n10,\"1, 2\",5\n").unwrap();
        assert_eq!(table.header, vec!["CellIndex", "SourceHints", "TriggerCells"]);
        assert_eq!(table.len(), 1);
        let row = &table.records[0];
        assert_eq!(row["CellIndex"], "10");
        assert_eq!(row["SourceHints"], "1, 2");
        assert_eq!(row["TriggerCells"], "5");
    }

    #[test]
    fn test_crlf_bom_and_blank_lines() {
        let table = parse_table("\u{feff}A,B\r\n1,2\r\n\r\n3,4").unwrap();
        assert_eq!(table.header, vec!["A", "B"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[1]["B"], "4");
    }

    #[test]
    fn test_short_row_leaves_fields_absent() {
        let table = parse_table("A,B,C\n1\n").unwrap();
        let row = &table.records[0];
        assert_eq!(row["A"], "1");
        assert!(!row.contains_key("B"));
        assert!(!row.contains_key("C"));
    }

    #[test]
    fn test_escaped_quote_and_newline_in_field() {
        let table = parse_table("A,B\n\"say \"\"hi\"\"\",\"x\ny\"\n").unwrap();
        assert_eq!(table.records[0]["A"], "say \"hi\"");
        assert_eq!(table.records[0]["B"], "x\ny");
    }

    #[test]
    fn test_missing_header() {
        let err = parse_table("").unwrap_err();
        assert!(matches!(err, Error::Table { line: 1, .. }));
    }

    #[test]
    fn test_unterminated_quote() {
        let err = parse_table("A,B\n1,\"2,3\n").unwrap_err();
        assert!(matches!(err, Error::Table { line: 2, .. }));
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("hello"), "hello");
        assert_eq!(escape_field("1,2"), "\"1,2\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_write_then_read_preserves_lists() {
        let table = parse_table("CellIndex,TriggerCells\n10,\"1,2\"\n11,\n").unwrap();
        let mut buf = Vec::new();
        write_table(&mut buf, &table.header, &table.records).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "CellIndex,TriggerCells\n10,\"1,2\"\n11,\n");
    }
}
