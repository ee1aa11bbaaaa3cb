//! Record normalizer: raw trace rows → typed `DeductionFact`s.
//!
//! Every defect here is recovered locally. A row without a usable cell index
//! is skipped, an unparseable number takes its default, and a non-numeric
//! token in a parent list is dropped.

use std::collections::BTreeSet;

use hashbrown::HashMap;

use crate::model::{CellId, DeductionFact, ResultKind};
use crate::table::RawRecord;

/// Column names written by the solver.
pub mod fields {
    pub const CELL_INDEX: &str = "CellIndex";
    pub const RESULT: &str = "Result";
    pub const GENERATION_DEPTH: &str = "GenerationDepth";
    pub const DIFFICULTY_LEVEL: &str = "DifficultyLevel";
    pub const SOURCE_HINTS: &str = "SourceHints";
    pub const TRIGGER_CELLS: &str = "TriggerCells";
    pub const HEIGHT: &str = "Height";
}

/// Output of [`normalize`].
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    /// One fact per distinct cell, in first-seen order.
    pub facts: Vec<DeductionFact>,
    /// Cell produced by each input row; `None` for skipped rows.
    pub row_cells: Vec<Option<CellId>>,
    pub skipped: usize,
    /// Rows whose cell had already been seen. The later row wins.
    pub duplicates: usize,
}

/// Normalize every row. Never fails.
pub fn normalize(rows: &[RawRecord]) -> Normalized {
    let mut out = Normalized {
        facts: Vec::with_capacity(rows.len()),
        row_cells: Vec::with_capacity(rows.len()),
        ..Default::default()
    };
    let mut index: HashMap<CellId, usize> = HashMap::with_capacity(rows.len());

    for (row_no, row) in rows.iter().enumerate() {
        let Some(fact) = normalize_record(row) else {
            tracing::debug!(row = row_no, "skipping row without a usable cell index");
            out.skipped += 1;
            out.row_cells.push(None);
            continue;
        };

        out.row_cells.push(Some(fact.cell));
        match index.get(&fact.cell).copied() {
            Some(pos) => {
                tracing::warn!(cell = %fact.cell, row = row_no, "duplicate cell index, later row wins");
                out.duplicates += 1;
                out.facts[pos] = fact;
            }
            None => {
                index.insert(fact.cell, out.facts.len());
                out.facts.push(fact);
            }
        }
    }

    out
}

/// Type a single row, or `None` when the cell index is absent, blank, a
/// repeated header, or not a non-negative integer.
pub fn normalize_record(row: &RawRecord) -> Option<DeductionFact> {
    let raw_cell = field(row, fields::CELL_INDEX)?;
    let raw_cell = raw_cell.trim();
    if raw_cell.is_empty() || raw_cell == fields::CELL_INDEX {
        return None;
    }
    let cell = u32::try_from(parse_int(Some(raw_cell), -1)).ok()?;

    let result = ResultKind::parse(field(row, fields::RESULT).unwrap_or(""));
    let generation_depth = u32::try_from(parse_int(field(row, fields::GENERATION_DEPTH), 0)).unwrap_or(0);
    let rule_level = u8::try_from(parse_int(field(row, fields::DIFFICULTY_LEVEL), 0)).unwrap_or(0);

    let source_hints = parse_cell_list(field(row, fields::SOURCE_HINTS));
    let trigger_cells = parse_cell_list(field(row, fields::TRIGGER_CELLS));

    Some(DeductionFact::new(
        CellId(cell),
        result,
        generation_depth,
        rule_level,
        source_hints,
        trigger_cells,
    ))
}

fn field<'a>(row: &'a RawRecord, name: &str) -> Option<&'a str> {
    row.get(name).map(String::as_str)
}

/// Lenient integer parse: absent, blank or malformed → `default`.
pub fn parse_int(value: Option<&str>, default: i64) -> i64 {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.parse().unwrap_or(default),
        _ => default,
    }
}

/// Parse a comma-separated cell list. Tokens that are not non-negative
/// integers are dropped; order and repeats do not matter.
pub fn parse_cell_list(value: Option<&str>) -> BTreeSet<CellId> {
    value
        .unwrap_or("")
        .split(',')
        .filter_map(|token| token.trim().parse::<u32>().ok())
        .map(CellId)
        .collect()
}
