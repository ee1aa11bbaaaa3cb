//! Height annotation: the input table with a `Height` column added.

use hashbrown::HashMap;

use crate::height::{height_of, propagate, HeightConfig};
use crate::ingest::{fields, normalize, normalize_record};
use crate::model::CellId;
use crate::table::Table;

/// Return `table` with each row's computed height in a `Height` column.
///
/// Row order is preserved. An existing `Height` column is overwritten in
/// place; otherwise the column is appended. Rows the normalizer skipped get
/// an empty height.
///
/// A cell written on several rows is resolved by its last row, which alone
/// feeds its children. Each earlier row is still annotated with the height
/// of its own fields over the settled parents.
pub fn annotate_heights(table: &Table, config: &HeightConfig) -> Table {
    let normalized = normalize(&table.records);
    let heights = propagate(&normalized.facts, config);

    let mut last_row: HashMap<CellId, usize> = HashMap::new();
    for (row_no, cell) in normalized.row_cells.iter().enumerate() {
        if let Some(cell) = cell {
            last_row.insert(*cell, row_no);
        }
    }

    let mut header = table.header.clone();
    if !header.iter().any(|h| h == fields::HEIGHT) {
        header.push(fields::HEIGHT.to_string());
    }

    let records = table
        .records
        .iter()
        .zip(&normalized.row_cells)
        .enumerate()
        .map(|(row_no, (record, cell))| {
            let height = match cell {
                Some(c) if last_row.get(c) == Some(&row_no) => heights.get(c).copied(),
                Some(_) => normalize_record(record).map(|f| height_of(&f, &heights, config)),
                None => None,
            };
            let mut record = record.clone();
            record.insert(
                fields::HEIGHT.to_string(),
                height.map(|h| h.to_string()).unwrap_or_default(),
            );
            record
        })
        .collect();

    Table { header, records }
}
