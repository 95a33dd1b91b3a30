//! Row extraction: raw sheet rows to field-keyed records.

use std::collections::BTreeMap;

use tracing::debug;

use crate::mapping::ColumnMapping;

/// One extracted row, keyed by field name.
pub type Record = BTreeMap<String, String>;

/// Extracts records from `rows` through a resolved column mapping.
///
/// `start_row` and `end_row` are 1-based and inclusive. `end_row: None`
/// reads to the end of the sheet, and both bounds clamp to the rows that
/// are actually present. Cells past the end of a short row read as empty.
///
/// A row is null when every mapped cell is empty or the literal `"0"`;
/// null rows are dropped. Textual zero deliberately does not count as
/// present on its own: zero-amount filler rows are common in spreadsheets.
/// A row of only zeros and blanks is therefore dropped even if it carries
/// meaning, which is the documented trade-off of this policy.
///
/// Row order is preserved and an empty result is not an error.
pub fn extract(
    rows: &[Vec<String>],
    mapping: &ColumnMapping,
    start_row: usize,
    end_row: Option<usize>,
) -> Vec<Record> {
    let start = start_row.saturating_sub(1).min(rows.len());
    let end = end_row.unwrap_or(rows.len()).min(rows.len()).max(start);

    let mut records = Vec::new();
    for row in &rows[start..end] {
        let mut record = Record::new();
        let mut row_is_null = true;
        for (index, field) in mapping.iter() {
            let cell = index
                .checked_sub(1)
                .and_then(|at| row.get(at))
                .map_or("", String::as_str);
            if row_is_null && !cell.is_empty() && cell != "0" {
                row_is_null = false;
            }
            record.insert(field.to_string(), cell.to_string());
        }
        if !row_is_null {
            records.push(record);
        }
    }
    debug!(
        scanned = end.saturating_sub(start),
        extracted = records.len(),
        "rows extracted"
    );
    records
}
