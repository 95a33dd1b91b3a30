//! Where raw sheet rows come from.

use std::collections::BTreeMap;

use anyhow::anyhow;

/// Supplies the raw cell grid of one worksheet.
///
/// The production implementation wraps the remote spreadsheet API; tests
/// and dry runs use [`FixedRangeSource`].
pub trait RangeSource {
    fn fetch(&self, workbook_key: &str, sheet_key: &str) -> anyhow::Result<Vec<Vec<String>>>;
}

/// In-memory range source keyed by workbook and sheet.
#[derive(Debug, Clone, Default)]
pub struct FixedRangeSource {
    sheets: BTreeMap<(String, String), Vec<Vec<String>>>,
}

impl FixedRangeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(
        mut self,
        workbook_key: impl Into<String>,
        sheet_key: impl Into<String>,
        rows: Vec<Vec<String>>,
    ) -> Self {
        self.sheets.insert((workbook_key.into(), sheet_key.into()), rows);
        self
    }
}

impl RangeSource for FixedRangeSource {
    fn fetch(&self, workbook_key: &str, sheet_key: &str) -> anyhow::Result<Vec<Vec<String>>> {
        self.sheets
            .get(&(workbook_key.to_string(), sheet_key.to_string()))
            .cloned()
            .ok_or_else(|| anyhow!("no sheet {sheet_key:?} in workbook {workbook_key:?}"))
    }
}
