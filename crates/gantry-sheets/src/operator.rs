//! The spreadsheet extract-load operator.

use anyhow::Context as _;
use serde::Deserialize;
use tracing::{debug, info};

use gantry_model::{
    ConnId, ConnectionStore, ExtractOperator, RefreshStrategy, ServiceAccountKey, TableTarget,
    WorkUnit,
};

use crate::error::SheetsError;
use crate::extract::{Record, extract};
use crate::mapping::{ColumnMapping, ColumnsSpec};
use crate::source::RangeSource;

/// Data rows usually start below a header line.
const DEFAULT_START_ROW: usize = 2;

fn default_start_row() -> usize {
    DEFAULT_START_ROW
}

/// Resolved per-table configuration for one sheet extraction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SheetTableSpec {
    pub workbook_key: String,
    pub sheet_key: String,
    #[serde(default = "default_start_row")]
    pub start_row: usize,
    #[serde(default)]
    pub end_row: Option<usize>,
    pub columns: ColumnsSpec,
}

/// Extract-load operator for spreadsheet-backed tables.
///
/// Construction validates the service-account credentials on the source
/// connection, so a missing or malformed key blob fails before any workflow
/// is assembled and long before a network call.
#[derive(Debug, Clone)]
pub struct SheetsOperator {
    conn: ConnId,
    key: ServiceAccountKey,
}

impl SheetsOperator {
    pub fn new(conn: ConnId, store: &dyn ConnectionStore) -> Result<Self, SheetsError> {
        let record = store.get(&conn)?;
        let key = record.client_secrets(&conn)?;
        debug!(
            conn = %conn,
            client_email = key.client_email.as_deref().unwrap_or("<unset>"),
            "sheets credentials loaded"
        );
        Ok(Self { conn, key })
    }

    pub fn conn(&self) -> &ConnId {
        &self.conn
    }

    pub fn service_account(&self) -> &ServiceAccountKey {
        &self.key
    }

    /// Fetches one sheet and extracts its records in a single pass.
    pub fn pull(
        &self,
        source: &dyn RangeSource,
        spec: &SheetTableSpec,
    ) -> anyhow::Result<Vec<Record>> {
        let mapping = ColumnMapping::from_columns(&spec.columns)?;
        info!(
            workbook = %spec.workbook_key,
            sheet = %spec.sheet_key,
            "retrieving sheet data"
        );
        let rows = source.fetch(&spec.workbook_key, &spec.sheet_key)?;
        let records = extract(&rows, &mapping, spec.start_row, spec.end_row);
        info!(rows = rows.len(), records = records.len(), "sheet data extracted");
        Ok(records)
    }
}

impl ExtractOperator for SheetsOperator {
    fn source_kind(&self) -> &'static str {
        "google_sheets"
    }

    fn refresh_strategy(&self) -> RefreshStrategy {
        RefreshStrategy::FullRefresh
    }

    fn extract_unit(
        &self,
        target: &TableTarget,
        config: &serde_json::Value,
    ) -> anyhow::Result<WorkUnit> {
        let spec: SheetTableSpec = serde_json::from_value(config.clone())
            .with_context(|| format!("sheet configuration for table {:?}", target.table))?;
        let mapping = ColumnMapping::from_columns(&spec.columns)?;
        Ok(WorkUnit::SheetExtract {
            source_conn: self.conn.clone(),
            workbook_key: spec.workbook_key,
            sheet_key: spec.sheet_key,
            start_row: spec.start_row,
            end_row: spec.end_row,
            columns: mapping.to_manifest(),
            target_conn: target.conn.clone(),
            target_schema: target.schema.clone(),
            target_table: target.table.clone(),
        })
    }
}
