use thiserror::Error;

use gantry_model::ModelError;

/// Errors raised while configuring a spreadsheet extraction.
///
/// All of these surface at configuration time. Once a column mapping has
/// been validated, per-row processing cannot fail: defective rows are
/// dropped by the null-row rule instead of raising.
#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("invalid column reference {reference:?}: {detail}")]
    InvalidColumnReference { reference: String, detail: String },

    #[error("column {field:?} is missing its position in the sheet")]
    MissingColumnPosition { field: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}
