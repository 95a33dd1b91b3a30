//! Spreadsheet extraction.
//!
//! The pieces, leaves first: [`column::resolve`] turns a letter or numeric
//! column reference into a 1-based index, [`ColumnMapping`] resolves a whole
//! configured column set up front, and [`extract`] turns raw string rows
//! into field-keyed records while dropping null rows. [`SheetsOperator`]
//! packages those into an extract-load operator that workflow factories can
//! drive.

pub mod column;
pub mod error;
pub mod extract;
pub mod mapping;
pub mod operator;
pub mod source;

pub use column::ColumnRef;
pub use error::SheetsError;
pub use extract::{Record, extract};
pub use mapping::{ColumnDef, ColumnMapping, ColumnsSpec};
pub use operator::{SheetTableSpec, SheetsOperator};
pub use source::{FixedRangeSource, RangeSource};
