//! Column mappings: configured field definitions resolved to sheet indices.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::column::{self, ColumnRef};
use crate::error::SheetsError;

/// Per-field column definition as written in operator configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    #[serde(default)]
    pub position: Option<ColumnRef>,
}

/// Field definitions keyed by output field name. A field mapped to nothing
/// (`note:` with no body in YAML) deserializes to `None` and is rejected
/// during resolution.
pub type ColumnsSpec = BTreeMap<String, Option<ColumnDef>>;

/// Validated mapping from 1-based sheet index to output field name.
///
/// Built once at configuration time and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    by_index: BTreeMap<usize, String>,
}

impl ColumnMapping {
    /// Resolves every configured column up front.
    ///
    /// Fails when a field has no position or its reference does not resolve.
    /// Two fields may point at the same sheet index; the field iterated last
    /// keeps the slot and the overwrite is logged.
    pub fn from_columns(columns: &ColumnsSpec) -> Result<Self, SheetsError> {
        let mut by_index = BTreeMap::new();
        for (field, def) in columns {
            let position = def
                .as_ref()
                .and_then(|def| def.position.as_ref())
                .ok_or_else(|| SheetsError::MissingColumnPosition {
                    field: field.clone(),
                })?;
            let index = column::resolve(position)?;
            if let Some(previous) = by_index.insert(index, field.clone()) {
                debug!(index, dropped = %previous, kept = %field, "column index mapped twice");
            }
        }
        Ok(Self { by_index })
    }

    /// Rehydrates a mapping that was previously serialized into a work unit.
    pub fn from_manifest(columns: BTreeMap<usize, String>) -> Self {
        Self { by_index: columns }
    }

    /// Index-to-field pairs for embedding in a work unit.
    pub fn to_manifest(&self) -> BTreeMap<usize, String> {
        self.by_index.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.by_index
            .iter()
            .map(|(index, field)| (*index, field.as_str()))
    }

    pub fn field_at(&self, index: usize) -> Option<&str> {
        self.by_index.get(&index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }
}
