//! Contract between extract-load operators and workflow factories.

use serde::{Deserialize, Serialize};

use crate::ids::ConnId;
use crate::task::WorkUnit;

/// How an operator loads data into its target table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshStrategy {
    /// Every run replaces the target table wholesale.
    FullRefresh,
    /// Runs append or merge new data into the target table.
    Incremental,
}

/// Destination of one extract-load task.
#[derive(Debug, Clone, PartialEq)]
pub struct TableTarget {
    pub table: String,
    /// Schema the task writes into. Under schema rotation this is the
    /// staging schema, not the published one.
    pub schema: String,
    pub conn: ConnId,
}

/// An extract-load operator that workflow factories can drive.
///
/// Factories stay generic over the source system: they hand the operator a
/// resolved per-table configuration and a [`TableTarget`], and get back the
/// work unit that extracts and loads that table.
pub trait ExtractOperator {
    /// Short tag for log events and error context, e.g. `"google_sheets"`.
    fn source_kind(&self) -> &'static str;

    fn refresh_strategy(&self) -> RefreshStrategy;

    /// Builds the work unit for one table from its resolved configuration.
    ///
    /// Called at assembly time; any configuration defect must surface here,
    /// not when the engine eventually runs the unit.
    fn extract_unit(
        &self,
        target: &TableTarget,
        config: &serde_json::Value,
    ) -> anyhow::Result<WorkUnit>;
}
