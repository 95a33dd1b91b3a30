//! The drop-and-replace workflow factory.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use gantry_model::{
    ConnId, DwhEngine, ExtractOperator, RefreshStrategy, Schedule, TableTarget, TaskId, TaskNode,
    Workflow, resolve_layers,
};

use crate::chain::fan_out;
use crate::error::FlowError;
use crate::schema::schema_swap_tasks;

fn default_schema_suffix() -> String {
    "_next".to_string()
}

/// Declarative input of [`full_refresh_workflow`].
///
/// `defaults` and `general_config` are free-form layers merged under each
/// table's own block; see [`gantry_model::resolve_layers`] for precedence.
#[derive(Debug, Clone, Deserialize)]
pub struct FullRefreshSpec {
    pub name: String,
    pub schedule: Schedule,
    pub engine: DwhEngine,
    pub warehouse_conn: ConnId,
    pub target_schema: String,
    #[serde(default = "default_schema_suffix")]
    pub schema_suffix: String,
    #[serde(default)]
    pub target_database: Option<String>,
    #[serde(default)]
    pub read_right_users: Vec<String>,
    #[serde(default)]
    pub defaults: Value,
    #[serde(default)]
    pub general_config: Value,
    pub tables: BTreeMap<String, Value>,
}

impl FullRefreshSpec {
    /// Name of the staging schema the workers load into.
    pub fn staging_schema(&self) -> String {
        format!("{}{}", self.target_schema, self.schema_suffix)
    }
}

/// Assembles a drop-and-replace workflow.
///
/// The kickoff task rotates a fresh staging schema in, one worker per
/// configured table loads into it in parallel, and the final task swaps
/// staging live. Worker ids follow `extract_load_<table>`.
///
/// The operator must advertise [`RefreshStrategy::FullRefresh`]; an
/// incremental operator cannot serve a workflow that drops its target
/// schema every run.
pub fn full_refresh_workflow(
    spec: &FullRefreshSpec,
    operator: &dyn ExtractOperator,
) -> Result<Workflow, FlowError> {
    if operator.refresh_strategy() != RefreshStrategy::FullRefresh {
        return Err(FlowError::FullRefreshUnsupported {
            operator: operator.source_kind().to_string(),
        });
    }
    if spec.tables.is_empty() {
        return Err(FlowError::EmptyPipeline {
            detail: format!("workflow {:?} configures no tables", spec.name),
        });
    }

    let (kickoff, final_node) = schema_swap_tasks(
        spec.engine,
        &spec.warehouse_conn,
        &spec.target_schema,
        &spec.schema_suffix,
        spec.target_database.as_deref(),
        &spec.read_right_users,
    )?;

    let staging = spec.staging_schema();
    let mut workers = Vec::with_capacity(spec.tables.len());
    for (table, overrides) in &spec.tables {
        let config = resolve_layers(&[&spec.defaults, &spec.general_config, overrides]);
        let target = TableTarget {
            table: table.clone(),
            schema: staging.clone(),
            conn: spec.warehouse_conn.clone(),
        };
        let unit = operator
            .extract_unit(&target, &config)
            .map_err(|source| FlowError::TableConfig {
                table: table.clone(),
                source,
            })?;
        workers.push(TaskNode::new(TaskId::new(format!("extract_load_{table}"))?, unit));
    }

    let nodes = fan_out(kickoff, workers, final_node)?;
    let workflow = Workflow::builder(spec.name.clone(), spec.schedule.clone())
        .extend(nodes)
        .build()?;
    info!(
        workflow = %workflow.name(),
        source = operator.source_kind(),
        tables = spec.tables.len(),
        "full-refresh workflow assembled"
    );
    Ok(workflow)
}
