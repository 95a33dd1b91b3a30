//! Task nodes, the unit-of-work descriptors handed to the orchestration
//! engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::{ConnId, TaskId};

/// Executable payload of a task node.
///
/// The variant set is closed: the orchestration engine this model targets
/// knows how to run exactly these unit kinds, and every unit serializes into
/// an explicitly tagged object so a manifest can be replayed without guessing
/// at field meanings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkUnit {
    /// Run a SQL script against a warehouse connection.
    Sql { conn: ConnId, sql: String },
    /// Poll a SQL expression until its first column comes back truthy.
    SqlSensor { conn: ConnId, sql: String },
    /// Run a shell command with an explicit environment.
    Shell {
        command: String,
        #[serde(default)]
        env: BTreeMap<String, String>,
    },
    /// Pull a spreadsheet range and load the extracted records into a
    /// warehouse table.
    SheetExtract {
        source_conn: ConnId,
        workbook_key: String,
        sheet_key: String,
        start_row: usize,
        #[serde(default)]
        end_row: Option<usize>,
        /// Resolved column mapping: 1-based sheet position to field name.
        columns: BTreeMap<usize, String>,
        target_conn: ConnId,
        target_schema: String,
        target_table: String,
    },
}

impl WorkUnit {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Sql { .. } => "sql",
            Self::SqlSensor { .. } => "sql_sensor",
            Self::Shell { .. } => "shell",
            Self::SheetExtract { .. } => "sheet_extract",
        }
    }

    /// One-line description used by plan listings and log events.
    pub fn summary(&self) -> String {
        match self {
            Self::Sql { conn, sql } | Self::SqlSensor { conn, sql } => {
                let first = sql.lines().find(|line| !line.trim().is_empty());
                format!("{} ({conn})", first.unwrap_or("").trim())
            }
            Self::Shell { command, .. } => {
                let last = command.lines().rev().find(|line| !line.trim().is_empty());
                last.unwrap_or("").trim().to_string()
            }
            Self::SheetExtract {
                sheet_key,
                target_schema,
                target_table,
                ..
            } => format!("{sheet_key} -> {target_schema}.{target_table}"),
        }
    }
}

/// One node of a workflow graph: an id, a work unit and the ids of the nodes
/// that must complete first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskNode {
    id: TaskId,
    unit: WorkUnit,
    #[serde(default)]
    upstream: Vec<TaskId>,
}

impl TaskNode {
    pub fn new(id: TaskId, unit: WorkUnit) -> Self {
        Self {
            id,
            unit,
            upstream: Vec::new(),
        }
    }

    /// Declares `upstream` as a predecessor, builder-style.
    pub fn after(mut self, upstream: TaskId) -> Self {
        self.upstream.push(upstream);
        self
    }

    /// Declares a predecessor on an already-placed node.
    pub fn push_upstream(&mut self, upstream: TaskId) {
        self.upstream.push(upstream);
    }

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    pub fn unit(&self) -> &WorkUnit {
        &self.unit
    }

    pub fn upstream(&self) -> &[TaskId] {
        &self.upstream
    }
}
