//! dbt workflow factories.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::info;

use gantry_flow::{FlowError, chain, read_grant_sql, validate_read_right_users};
use gantry_model::{
    ConnId, ConnectionStore, DwhEngine, Schedule, TaskId, TaskNode, WorkUnit, Workflow,
};

use crate::command::{DbtPhase, DbtProject};
use crate::env::dbt_env;
use crate::error::DbtError;

fn default_true() -> bool {
    true
}

/// Which dbt phases a pipeline runs. Everything is on by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DbtPhases {
    #[serde(default = "default_true")]
    pub seed: bool,
    #[serde(default = "default_true")]
    pub run: bool,
    #[serde(default = "default_true")]
    pub test: bool,
    #[serde(default = "default_true")]
    pub docs: bool,
}

impl Default for DbtPhases {
    fn default() -> Self {
        Self {
            seed: true,
            run: true,
            test: true,
            docs: true,
        }
    }
}

impl DbtPhases {
    pub fn enabled(self, phase: DbtPhase) -> bool {
        match phase {
            DbtPhase::Seed => self.seed,
            DbtPhase::Run => self.run,
            DbtPhase::Test => self.test,
            DbtPhase::Docs => self.docs,
        }
    }

    fn any(self) -> bool {
        DbtPhase::ORDER.into_iter().any(|phase| self.enabled(phase))
    }
}

/// Declarative input of the dbt factories.
#[derive(Debug, Clone, Deserialize)]
pub struct DbtPipelineSpec {
    pub name: String,
    pub schedule: Schedule,
    pub engine: DwhEngine,
    pub warehouse_conn: ConnId,
    /// Schema the dbt models build into.
    pub target_schema: String,
    pub project_folder: String,
    pub venv_folder: String,
    /// Defaults to the project folder, where profiles.yml usually lives.
    #[serde(default)]
    pub profiles_dir: Option<String>,
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub phases: DbtPhases,
    #[serde(default)]
    pub read_right_users: Vec<String>,
    /// Connection to the orchestrator's own database; required by
    /// [`dbt_workflow_pair`] for the conflict sensor.
    #[serde(default)]
    pub orchestrator_conn: Option<ConnId>,
}

impl DbtPipelineSpec {
    fn profiles_dir(&self) -> &str {
        self.profiles_dir.as_deref().unwrap_or(&self.project_folder)
    }
}

struct DbtAssembly {
    env: BTreeMap<String, String>,
    project: DbtProject,
}

impl DbtAssembly {
    fn new(
        spec: &DbtPipelineSpec,
        store: &dyn ConnectionStore,
        full_refresh: bool,
    ) -> Result<Self, DbtError> {
        let conn = store.get(&spec.warehouse_conn)?;
        let env = dbt_env(
            spec.engine,
            &spec.warehouse_conn,
            conn,
            &spec.target_schema,
            spec.profiles_dir(),
        )?;
        let project = DbtProject {
            project_folder: spec.project_folder.clone(),
            venv_folder: spec.venv_folder.clone(),
            models: spec.models.clone(),
            exclude: spec.exclude.clone(),
            full_refresh,
        };
        Ok(Self { env, project })
    }

    fn node(&self, phase: DbtPhase) -> Result<TaskNode, DbtError> {
        Ok(TaskNode::new(
            TaskId::new(phase.task_id())?,
            WorkUnit::Shell {
                command: self.project.render(phase)?,
                env: self.env.clone(),
            },
        ))
    }
}

fn ensure_some_phase(phases: DbtPhases) -> Result<(), DbtError> {
    if phases.any() {
        Ok(())
    } else {
        Err(DbtError::Flow(FlowError::EmptyPipeline {
            detail: "no dbt phase enabled: need at least one of seed, run, test, docs".to_string(),
        }))
    }
}

/// Assembles the linear dbt workflow: seed -> run -> test -> docs.
///
/// Disabled phases are skipped and the dependency edges bridge over them.
pub fn dbt_workflow(
    spec: &DbtPipelineSpec,
    store: &dyn ConnectionStore,
) -> Result<Workflow, DbtError> {
    ensure_some_phase(spec.phases)?;
    let assembly = DbtAssembly::new(spec, store, false)?;

    let mut steps = Vec::new();
    for phase in DbtPhase::ORDER {
        if spec.phases.enabled(phase) {
            steps.push(assembly.node(phase)?);
        }
    }
    let steps = chain(steps)?;
    let workflow = Workflow::builder(spec.name.clone(), spec.schedule.clone())
        .extend(steps)
        .build()?;
    info!(
        workflow = %workflow.name(),
        phases = workflow.nodes().len(),
        "dbt workflow assembled"
    );
    Ok(workflow)
}

/// Assembles the scheduled dbt workflow plus a manually triggered
/// full-refresh twin.
///
/// Both open with a sensor on the orchestrator's run ledger so the two
/// never run concurrently with each other, and both re-grant read access
/// between the test and docs phases when readers are configured. The twin
/// runs with dbt's `--full-refresh` flag and no schedule of its own.
pub fn dbt_workflow_pair(
    spec: &DbtPipelineSpec,
    store: &dyn ConnectionStore,
) -> Result<(Workflow, Workflow), DbtError> {
    let orchestrator = spec
        .orchestrator_conn
        .clone()
        .ok_or(DbtError::MissingOrchestratorConn)?;
    ensure_some_phase(spec.phases)?;
    validate_read_right_users(&spec.read_right_users)?;

    let scheduled_name = spec.name.clone();
    let refresh_name = format!("{}_full_refresh", spec.name);
    let sensor_sql = conflict_sensor_sql(&scheduled_name, &refresh_name);

    let scheduled = guarded_workflow(
        spec,
        store,
        &orchestrator,
        &sensor_sql,
        scheduled_name,
        spec.schedule.clone(),
        false,
    )?;
    let full_refresh = guarded_workflow(
        spec,
        store,
        &orchestrator,
        &sensor_sql,
        refresh_name,
        spec.schedule.as_manual(),
        true,
    )?;
    info!(
        scheduled = %scheduled.name(),
        full_refresh = %full_refresh.name(),
        "paired dbt workflows assembled"
    );
    Ok((scheduled, full_refresh))
}

fn guarded_workflow(
    spec: &DbtPipelineSpec,
    store: &dyn ConnectionStore,
    orchestrator: &ConnId,
    sensor_sql: &str,
    name: String,
    schedule: Schedule,
    full_refresh: bool,
) -> Result<Workflow, DbtError> {
    let assembly = DbtAssembly::new(spec, store, full_refresh)?;

    let mut steps = vec![TaskNode::new(
        TaskId::new("sense_dbt_conflict_avoided")?,
        WorkUnit::SqlSensor {
            conn: orchestrator.clone(),
            sql: sensor_sql.to_string(),
        },
    )];
    for phase in [DbtPhase::Seed, DbtPhase::Run, DbtPhase::Test] {
        if spec.phases.enabled(phase) {
            steps.push(assembly.node(phase)?);
        }
    }
    if !spec.read_right_users.is_empty() {
        steps.push(TaskNode::new(
            TaskId::new("grant_access_to_read_users")?,
            WorkUnit::Sql {
                conn: spec.warehouse_conn.clone(),
                sql: read_grant_sql(spec.engine, &spec.target_schema, None, &spec.read_right_users),
            },
        ));
    }
    if spec.phases.enabled(DbtPhase::Docs) {
        steps.push(assembly.node(DbtPhase::Docs)?);
    }

    let steps = chain(steps)?;
    let workflow = Workflow::builder(name, schedule).extend(steps).build()?;
    Ok(workflow)
}

/// Passes only while no run of either workflow is active, excluding the
/// run evaluating the sensor. The run id placeholder is filled in by the
/// engine's template pass.
fn conflict_sensor_sql(scheduled: &str, full_refresh: &str) -> String {
    format!(
        "SELECT CASE WHEN COUNT(*) = 0 THEN 1 ELSE 0 END\n\
         FROM public.dag_run\n\
         WHERE dag_id IN ('{scheduled}', '{full_refresh}')\n\
         AND state = 'running'\n\
         AND NOT (run_id = '{{{{ run_id }}}}')"
    )
}
