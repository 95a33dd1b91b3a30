//! The pipeline manifest: one YAML file declaring connections and pipelines.
//!
//! The manifest is the single configuration source. Every connection a
//! pipeline refers to must be declared in its `connections` section; nothing
//! is read from the process environment.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::{debug, info};

use gantry_dbt::{DbtPipelineSpec, dbt_workflow, dbt_workflow_pair};
use gantry_flow::{FullRefreshSpec, full_refresh_workflow};
use gantry_model::{ConnId, ConnectionRecord, InMemoryConnectionStore, Workflow};
use gantry_sheets::SheetsOperator;

/// Root of the manifest file.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineManifest {
    /// Connection records keyed by the ids the pipeline specs refer to.
    #[serde(default)]
    pub connections: BTreeMap<ConnId, ConnectionRecord>,
    #[serde(default)]
    pub pipelines: Vec<PipelineSpec>,
}

/// One pipeline declaration, tagged by `kind`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineSpec {
    /// Spreadsheet drop-and-replace pipeline.
    SheetFullRefresh {
        /// Connection holding the spreadsheet service-account key.
        sheets_conn: ConnId,
        #[serde(flatten)]
        spec: FullRefreshSpec,
    },
    /// dbt pipeline. `paired` adds the manually triggered full-refresh twin.
    Dbt {
        #[serde(default)]
        paired: bool,
        #[serde(flatten)]
        spec: DbtPipelineSpec,
    },
}

impl PipelineSpec {
    pub fn name(&self) -> &str {
        match self {
            Self::SheetFullRefresh { spec, .. } => &spec.name,
            Self::Dbt { spec, .. } => &spec.name,
        }
    }
}

impl PipelineManifest {
    /// Parses a manifest from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let manifest: Self = serde_yaml::from_str(text).context("parse pipeline manifest")?;
        debug!(
            connections = manifest.connections.len(),
            pipelines = manifest.pipelines.len(),
            "manifest parsed"
        );
        Ok(manifest)
    }

    /// Loads and parses a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read manifest {}", path.display()))?;
        Self::from_yaml(&text)
    }

    /// Connection store backing the declared pipelines.
    pub fn store(&self) -> InMemoryConnectionStore {
        InMemoryConnectionStore::from_records(self.connections.clone())
    }

    /// Builds every declared workflow, in declaration order.
    ///
    /// A paired dbt pipeline contributes two workflows (the scheduled run
    /// and its full-refresh twin). Workflow names must be unique across the
    /// whole manifest; the engine keys runs by name.
    pub fn build_workflows(&self) -> Result<Vec<Workflow>> {
        let store = self.store();
        let mut workflows = Vec::new();
        for pipeline in &self.pipelines {
            let name = pipeline.name();
            match pipeline {
                PipelineSpec::SheetFullRefresh { sheets_conn, spec } => {
                    let operator = SheetsOperator::new(sheets_conn.clone(), &store)
                        .with_context(|| format!("pipeline {name:?}"))?;
                    let workflow = full_refresh_workflow(spec, &operator)
                        .with_context(|| format!("pipeline {name:?}"))?;
                    workflows.push(workflow);
                }
                PipelineSpec::Dbt { paired: true, spec } => {
                    let (scheduled, full_refresh) = dbt_workflow_pair(spec, &store)
                        .with_context(|| format!("pipeline {name:?}"))?;
                    workflows.push(scheduled);
                    workflows.push(full_refresh);
                }
                PipelineSpec::Dbt {
                    paired: false,
                    spec,
                } => {
                    let workflow = dbt_workflow(spec, &store)
                        .with_context(|| format!("pipeline {name:?}"))?;
                    workflows.push(workflow);
                }
            }
        }

        let mut seen = BTreeSet::new();
        for workflow in &workflows {
            if !seen.insert(workflow.name().to_string()) {
                bail!("duplicate workflow name {:?} in manifest", workflow.name());
            }
        }
        info!(count = workflows.len(), "workflows assembled");
        Ok(workflows)
    }
}
