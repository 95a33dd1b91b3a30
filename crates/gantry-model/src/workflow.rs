//! Workflows: named, scheduled, frozen task graphs.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ModelError;
use crate::ids::TaskId;
use crate::task::TaskNode;

/// A recurrence interval in whole days, hours and minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Interval {
    #[serde(default)]
    pub days: u32,
    #[serde(default)]
    pub hours: u32,
    #[serde(default)]
    pub minutes: u32,
}

impl Interval {
    pub fn days(days: u32) -> Self {
        Self {
            days,
            ..Self::default()
        }
    }

    pub fn hours(hours: u32) -> Self {
        Self {
            hours,
            ..Self::default()
        }
    }

    pub fn is_zero(self) -> bool {
        self.days == 0 && self.hours == 0 && self.minutes == 0
    }

    pub fn as_duration(self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.days))
            + chrono::Duration::hours(i64::from(self.hours))
            + chrono::Duration::minutes(i64::from(self.minutes))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0m");
        }
        if self.days > 0 {
            write!(f, "{}d", self.days)?;
        }
        if self.hours > 0 {
            write!(f, "{}h", self.hours)?;
        }
        if self.minutes > 0 {
            write!(f, "{}m", self.minutes)?;
        }
        Ok(())
    }
}

/// When and how often a workflow runs.
///
/// `interval: None` marks a workflow that only runs when triggered by hand.
/// Backfilling past intervals is off and concurrent runs are capped at one
/// unless a manifest says otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub interval: Option<Interval>,
    #[serde(default)]
    pub catchup: bool,
    #[serde(default = "default_max_active_runs")]
    pub max_active_runs: u32,
}

fn default_max_active_runs() -> u32 {
    1
}

impl Schedule {
    /// Daily schedule starting at `start_date`, no catchup, one run at a time.
    pub fn daily_from(start_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date: None,
            interval: Some(Interval::days(1)),
            catchup: false,
            max_active_runs: 1,
        }
    }

    /// Manually triggered only.
    pub fn manual_from(start_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date: None,
            interval: None,
            catchup: false,
            max_active_runs: 1,
        }
    }

    /// Same calendar window, manual triggering.
    pub fn as_manual(&self) -> Self {
        Self {
            interval: None,
            ..self.clone()
        }
    }

    pub fn describe(&self) -> String {
        match self.interval {
            Some(interval) if !interval.is_zero() => format!("every {interval}"),
            _ => "manual".to_string(),
        }
    }
}

/// A frozen task graph with a name and a schedule.
///
/// Construction goes through [`WorkflowBuilder::build`], which checks id
/// uniqueness, resolves every declared predecessor and rejects cycles. After
/// that the graph is immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    name: String,
    schedule: Schedule,
    nodes: Vec<TaskNode>,
}

impl Workflow {
    pub fn builder(name: impl Into<String>, schedule: Schedule) -> WorkflowBuilder {
        WorkflowBuilder {
            name: name.into(),
            schedule,
            nodes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn nodes(&self) -> &[TaskNode] {
        &self.nodes
    }

    pub fn node(&self, id: &TaskId) -> Option<&TaskNode> {
        self.nodes.iter().find(|node| node.id() == id)
    }

    /// All `(upstream, downstream)` pairs in insertion order.
    pub fn edges(&self) -> Vec<(TaskId, TaskId)> {
        let mut edges = Vec::new();
        for node in &self.nodes {
            for upstream in node.upstream() {
                edges.push((upstream.clone(), node.id().clone()));
            }
        }
        edges
    }

    /// Task ids in dependency order.
    ///
    /// Falls back to insertion order for graphs that never went through
    /// [`WorkflowBuilder::build`] and turn out cyclic.
    pub fn topo_order(&self) -> Vec<TaskId> {
        let graph = self.as_graph();
        match toposort(&graph, None) {
            Ok(order) => order
                .into_iter()
                .map(|ix| self.nodes[graph[ix]].id().clone())
                .collect(),
            Err(_) => self.nodes.iter().map(|node| node.id().clone()).collect(),
        }
    }

    fn as_graph(&self) -> DiGraph<usize, ()> {
        let mut graph = DiGraph::with_capacity(self.nodes.len(), self.nodes.len());
        let mut indices = BTreeMap::new();
        for (pos, node) in self.nodes.iter().enumerate() {
            indices.insert(node.id().clone(), graph.add_node(pos));
        }
        for node in &self.nodes {
            for upstream in node.upstream() {
                if let (Some(from), Some(to)) = (indices.get(upstream), indices.get(node.id())) {
                    graph.add_edge(*from, *to, ());
                }
            }
        }
        graph
    }
}

/// Accumulates task nodes, then freezes them into a validated [`Workflow`].
#[derive(Debug)]
pub struct WorkflowBuilder {
    name: String,
    schedule: Schedule,
    nodes: Vec<TaskNode>,
}

impl WorkflowBuilder {
    pub fn add(mut self, node: TaskNode) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn extend(mut self, nodes: impl IntoIterator<Item = TaskNode>) -> Self {
        self.nodes.extend(nodes);
        self
    }

    /// Freezes the graph.
    ///
    /// Fails when two nodes share an id, a node names an upstream that does
    /// not exist, or the declared edges form a cycle.
    pub fn build(self) -> Result<Workflow, ModelError> {
        let mut indices: BTreeMap<TaskId, NodeIndex> = BTreeMap::new();
        let mut graph: DiGraph<(), ()> = DiGraph::with_capacity(self.nodes.len(), self.nodes.len());

        for node in &self.nodes {
            if indices.contains_key(node.id()) {
                return Err(ModelError::DuplicateTaskId {
                    workflow: self.name,
                    task: node.id().clone(),
                });
            }
            indices.insert(node.id().clone(), graph.add_node(()));
        }
        for node in &self.nodes {
            let to = indices[node.id()];
            for upstream in node.upstream() {
                let from = indices.get(upstream).ok_or_else(|| ModelError::UnknownUpstream {
                    workflow: self.name.clone(),
                    task: node.id().clone(),
                    upstream: upstream.clone(),
                })?;
                graph.add_edge(*from, to, ());
            }
        }
        if is_cyclic_directed(&graph) {
            return Err(ModelError::DependencyCycle {
                workflow: self.name,
            });
        }

        debug!(
            workflow = %self.name,
            tasks = self.nodes.len(),
            edges = graph.edge_count(),
            "workflow graph frozen"
        );
        Ok(Workflow {
            name: self.name,
            schedule: self.schedule,
            nodes: self.nodes,
        })
    }
}
