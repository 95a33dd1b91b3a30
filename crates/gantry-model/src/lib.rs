//! Shared data model for the workflow-assembly crates.
//!
//! Everything an orchestration engine needs to run a pipeline lives here:
//! task nodes with their work units, frozen workflow graphs, schedules,
//! connection records and the warehouse engine taxonomy. The operator crates
//! build on these types; the model itself never talks to the network.

pub mod connection;
pub mod engine;
pub mod error;
pub mod ids;
pub mod merge;
pub mod operator;
pub mod task;
pub mod workflow;

pub use connection::{
    ConnField, ConnectionRecord, ConnectionStore, InMemoryConnectionStore, ServiceAccountKey,
};
pub use engine::DwhEngine;
pub use error::ModelError;
pub use ids::{ConnId, TaskId};
pub use merge::resolve_layers;
pub use operator::{ExtractOperator, RefreshStrategy, TableTarget};
pub use task::{TaskNode, WorkUnit};
pub use workflow::{Interval, Schedule, Workflow, WorkflowBuilder};
