//! The dbt-via-shell operator.
//!
//! [`DbtProject`] renders the templated shell commands, [`dbt_env`] maps a
//! warehouse connection onto the environment the generated profiles read,
//! and the factories in [`workflow`] chain the phases into runnable
//! workflows.

pub mod command;
pub mod env;
pub mod error;
pub mod workflow;

pub use command::{BANNED_SUBSTRINGS, DbtPhase, DbtProject, screen_argument};
pub use env::dbt_env;
pub use error::DbtError;
pub use workflow::{DbtPhases, DbtPipelineSpec, dbt_workflow, dbt_workflow_pair};
