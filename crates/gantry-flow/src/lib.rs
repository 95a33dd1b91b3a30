//! Workflow assembly.
//!
//! [`chain`] and [`fan_out`] declare dependency edges between task nodes,
//! [`schema_swap_tasks`] brackets a load with staging-schema rotation, and
//! [`full_refresh_workflow`] combines them into the drop-and-replace
//! factory that drives any full-refresh extract operator.

pub mod chain;
pub mod error;
pub mod full_refresh;
pub mod schema;

pub use chain::{chain, fan_out};
pub use error::FlowError;
pub use full_refresh::{FullRefreshSpec, full_refresh_workflow};
pub use schema::{read_grant_sql, schema_swap_tasks, validate_read_right_users};
