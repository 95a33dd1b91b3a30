use thiserror::Error;

use gantry_flow::FlowError;
use gantry_model::ModelError;

/// Errors raised while assembling dbt commands and workflows.
#[derive(Debug, Error)]
pub enum DbtError {
    #[error("command argument {value:?} contains forbidden substring {found:?}")]
    UnsafeCommandArgument { value: String, found: &'static str },

    #[error("paired dbt workflows need an orchestrator connection for the conflict sensor")]
    MissingOrchestratorConn,

    #[error(transparent)]
    Flow(#[from] FlowError),

    #[error(transparent)]
    Model(#[from] ModelError),
}
