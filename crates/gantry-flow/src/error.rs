use thiserror::Error;

use gantry_model::ModelError;

/// Errors raised while assembling workflow graphs.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("pipeline defines no work: {detail}")]
    EmptyPipeline { detail: String },

    #[error("read-right user {user:?} contains forbidden token {token:?}")]
    InvalidReadRightUser { user: String, token: String },

    #[error("operator {operator:?} does not support full refresh")]
    FullRefreshUnsupported { operator: String },

    #[error("configuration for table {table:?} is invalid")]
    TableConfig {
        table: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}
