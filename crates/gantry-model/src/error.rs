use thiserror::Error;

use crate::ids::{ConnId, TaskId};

/// Errors raised while assembling or validating the shared data model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid task id: {0:?}")]
    InvalidTaskId(String),

    #[error("invalid connection id: {0:?}")]
    InvalidConnId(String),

    #[error("unsupported warehouse engine {0:?}: expected one of postgres, snowflake")]
    UnsupportedBackend(String),

    #[error("connection not found: {0}")]
    ConnectionNotFound(ConnId),

    #[error("connection {conn} is missing credentials: {detail}")]
    MissingCredentials { conn: ConnId, detail: String },

    #[error("duplicate task id in workflow {workflow:?}: {task}")]
    DuplicateTaskId { workflow: String, task: TaskId },

    #[error("task {task} in workflow {workflow:?} depends on unknown task {upstream}")]
    UnknownUpstream {
        workflow: String,
        task: TaskId,
        upstream: TaskId,
    },

    #[error("workflow {workflow:?} contains a dependency cycle")]
    DependencyCycle { workflow: String },
}
