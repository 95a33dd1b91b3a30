#![deny(unsafe_code)]

//! Identifier newtypes used throughout the workflow model.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Identifier of a task node, unique within one workflow.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a task id, rejecting empty or whitespace-only input.
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidTaskId(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a connection record in a [`ConnectionStore`].
///
/// [`ConnectionStore`]: crate::connection::ConnectionStore
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConnId(String);

impl ConnId {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidConnId(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_id_trims_and_keeps_value() {
        let id = TaskId::new("  extract_load_orders ").unwrap();
        assert_eq!(id.as_str(), "extract_load_orders");
    }

    #[test]
    fn blank_ids_are_rejected() {
        assert!(TaskId::new("   ").is_err());
        assert!(ConnId::new("").is_err());
    }
}
