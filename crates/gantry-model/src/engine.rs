//! Warehouse engine selection.
//!
//! The set of supported engines is closed. Every engine-specific code path
//! (environment mapping, schema rotation SQL) matches exhaustively on
//! [`DwhEngine`], so adding a variant surfaces every site that needs work.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ModelError;

/// A data-warehouse engine this crate knows how to target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DwhEngine {
    Postgres,
    Snowflake,
}

impl DwhEngine {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Snowflake => "snowflake",
        }
    }
}

impl fmt::Display for DwhEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DwhEngine {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "snowflake" => Ok(Self::Snowflake),
            _ => Err(ModelError::UnsupportedBackend(s.to_string())),
        }
    }
}

impl Serialize for DwhEngine {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DwhEngine {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}
