//! Connection-to-environment mapping for dbt profiles.
//!
//! The generated profiles read every credential from environment variables,
//! so assembled commands never embed secrets. Each engine has its own
//! variable layout; the match below is exhaustive over [`DwhEngine`].

use std::collections::BTreeMap;

use gantry_model::{ConnField, ConnId, ConnectionRecord, DwhEngine, ModelError};

/// Builds the environment for a dbt invocation against `engine`.
///
/// Postgres profiles read `DBT_DWH_*`; the connection's `schema` field is
/// the database name, and `target_schema` is the schema the models build
/// into. Snowflake profiles read `DBT_*`, with the account falling back to
/// the connection host and role, database and warehouse coming from the
/// connection extras. Anything absent fails with
/// [`ModelError::MissingCredentials`] naming the gap.
pub fn dbt_env(
    engine: DwhEngine,
    conn_id: &ConnId,
    conn: &ConnectionRecord,
    target_schema: &str,
    profiles_dir: &str,
) -> Result<BTreeMap<String, String>, ModelError> {
    let mut env = BTreeMap::new();
    match engine {
        DwhEngine::Postgres => {
            env.insert("DBT_DWH_HOST".to_string(), conn.require(conn_id, ConnField::Host)?);
            env.insert("DBT_DWH_USER".to_string(), conn.require(conn_id, ConnField::Login)?);
            env.insert("DBT_DWH_PASS".to_string(), conn.require(conn_id, ConnField::Password)?);
            env.insert("DBT_DWH_PORT".to_string(), conn.require(conn_id, ConnField::Port)?);
            env.insert("DBT_DWH_DBNAME".to_string(), conn.require(conn_id, ConnField::Schema)?);
            env.insert("DBT_DWH_SCHEMA".to_string(), target_schema.to_string());
        }
        DwhEngine::Snowflake => {
            let account = match conn.extra_str("account") {
                Some(account) => account.to_string(),
                None => conn.require(conn_id, ConnField::Host)?,
            };
            env.insert("DBT_ACCOUNT".to_string(), account);
            env.insert("DBT_USER".to_string(), conn.require(conn_id, ConnField::Login)?);
            env.insert("DBT_PASS".to_string(), conn.require(conn_id, ConnField::Password)?);
            env.insert("DBT_ROLE".to_string(), require_extra(conn_id, conn, "role")?);
            env.insert("DBT_DB".to_string(), require_extra(conn_id, conn, "database")?);
            env.insert("DBT_WH".to_string(), require_extra(conn_id, conn, "warehouse")?);
        }
    }
    env.insert("DBT_PROFILES_DIR".to_string(), profiles_dir.to_string());
    Ok(env)
}

fn require_extra(
    conn_id: &ConnId,
    conn: &ConnectionRecord,
    key: &str,
) -> Result<String, ModelError> {
    conn.extra_str(key)
        .map(str::to_string)
        .ok_or_else(|| ModelError::MissingCredentials {
            conn: conn_id.clone(),
            detail: format!("extra field {key:?} is not set"),
        })
}
